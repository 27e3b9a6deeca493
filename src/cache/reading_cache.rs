use crate::cache::error::StorageError;
use crate::cache::store::KeyValueStore;
use chrono::NaiveDate;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Midday temperatures keyed by date, on top of a [`KeyValueStore`].
///
/// A missing key is the only way a missing temperature is represented; no
/// placeholder is ever stored. Caching only saves requests, so every storage
/// failure is treated as a cache miss instead of being returned. The first
/// failure is logged as a warning, later ones only at debug level.
#[derive(Debug)]
pub struct ReadingCache<K> {
    store: K,
    degraded: AtomicBool,
}

impl<K: KeyValueStore> ReadingCache<K> {
    pub fn new(store: K) -> Self {
        Self {
            store,
            degraded: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// Whether any storage operation has failed since the cache was created.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    fn storage_failed(&self, action: &str, date: NaiveDate, e: &StorageError) {
        if self.degraded.swap(true, Ordering::Relaxed) {
            debug!("Cache {} for {} failed: {}", action, date, e);
        } else {
            warn!(
                "Cache {} for {} failed, continuing without cache: {}",
                action, date, e
            );
        }
    }

    pub fn has(&self, date: NaiveDate) -> bool {
        match self.store.contains(&date_key(date)) {
            Ok(present) => present,
            Err(e) => {
                self.storage_failed("lookup", date, &e);
                false
            }
        }
    }

    /// Returns the cached temperature, or `None` when there is no usable entry.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        let key = date_key(date);
        let text = match self.store.get(&key) {
            Ok(text) => text?,
            Err(e) => {
                self.storage_failed("read", date, &e);
                return None;
            }
        };
        match text.trim().parse::<f64>() {
            Ok(temperature) if temperature.is_finite() => Some(temperature),
            _ => {
                warn!("Ignoring unusable cached value {:?} for {}", text, date);
                None
            }
        }
    }

    pub fn set(&self, date: NaiveDate, temperature: f64) {
        if !temperature.is_finite() {
            warn!("Not caching non-finite temperature {} for {}", temperature, date);
            return;
        }
        if let Err(e) = self.store.set(&date_key(date), temperature.to_string()) {
            self.storage_failed("write", date, &e);
        }
    }

    /// Persists buffered writes. Failures are logged, not returned.
    pub async fn flush(&self) {
        if let Err(e) = self.store.flush().await {
            warn!("Failed to persist reading cache: {:?}", e);
        }
    }
}
