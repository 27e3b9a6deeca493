//! Fakes shared by the unit tests.

use crate::cache::error::StorageError;
use crate::cache::store::KeyValueStore;
use crate::source::error::FetchError;
use crate::source::ReadingSource;
use crate::types::reading::Reading;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A [`ReadingSource`] answering from a fixed script and recording every call.
/// Dates missing from the script have no noon observation.
#[derive(Debug, Default)]
pub(crate) struct ScriptedSource {
    temperatures: HashMap<NaiveDate, Option<f64>>,
    failing: HashSet<NaiveDate>,
    delays: HashMap<NaiveDate, u64>,
    calls: Mutex<Vec<NaiveDate>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, date: NaiveDate, temperature: Option<f64>) -> Self {
        self.temperatures.insert(date, temperature);
        self
    }

    pub(crate) fn failing(mut self, date: NaiveDate) -> Self {
        self.failing.insert(date);
        self
    }

    /// Delays the answer for each date by the given number of milliseconds.
    pub(crate) fn with_delays(mut self, delays: &[(NaiveDate, u64)]) -> Self {
        self.delays.extend(delays.iter().copied());
        self
    }

    pub(crate) fn calls(&self) -> Vec<NaiveDate> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_for(&self, date: NaiveDate) -> usize {
        self.calls().iter().filter(|called| **called == date).count()
    }

    pub(crate) fn was_called_for(&self, date: NaiveDate) -> bool {
        self.calls_for(date) > 0
    }
}

impl ReadingSource for ScriptedSource {
    async fn fetch(&self, date: NaiveDate) -> Result<Reading, FetchError> {
        self.calls.lock().unwrap().push(date);
        if let Some(millis) = self.delays.get(&date).copied() {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
        if self.failing.contains(&date) {
            return Err(FetchError::Parse {
                url: format!("scripted://{}", date),
                source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
            });
        }
        Ok(Reading::new(
            date,
            self.temperatures.get(&date).copied().flatten(),
        ))
    }
}

/// A store whose every operation fails.
#[derive(Debug)]
pub(crate) struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable(PathBuf::from("failing-store")))
    }

    fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
        Err(StorageError::Unavailable(PathBuf::from("failing-store")))
    }

    async fn flush(&self) -> Result<(), StorageError> {
        Err(StorageError::LockPoisoned)
    }
}
