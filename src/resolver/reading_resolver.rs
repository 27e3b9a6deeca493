//! Turns a [`DateWindow`] into readings: cached values where present, fetched
//! ones otherwise, with new fetches written back into the cache.

use crate::cache::reading_cache::ReadingCache;
use crate::cache::store::KeyValueStore;
use crate::date_window::DateWindow;
use crate::resolver::error::ResolveError;
use crate::source::error::FetchError;
use crate::source::ReadingSource;
use crate::types::reading::Reading;
use chrono::NaiveDate;
use futures_util::stream::{FuturesUnordered, StreamExt};
use log::{debug, info, warn};

/// Where a resolved reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingOrigin {
    Cache,
    Source,
}

pub struct ReadingResolver<S, K> {
    source: S,
    cache: ReadingCache<K>,
}

impl<S: ReadingSource, K: KeyValueStore> ReadingResolver<S, K> {
    pub fn new(source: S, cache: ReadingCache<K>) -> Self {
        Self { source, cache }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &ReadingCache<K> {
        &self.cache
    }

    /// Resolves every date of the window concurrently and returns the readings
    /// in window order.
    ///
    /// All lookups run to completion even when one of them fails; the run then
    /// fails as a whole and no readings are returned. Readings fetched before
    /// the failure stay cached.
    pub async fn resolve(&self, window: &DateWindow) -> Result<Vec<Reading>, ResolveError> {
        let today = window.reference_date();
        let total = window.len();

        let mut pending: FuturesUnordered<_> = window
            .iter()
            .enumerate()
            .map(|(index, date)| async move {
                (index, date, self.resolve_date(date, today).await)
            })
            .collect();

        let mut slots: Vec<Option<Reading>> = vec![None; total];
        let mut failures: Vec<(usize, NaiveDate, FetchError)> = Vec::new();
        let mut from_cache = 0;

        while let Some((index, date, outcome)) = pending.next().await {
            match outcome {
                Ok((reading, origin)) => {
                    if origin == ReadingOrigin::Cache {
                        from_cache += 1;
                    }
                    slots[index] = Some(reading);
                }
                Err(e) => {
                    warn!("Failed to fetch reading for {}: {}", date, e);
                    failures.push((index, date, e));
                }
            }
        }
        self.cache.flush().await;

        let failed = failures.len();
        if let Some((_, date, source)) = failures.into_iter().min_by_key(|(index, ..)| *index) {
            return Err(ResolveError::Fetch {
                date,
                failed,
                total,
                source,
            });
        }

        info!(
            "Resolved {} readings ({} from cache, {} fetched)",
            total,
            from_cache,
            total - from_cache
        );
        Ok(slots.into_iter().flatten().collect())
    }

    /// Resolves a single date. Only the fetch suspends; the cache is consulted
    /// synchronously.
    pub async fn resolve_date(
        &self,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(Reading, ReadingOrigin), FetchError> {
        if self.cache.has(date) {
            if let Some(temperature) = self.cache.get(date) {
                debug!("Cache hit for {}", date);
                return Ok((Reading::new(date, Some(temperature)), ReadingOrigin::Cache));
            }
        }

        let reading = self.source.fetch(date).await?;
        // Today's observation may still be corrected by the provider.
        if date != today {
            if let Some(temperature) = reading.temperature {
                self.cache.set(date, temperature);
            }
        }
        Ok((reading, ReadingOrigin::Source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::{JsonFileStore, MemoryStore};
    use crate::test_support::{date, FailingStore, ScriptedSource};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn window(days: u32) -> DateWindow {
        // 2024-05-03 15:00 UTC, today is part of the window
        DateWindow::generate(&Utc.with_ymd_and_hms(2024, 5, 3, 15, 0, 0).unwrap(), days)
    }

    #[tokio::test]
    async fn test_resolves_in_window_order() -> Result<(), ResolveError> {
        let source = ScriptedSource::new()
            .with(date(2024, 5, 3), Some(20.0))
            .with(date(2024, 5, 2), Some(18.0))
            .with(date(2024, 5, 1), None)
            .with(date(2024, 4, 30), Some(-2.5))
            // later dates finish first
            .with_delays(&[
                (date(2024, 5, 3), 30),
                (date(2024, 5, 2), 20),
                (date(2024, 5, 1), 10),
            ]);
        let resolver = ReadingResolver::new(source, ReadingCache::new(MemoryStore::new()));

        let readings = resolver.resolve(&window(3)).await?;
        assert_eq!(
            readings,
            vec![
                Reading::new(date(2024, 5, 3), Some(20.0)),
                Reading::new(date(2024, 5, 2), Some(18.0)),
                Reading::new(date(2024, 5, 1), None),
                Reading::new(date(2024, 4, 30), Some(-2.5)),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_cached_date_is_not_fetched() -> Result<(), ResolveError> {
        let store: MemoryStore = [("2024-05-01", "12.0")].into_iter().collect();
        let source = ScriptedSource::new()
            .with(date(2024, 5, 3), Some(20.0))
            .with(date(2024, 5, 2), Some(18.0));
        let resolver = ReadingResolver::new(source, ReadingCache::new(store));

        let readings = resolver.resolve(&window(2)).await?;
        assert_eq!(readings[2], Reading::new(date(2024, 5, 1), Some(12.0)));
        assert!(!resolver.source().was_called_for(date(2024, 5, 1)));
        assert_eq!(resolver.source().calls().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_cache_hit_for_single_date() -> Result<(), FetchError> {
        let store: MemoryStore = [("2024-05-01", "14.5")].into_iter().collect();
        let resolver = ReadingResolver::new(ScriptedSource::new(), ReadingCache::new(store));

        let (reading, origin) = resolver
            .resolve_date(date(2024, 5, 1), date(2024, 5, 3))
            .await?;
        assert_eq!(reading, Reading::new(date(2024, 5, 1), Some(14.5)));
        assert_eq!(origin, ReadingOrigin::Cache);
        assert!(resolver.source().calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_write_back_skips_today_and_absent() -> Result<(), Box<dyn std::error::Error>> {
        let source = ScriptedSource::new()
            .with(date(2024, 5, 3), Some(20.0))
            .with(date(2024, 5, 2), None)
            .with(date(2024, 5, 1), Some(11.5));
        let resolver = ReadingResolver::new(source, ReadingCache::new(MemoryStore::new()));

        resolver.resolve(&window(2)).await?;
        let store = resolver.cache().store();
        assert_eq!(store.get("2024-05-03")?, None, "today is never cached");
        assert_eq!(store.get("2024-05-02")?, None, "absent readings are never cached");
        assert_eq!(store.get("2024-05-01")?, Some("11.5".to_string()));
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_second_run_is_served_from_cache() -> Result<(), ResolveError> {
        let source = ScriptedSource::new()
            .with(date(2024, 5, 3), Some(20.0))
            .with(date(2024, 5, 2), Some(18.0))
            .with(date(2024, 5, 1), Some(16.0));
        let resolver = ReadingResolver::new(source, ReadingCache::new(MemoryStore::new()));

        let first = resolver.resolve(&window(2)).await?;
        let second = resolver.resolve(&window(2)).await?;
        assert_eq!(first, second);
        // today is fetched on both runs, the past only once
        assert_eq!(resolver.source().calls_for(date(2024, 5, 3)), 2);
        assert_eq!(resolver.source().calls_for(date(2024, 5, 2)), 1);
        assert_eq!(resolver.source().calls_for(date(2024, 5, 1)), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_one_failure_fails_the_run_after_all_complete() {
        let source = ScriptedSource::new()
            .with(date(2024, 5, 3), Some(20.0))
            .failing(date(2024, 5, 2))
            .with(date(2024, 5, 1), Some(16.0))
            .with_delays(&[(date(2024, 5, 1), 20)]);
        let resolver = ReadingResolver::new(source, ReadingCache::new(MemoryStore::new()));

        let result = resolver.resolve(&window(2)).await;
        assert!(matches!(
            result,
            Err(ResolveError::Fetch { date: d, failed: 1, total: 3, .. }) if d == date(2024, 5, 2)
        ));
        // the slower lookup still ran and its value was kept
        assert!(resolver.source().was_called_for(date(2024, 5, 1)));
        assert!(resolver.cache().has(date(2024, 5, 1)));
    }

    #[tokio::test]
    async fn test_failed_run_persists_fetched_readings() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let path = dir.path().join("readings.json");
        let source = ScriptedSource::new()
            .with(date(2024, 5, 3), Some(20.0))
            .failing(date(2024, 5, 2))
            .with(date(2024, 5, 1), Some(16.0));
        let resolver = ReadingResolver::new(source, ReadingCache::new(JsonFileStore::new(&path)));

        assert!(resolver.resolve(&window(2)).await.is_err());

        let on_disk: BTreeMap<String, String> = serde_json::from_slice(&std::fs::read(&path)?)?;
        assert_eq!(on_disk.get("2024-05-01").map(String::as_str), Some("16"));
        assert!(!on_disk.contains_key("2024-05-03"), "today is never cached");
        assert!(!on_disk.contains_key("2024-05-02"));

        // A later process starts from what the failed run fetched
        let reopened = ReadingCache::new(JsonFileStore::new(&path));
        assert_eq!(reopened.get(date(2024, 5, 1)), Some(16.0));
        assert!(!reopened.has(date(2024, 5, 3)));
        Ok(())
    }

    #[tokio::test]
    async fn test_reports_earliest_failure_in_window_order() {
        let source = ScriptedSource::new()
            .with(date(2024, 5, 3), Some(20.0))
            .failing(date(2024, 5, 2))
            .failing(date(2024, 5, 1))
            // the later date in the window fails first
            .with_delays(&[(date(2024, 5, 2), 30)]);
        let resolver = ReadingResolver::new(source, ReadingCache::new(MemoryStore::new()));

        let result = resolver.resolve(&window(2)).await;
        assert!(matches!(
            result,
            Err(ResolveError::Fetch { date: d, failed: 2, .. }) if d == date(2024, 5, 2)
        ));
    }

    #[tokio::test]
    async fn test_storage_failure_degrades_to_fetching() -> Result<(), ResolveError> {
        let source = ScriptedSource::new()
            .with(date(2024, 5, 3), Some(20.0))
            .with(date(2024, 5, 2), Some(18.0));
        let resolver = ReadingResolver::new(source, ReadingCache::new(FailingStore));

        let readings = resolver.resolve(&window(1)).await?;
        assert_eq!(readings.len(), 2);
        assert_eq!(resolver.source().calls().len(), 2);
        assert!(resolver.cache().is_degraded());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_window() -> Result<(), ResolveError> {
        let morning = Utc.with_ymd_and_hms(2024, 5, 3, 9, 0, 0).unwrap();
        let resolver =
            ReadingResolver::new(ScriptedSource::new(), ReadingCache::new(MemoryStore::new()));
        assert!(resolver
            .resolve(&DateWindow::generate(&morning, 0))
            .await?
            .is_empty());
        Ok(())
    }
}
