//! This module provides the main entry point of the crate. [`TemperatureBlanket`]
//! resolves the midday temperature of every day in the trailing year and sorts
//! each day into a yarn band, ready to be rendered as a table or knitted.

use crate::aggregate::aggregator::Aggregator;
use crate::aggregate::band_counts::BandCounts;
use crate::aggregate::error::ClassificationError;
use crate::cache::reading_cache::ReadingCache;
use crate::cache::store::{JsonFileStore, KeyValueStore};
use crate::date_window::{DateWindow, WINDOW_DAYS};
use crate::error::BlanketError;
use crate::resolver::reading_resolver::ReadingResolver;
use crate::source::bright_sky::BrightSkySource;
use crate::source::ReadingSource;
use crate::types::band::TemperatureBand;
use crate::types::band_table::BandTable;
use crate::types::reading::Reading;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use chrono::{DateTime, Local};
use log::{info, warn};
use std::path::PathBuf;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// The point the blanket records: Konstanz, on Lake Constance.
pub const LOCATION: LatLon = LatLon(47.66, 9.18);

const CACHE_FILE_NAME: &str = "readings.json";

/// One row of the blanket: a day's reading and the band it was sorted into.
#[derive(Debug, Clone, PartialEq)]
pub struct BlanketDay {
    pub reading: Reading,
    pub band: TemperatureBand,
}

/// The outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct BlanketYear {
    /// The dates that were resolved.
    pub window: DateWindow,
    /// One entry per window date, newest first.
    pub days: Vec<BlanketDay>,
    pub counts: BandCounts,
}

impl BlanketYear {
    pub fn readings(&self) -> impl Iterator<Item = &Reading> {
        self.days.iter().map(|day| &day.reading)
    }
}

/// The pipeline: a [`ReadingResolver`] feeding an [`Aggregator`].
///
/// [`TemperatureBlanket::new()`] wires the Bright Sky source to a JSON file
/// cache in the user's cache directory. Use [`TemperatureBlanket::from_parts`]
/// to supply another source or store.
///
/// # Examples
///
/// ```no_run
/// # use temperature_blanket::{BlanketError, TemperatureBlanket};
/// # #[tokio::main]
/// # async fn main() -> Result<(), BlanketError> {
/// let blanket = TemperatureBlanket::new().await?;
/// let year = blanket.year().call().await?;
///
/// for (band, count) in year.counts.rows(blanket.bands()) {
///     println!("{:<12} {:>3}", band.label, count);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TemperatureBlanket<S = BrightSkySource, K = JsonFileStore> {
    resolver: ReadingResolver<S, K>,
    aggregator: Aggregator,
}

impl TemperatureBlanket {
    /// Creates a pipeline caching readings in `cache_folder/readings.json`.
    ///
    /// The folder is created if needed. If that fails the pipeline still works,
    /// it just fetches every date on every run.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Self {
        if let Err(e) = ensure_cache_dir_exists(&cache_folder).await {
            warn!(
                "Failed to create cache directory '{}', readings will not be cached: {}",
                cache_folder.display(),
                e
            );
        }
        let store = JsonFileStore::new(cache_folder.join(CACHE_FILE_NAME));
        Self::from_parts(
            ReadingResolver::new(BrightSkySource::new(), ReadingCache::new(store)),
            Aggregator::default(),
        )
    }

    /// Creates a pipeline using the default cache directory
    /// (e.g. `~/.cache/temperature_blanket_cache` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`BlanketError::CacheDirResolution`] if the platform has no cache directory.
    pub async fn new() -> Result<Self, BlanketError> {
        let cache_folder = get_cache_dir().ok_or(BlanketError::CacheDirResolution)?;
        Ok(Self::with_cache_folder(cache_folder).await)
    }
}

#[bon]
impl<S: ReadingSource, K: KeyValueStore> TemperatureBlanket<S, K> {
    pub fn from_parts(resolver: ReadingResolver<S, K>, aggregator: Aggregator) -> Self {
        Self {
            resolver,
            aggregator,
        }
    }

    /// Replaces the band table, e.g. with one loaded by [`BandTable::from_json`].
    pub fn with_bands(self, bands: BandTable) -> Self {
        Self {
            aggregator: Aggregator::new(bands),
            ..self
        }
    }

    pub fn bands(&self) -> &BandTable {
        self.aggregator.bands()
    }

    pub fn resolver(&self) -> &ReadingResolver<S, K> {
        &self.resolver
    }

    /// Resolves and classifies the year ending at `reference` (default: now).
    ///
    /// Nothing is returned unless every date resolved and every reading was
    /// classified.
    ///
    /// # Errors
    ///
    /// Returns [`BlanketError::Resolve`] if any date could not be fetched and
    /// [`BlanketError::Classification`] if a temperature fits no band.
    #[builder]
    pub async fn year(
        &self,
        reference: Option<DateTime<Local>>,
    ) -> Result<BlanketYear, BlanketError> {
        let reference = reference.unwrap_or_else(Local::now);
        let window = DateWindow::generate(&reference, WINDOW_DAYS);
        info!(
            "Resolving {} days ({:?} back to {:?})",
            window.len(),
            window.newest(),
            window.oldest()
        );

        let readings = self.resolver.resolve(&window).await?;
        let counts = self.aggregator.aggregate(&readings)?;
        let days = readings
            .into_iter()
            .map(|reading| {
                let band = self.aggregator.classify(&reading)?.clone();
                Ok(BlanketDay { reading, band })
            })
            .collect::<Result<Vec<_>, ClassificationError>>()?;

        Ok(BlanketYear {
            window,
            days,
            counts,
        })
    }
}
