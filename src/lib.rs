mod aggregate;
mod blanket;
mod cache;
mod date_window;
mod error;
mod resolver;
mod source;
mod types;
mod utils;

#[cfg(test)]
mod test_support;

pub use blanket::*;
pub use error::BlanketError;

pub use aggregate::aggregator::Aggregator;
pub use aggregate::band_counts::BandCounts;
pub use aggregate::error::ClassificationError;

pub use cache::error::StorageError;
pub use cache::reading_cache::ReadingCache;
pub use cache::store::{JsonFileStore, KeyValueStore, MemoryStore};

pub use date_window::{DateWindow, WindowDates, WINDOW_DAYS};

pub use resolver::error::ResolveError;
pub use resolver::reading_resolver::{ReadingOrigin, ReadingResolver};

pub use source::bright_sky::BrightSkySource;
pub use source::error::FetchError;
pub use source::ReadingSource;

pub use types::band::{TemperatureBand, NO_DATA_LABEL};
pub use types::band_table::BandTable;
pub use types::error::BandTableError;
pub use types::reading::{Reading, NOON_HOUR};
