pub mod bright_sky;
pub mod error;

use crate::source::error::FetchError;
use crate::types::reading::Reading;
use chrono::NaiveDate;
use std::future::Future;

/// Somewhere a date's midday reading can be fetched from.
///
/// A date without a noon observation is a successful fetch of a
/// [`Reading`] without temperature, not an error.
pub trait ReadingSource: Send + Sync {
    fn fetch(&self, date: NaiveDate) -> impl Future<Output = Result<Reading, FetchError>> + Send;
}
