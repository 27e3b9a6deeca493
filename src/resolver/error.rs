use crate::source::error::FetchError;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// At least one date could not be fetched. `date` and `source` describe the
    /// failing date nearest to the start of the window.
    #[error("{failed} of {total} readings could not be fetched, first failure for {date}")]
    Fetch {
        date: NaiveDate,
        failed: usize,
        total: usize,
        #[source]
        source: FetchError,
    },
}
