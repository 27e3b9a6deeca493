use crate::aggregate::error::ClassificationError;
use crate::resolver::error::ResolveError;
use crate::types::error::BandTableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlanketError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    BandTable(#[from] BandTableError),

    #[error("Failed to determine cache directory")]
    CacheDirResolution,
}
