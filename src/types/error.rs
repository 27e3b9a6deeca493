use thiserror::Error;

#[derive(Debug, Error)]
pub enum BandTableError {
    #[error("Band table contains no bands")]
    Empty,

    #[error("Band id '{0}' is used more than once")]
    DuplicateId(String),

    #[error("Band '{label}' has an empty id, which is reserved for the no-data band")]
    ReservedId { label: String },

    #[error("Band '{0}' has neither a lower nor an upper bound")]
    Degenerate(String),

    #[error("Band '{id}' has an empty interval [{lower}, {upper})")]
    EmptyInterval { id: String, lower: f64, upper: f64 },

    #[error("Temperatures from {from}°C to {to}°C fall between bands '{below}' and '{above}'")]
    Gap {
        below: String,
        above: String,
        from: f64,
        to: f64,
    },

    #[error("Bands '{0}' and '{1}' overlap")]
    Overlap(String, String),

    #[error("No band covers arbitrarily cold temperatures (lowest band '{0}' has a lower bound)")]
    MissingLowerTail(String),

    #[error("No band covers arbitrarily warm temperatures (highest band '{0}' has an upper bound)")]
    MissingUpperTail(String),

    #[error("Failed to parse band table JSON")]
    Json(#[from] serde_json::Error),
}
