use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("Temperature {temperature}°C on {date} matches no configured band")]
    NoMatchingBand { date: NaiveDate, temperature: f64 },
}
