use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Hour of the day whose observation stands for the whole day.
pub const NOON_HOUR: u32 = 12;

/// One day's midday temperature, or its absence when the provider has no
/// observation for noon on that date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub date: NaiveDate,
    /// Degrees Celsius.
    pub temperature: Option<f64>,
}

impl Reading {
    pub fn new(date: NaiveDate, temperature: Option<f64>) -> Self {
        Self { date, temperature }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self::new(date, None)
    }

    /// The instant the reading stands for: noon on its date.
    pub fn noon(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN) + chrono::Duration::hours(i64::from(NOON_HOUR))
    }
}
