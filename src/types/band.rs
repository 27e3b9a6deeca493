//! Defines [`TemperatureBand`], a labeled half-open temperature interval used to
//! sort a day's reading into one of the yarn colors of the blanket.

use bon::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label of the sentinel band that collects days without a midday reading.
pub const NO_DATA_LABEL: &str = "—";

/// A labeled temperature interval, lower bound inclusive and upper bound exclusive.
///
/// A missing bound means that side of the interval is unbounded. A band without
/// any bound never matches a temperature; that shape is reserved for the
/// [`TemperatureBand::no_data`] sentinel.
///
/// # Examples
///
/// ```
/// use temperature_blanket::TemperatureBand;
///
/// let band = TemperatureBand::builder()
///     .id("mint")
///     .label("Mint")
///     .lower_bound(9.0)
///     .upper_bound(12.0)
///     .color_code("#98D7C2")
///     .build();
///
/// assert!(band.matches(9.0));
/// assert!(band.matches(11.999));
/// assert!(!band.matches(12.0));
/// assert_eq!(band.describe(), "9°C - 12°C");
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureBand {
    /// Inclusive lower bound in °C, `None` when the band is open towards the cold side.
    pub lower_bound: Option<f64>,
    /// Exclusive upper bound in °C, `None` when the band is open towards the warm side.
    pub upper_bound: Option<f64>,
    /// Human readable name, usually the yarn color.
    #[builder(into)]
    pub label: String,
    /// Stable identifier used as the key in band counts.
    #[builder(into)]
    pub id: String,
    /// Opaque grouping tag (the yarn dye lot).
    #[builder(into, default)]
    #[serde(default)]
    pub lot_code: String,
    /// Display color as a hex string. Not interpreted by the pipeline.
    #[builder(into, default)]
    #[serde(default)]
    pub color_code: String,
}

impl TemperatureBand {
    /// The band assigned to readings without a temperature.
    ///
    /// It has no bounds, so [`matches`](Self::matches) is always false and
    /// callers have to select it explicitly.
    pub fn no_data() -> Self {
        Self {
            lower_bound: None,
            upper_bound: None,
            label: NO_DATA_LABEL.to_string(),
            id: String::new(),
            lot_code: String::new(),
            color_code: String::new(),
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.lower_bound.is_none() && self.upper_bound.is_none()
    }

    /// Returns true if `temp` falls inside this band.
    ///
    /// NaN never matches any band.
    pub fn matches(&self, temp: f64) -> bool {
        match (self.lower_bound, self.upper_bound) {
            (Some(lower), Some(upper)) => temp >= lower && temp < upper,
            (Some(lower), None) => temp >= lower,
            (None, Some(upper)) => temp < upper,
            (None, None) => false,
        }
    }

    /// Renders the bounds, e.g. `"9°C - 12°C"`, `"> 30°C"` or `"< -6°C"`.
    /// The sentinel band renders as an empty string.
    pub fn describe(&self) -> String {
        match (self.lower_bound, self.upper_bound) {
            (Some(lower), Some(upper)) => format!("{}°C - {}°C", lower, upper),
            (Some(lower), None) => format!("> {}°C", lower),
            (None, Some(upper)) => format!("< {}°C", upper),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Display for TemperatureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_no_data() {
            write!(f, "{}", self.label)
        } else {
            write!(f, "{} ({})", self.label, self.describe())
        }
    }
}
