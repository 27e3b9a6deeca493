//! The ordered set of [`TemperatureBand`]s a blanket is knitted from, plus the
//! classification policy that picks a band for a reading.

use crate::types::band::TemperatureBand;
use crate::types::error::BandTableError;
use std::collections::HashSet;

/// Lower bound, upper bound, label, id, dye lot, hex color.
type BandRow = (
    Option<f64>,
    Option<f64>,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

const DEFAULT_BANDS: [BandRow; 14] = [
    (None, Some(-6.0), "Midnight", "midnight", "L-0412", "#1B1F4B"),
    (Some(-6.0), Some(-3.0), "Navy", "navy", "L-0412", "#23396B"),
    (Some(-3.0), Some(0.0), "Royal Blue", "royal", "L-0388", "#2E5AAC"),
    (Some(0.0), Some(3.0), "Sky", "sky", "L-0388", "#6FA8DC"),
    (Some(3.0), Some(6.0), "Turquoise", "turquoise", "L-0295", "#3FBFBF"),
    (Some(6.0), Some(9.0), "Teal", "teal", "L-0295", "#1F8A80"),
    (Some(9.0), Some(12.0), "Mint", "mint", "L-0517", "#98D7C2"),
    (Some(12.0), Some(15.0), "Lime", "lime", "L-0517", "#B5D33D"),
    (Some(15.0), Some(18.0), "Lemon", "lemon", "L-0633", "#F4E04D"),
    (Some(18.0), Some(21.0), "Mustard", "mustard", "L-0633", "#E1AD01"),
    (Some(21.0), Some(24.0), "Orange", "orange", "L-0701", "#F28C28"),
    (Some(24.0), Some(27.0), "Coral", "coral", "L-0701", "#F26B5B"),
    (Some(27.0), Some(30.0), "Red", "red", "L-0820", "#C62828"),
    (Some(30.0), None, "Burgundy", "burgundy", "L-0820", "#6D1A36"),
];

/// A validated, immutable list of bands in table order.
///
/// Construction checks that the bands partition the whole temperature axis, so
/// every temperature except NaN matches exactly one band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandTable {
    bands: Vec<TemperatureBand>,
    no_data: TemperatureBand,
}

impl BandTable {
    pub fn new(bands: Vec<TemperatureBand>) -> Result<Self, BandTableError> {
        validate(&bands)?;
        Ok(Self {
            bands,
            no_data: TemperatureBand::no_data(),
        })
    }

    /// Parses a JSON array of bands, e.g.
    /// `[{"upperBound": 0, "label": "Blue", "id": "blue", "colorCode": "#0000FF"}, ...]`.
    pub fn from_json(json: &str) -> Result<Self, BandTableError> {
        let bands: Vec<TemperatureBand> = serde_json::from_str(json)?;
        Self::new(bands)
    }

    pub fn bands(&self) -> &[TemperatureBand] {
        &self.bands
    }

    pub fn no_data(&self) -> &TemperatureBand {
        &self.no_data
    }

    /// Looks up a band by id. The empty id resolves to the no-data band.
    pub fn get(&self, id: &str) -> Option<&TemperatureBand> {
        if id == self.no_data.id {
            return Some(&self.no_data);
        }
        self.bands.iter().find(|band| band.id == id)
    }

    /// Picks the band for a temperature.
    ///
    /// An absent temperature always maps to the no-data band. A present one maps
    /// to the first band in table order that matches it; `None` is returned only
    /// for temperatures no band accepts (NaN).
    pub fn classify(&self, temperature: Option<f64>) -> Option<&TemperatureBand> {
        match temperature {
            None => Some(&self.no_data),
            Some(temp) => self.bands.iter().find(|band| band.matches(temp)),
        }
    }
}

impl Default for BandTable {
    fn default() -> Self {
        let bands = DEFAULT_BANDS
            .iter()
            .map(|&(lower, upper, label, id, lot, color)| {
                TemperatureBand::builder()
                    .maybe_lower_bound(lower)
                    .maybe_upper_bound(upper)
                    .label(label)
                    .id(id)
                    .lot_code(lot)
                    .color_code(color)
                    .build()
            })
            .collect();
        Self {
            bands,
            no_data: TemperatureBand::no_data(),
        }
    }
}

fn validate(bands: &[TemperatureBand]) -> Result<(), BandTableError> {
    if bands.is_empty() {
        return Err(BandTableError::Empty);
    }

    let mut seen = HashSet::new();
    for band in bands {
        if band.id.is_empty() {
            return Err(BandTableError::ReservedId {
                label: band.label.clone(),
            });
        }
        if !seen.insert(band.id.as_str()) {
            return Err(BandTableError::DuplicateId(band.id.clone()));
        }
        match (band.lower_bound, band.upper_bound) {
            (None, None) => return Err(BandTableError::Degenerate(band.id.clone())),
            // `!(a < b)` also rejects NaN bounds
            (Some(lower), Some(upper)) if !(lower < upper) => {
                return Err(BandTableError::EmptyInterval {
                    id: band.id.clone(),
                    lower,
                    upper,
                })
            }
            _ => {}
        }
    }

    let mut sorted: Vec<&TemperatureBand> = bands.iter().collect();
    sorted.sort_by(|a, b| {
        let a = a.lower_bound.unwrap_or(f64::NEG_INFINITY);
        let b = b.lower_bound.unwrap_or(f64::NEG_INFINITY);
        a.total_cmp(&b)
    });

    let first = sorted[0];
    if first.lower_bound.is_some() {
        return Err(BandTableError::MissingLowerTail(first.id.clone()));
    }

    for pair in sorted.windows(2) {
        let (below, above) = (pair[0], pair[1]);
        let (Some(upper), Some(lower)) = (below.upper_bound, above.lower_bound) else {
            return Err(BandTableError::Overlap(below.id.clone(), above.id.clone()));
        };
        if upper < lower {
            return Err(BandTableError::Gap {
                below: below.id.clone(),
                above: above.id.clone(),
                from: upper,
                to: lower,
            });
        }
        if upper > lower {
            return Err(BandTableError::Overlap(below.id.clone(), above.id.clone()));
        }
    }

    let last = sorted[sorted.len() - 1];
    if last.upper_bound.is_some() {
        return Err(BandTableError::MissingUpperTail(last.id.clone()));
    }
    Ok(())
}
