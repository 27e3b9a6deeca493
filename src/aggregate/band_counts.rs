use crate::types::band::TemperatureBand;
use crate::types::band_table::BandTable;
use std::collections::HashMap;

/// How many readings fell into each band, keyed by band id.
///
/// Bands without readings have no entry; [`get`](Self::get) reports them as zero.
/// The no-data band is keyed by the empty id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandCounts {
    counts: HashMap<String, usize>,
}

impl BandCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn increment(&mut self, band_id: &str) {
        *self.counts.entry(band_id.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, band_id: &str) -> usize {
        self.counts.get(band_id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of bands with at least one reading.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(id, count)| (id.as_str(), *count))
    }

    /// Every band of `table` in table order with its count, followed by the
    /// no-data band when any reading lacked a temperature.
    pub fn rows<'a>(&self, table: &'a BandTable) -> Vec<(&'a TemperatureBand, usize)> {
        let mut rows: Vec<_> = table
            .bands()
            .iter()
            .map(|band| (band, self.get(&band.id)))
            .collect();
        let missing = self.get(&table.no_data().id);
        if missing > 0 {
            rows.push((table.no_data(), missing));
        }
        rows
    }
}
