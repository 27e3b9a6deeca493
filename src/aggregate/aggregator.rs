use crate::aggregate::band_counts::BandCounts;
use crate::aggregate::error::ClassificationError;
use crate::types::band::TemperatureBand;
use crate::types::band_table::BandTable;
use crate::types::reading::Reading;

/// Classifies readings against a [`BandTable`] and counts band occurrences.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    bands: BandTable,
}

impl Aggregator {
    pub fn new(bands: BandTable) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &BandTable {
        &self.bands
    }

    /// The band a reading belongs to. Readings without temperature get the
    /// no-data band.
    pub fn classify(&self, reading: &Reading) -> Result<&TemperatureBand, ClassificationError> {
        self.bands
            .classify(reading.temperature)
            .ok_or(ClassificationError::NoMatchingBand {
                date: reading.date,
                temperature: reading.temperature.unwrap_or(f64::NAN),
            })
    }

    /// Counts readings per band. Fails on the first reading no band accepts.
    pub fn aggregate<'a, I>(&self, readings: I) -> Result<BandCounts, ClassificationError>
    where
        I: IntoIterator<Item = &'a Reading>,
    {
        let mut counts = BandCounts::new();
        for reading in readings {
            counts.increment(&self.classify(reading)?.id);
        }
        Ok(counts)
    }
}
