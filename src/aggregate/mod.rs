pub mod aggregator;
pub mod band_counts;
pub mod error;
