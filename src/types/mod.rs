pub mod band;
pub mod band_table;
pub mod error;
pub mod reading;
