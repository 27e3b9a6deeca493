pub mod error;
pub mod reading_cache;
pub mod store;
