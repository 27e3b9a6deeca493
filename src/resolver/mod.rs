pub mod error;
pub mod reading_resolver;
