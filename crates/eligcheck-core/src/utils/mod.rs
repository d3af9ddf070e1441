//! Utility functions for date parsing and display formatting.

pub mod dates;
pub mod format;

// Re-export commonly used functions at module level
pub use dates::{DateFormats, DEFAULT_DATE_FORMATS};
pub use format::{format_date_us, non_empty, or_na, truncate};
