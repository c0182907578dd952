//! Utility functions for string formatting.

pub mod format;

pub use format::{bar, format_amount, format_optional, format_timestamp, truncate_string};
