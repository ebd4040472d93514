//! Time utility functions

use chrono::{DateTime, NaiveDateTime};

use crate::query::DATE_PATTERN;

/// Convert microseconds since Unix epoch to a zone-less timestamp
pub fn micros_to_naive(micros: i64) -> NaiveDateTime {
    DateTime::from_timestamp_micros(micros)
        .unwrap_or_else(|| {
            tracing::warn!(micros, "Invalid timestamp, using epoch");
            DateTime::UNIX_EPOCH
        })
        .naive_utc()
}

/// Format a timestamp the way filter literals are written
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(DATE_PATTERN).to_string()
}
