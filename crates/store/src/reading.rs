//! Usage reading type.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A single hourly water-usage reading. Immutable once stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Hour-granularity UTC timestamp
    pub timestamp: DateTime<Utc>,
    /// Total usage observed for the hour
    pub usage: f64,
}

impl Reading {
    /// Create a reading, flooring the timestamp to the hour.
    pub fn new(timestamp: DateTime<Utc>, usage: f64) -> Self {
        Self {
            timestamp: floor_to_hour(timestamp),
            usage,
        }
    }
}

/// Truncate a timestamp to hour granularity.
pub fn floor_to_hour(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}
