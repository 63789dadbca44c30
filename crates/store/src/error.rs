//! Store error types.

use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while loading or persisting the usage history.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV content
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Timestamp cell that could not be parsed
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Usage value that is NaN or infinite
    #[error("Invalid usage value: {0}")]
    InvalidUsage(f64),

    /// Expected column missing from the header row
    #[error("Missing column '{0}'")]
    MissingColumn(&'static str),

    /// A series with no usable values
    #[error("No usable readings in series")]
    NoData,

    /// Seed synthesis failure
    #[error("Seed synthesis failed: {0}")]
    Seed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_display() {
        let error = StoreError::MissingColumn("water_usage");
        assert_eq!(error.to_string(), "Missing column 'water_usage'");
    }

    #[test]
    fn test_invalid_timestamp_display() {
        let error = StoreError::InvalidTimestamp("not-a-date".to_string());
        assert_eq!(error.to_string(), "Invalid timestamp: not-a-date");
    }

    #[test]
    fn test_no_data_display() {
        assert_eq!(StoreError::NoData.to_string(), "No usable readings in series");
    }
}
