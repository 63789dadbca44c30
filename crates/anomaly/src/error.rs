//! Anomaly error types.

use thiserror::Error;

/// Result type alias for anomaly operations.
pub type Result<T> = std::result::Result<T, AnomalyError>;

/// Errors that can occur during anomaly detection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnomalyError {
    /// No usable (finite) values to fit on
    #[error("No usable data to fit on")]
    EmptyData,

    /// Detector has not been fitted yet
    #[error("Detector must be fitted before scoring")]
    NotFitted,
}
