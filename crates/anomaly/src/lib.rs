//! # anomaly
//!
//! Isolation-forest anomaly scoring over 1-dimensional usage values.
//!
//! Scores follow the decision-function convention: values well inside
//! the fitted distribution score near or above zero, values outside it
//! score increasingly negative, and the zero crossing is calibrated so
//! that roughly the configured contamination fraction of the training
//! data is flagged.

mod error;
mod forest;
mod result;

pub use error::{AnomalyError, Result};
pub use forest::{IsolationForest, IsolationForestConfig};
pub use result::AnomalyResult;

/// Common interface for anomaly detectors.
pub trait AnomalyDetector {
    /// Fit the detector to historical values.
    fn fit(&mut self, data: &[f64]) -> Result<()>;

    /// Continuous anomaly signal per value; negative means anomalous.
    fn score(&self, data: &[f64]) -> Result<Vec<f64>>;

    /// Score values and flag anomalies.
    fn detect(&self, data: &[f64]) -> Result<AnomalyResult>;

    /// Whether the detector has been fitted.
    fn is_fitted(&self) -> bool;
}
