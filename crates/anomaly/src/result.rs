//! Detection result type.

use serde::{Deserialize, Serialize};

/// Result of running a detector over a batch of values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// Per-value anomaly flag
    pub is_anomaly: Vec<bool>,
    /// Per-value decision score (negative means anomalous)
    pub scores: Vec<f64>,
}

impl AnomalyResult {
    pub fn new(is_anomaly: Vec<bool>, scores: Vec<f64>) -> Self {
        Self { is_anomaly, scores }
    }

    /// Number of flagged values.
    pub fn anomaly_count(&self) -> usize {
        self.is_anomaly.iter().filter(|&&flag| flag).count()
    }
}
