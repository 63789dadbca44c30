//! Verdict types.

use serde::{Deserialize, Serialize};

use crate::classifier::LeakStatus;

/// How the expected-usage figure was produced.
///
/// The forecast must never be unavailable to the classifier, so an
/// unfit or failing model substitutes the series mean. Keeping the
/// provenance explicit lets tests assert which path was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExpectedUsage {
    /// One-step-ahead forecast from the fitted model
    Fitted(f64),
    /// Series mean, substituted when the model is unfit or failed
    MeanFallback(f64),
}

impl ExpectedUsage {
    pub fn value(&self) -> f64 {
        match *self {
            ExpectedUsage::Fitted(v) | ExpectedUsage::MeanFallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ExpectedUsage::MeanFallback(_))
    }
}

/// Result of classifying a single reading. Created fresh per ingest;
/// only the underlying series is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// The flow rate that was classified
    pub live_flow_rate: f64,
    /// One-step-ahead usage forecast, rounded to 2 decimals
    pub expected_usage: f64,
    /// Leak classification
    pub status: LeakStatus,
    /// Confidence in the classification, in [0, 100]
    pub leak_probability: f64,
}
