//! Engine configuration.

use serde::{Deserialize, Serialize};

/// When to rebuild both models after a stored reading.
///
/// Retraining is the dominant cost of an ingest; every-reading keeps
/// the models maximally fresh, `EveryN` trades freshness for cheaper
/// ingests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RetrainPolicy {
    /// Rebuild after every stored reading
    #[default]
    EveryReading,
    /// Rebuild once `n` readings accumulated since the last fit
    EveryN(usize),
}

impl RetrainPolicy {
    pub(crate) fn due(&self, stored_since_fit: usize) -> bool {
        match *self {
            RetrainPolicy::EveryReading => true,
            // EveryN(0) degenerates to every reading.
            RetrainPolicy::EveryN(n) => stored_since_fit >= n.max(1),
        }
    }
}

/// Detection engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// AR lag order
    pub lags: usize,
    /// Differencing order
    pub diff: usize,
    /// Trees in the anomaly ensemble
    pub n_trees: usize,
    /// Expected outlier fraction in the history
    pub contamination: f64,
    /// RNG seed for the anomaly ensemble
    pub seed: u64,
    /// Leak threshold as a multiple of the series mean
    pub threshold_ratio: f64,
    /// Model rebuild policy
    pub retrain: RetrainPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lags: 5,
            diff: 1,
            n_trees: 100,
            contamination: 0.05,
            seed: 42,
            threshold_ratio: 1.5,
            retrain: RetrainPolicy::default(),
        }
    }
}
