//! Detection engine orchestration.

use std::path::PathBuf;

use anomaly::{AnomalyDetector, IsolationForest, IsolationForestConfig};
use chrono::Utc;
use forecast::{ArPredictor, Predictor};
use store::{Reading, UsageStore};

use crate::classifier::{classify, round2};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::verdict::{ExpectedUsage, Verdict};

/// Orchestrates the store, the forecaster, and the anomaly scorer.
///
/// Owns all mutable detection state. Callers behind a concurrent
/// transport must serialize mutations (the server wraps the engine in
/// a mutex and serves reads from a verdict snapshot).
pub struct DetectionEngine {
    store: UsageStore,
    config: EngineConfig,
    forecaster: Option<ArPredictor>,
    scorer: Option<IsolationForest>,
    last_verdict: Option<Verdict>,
    last_expected: Option<ExpectedUsage>,
    stored_since_fit: usize,
}

impl DetectionEngine {
    /// Load or seed the history at `path` and fit the initial models.
    pub fn open(path: impl Into<PathBuf>, config: EngineConfig) -> Result<Self> {
        let store = UsageStore::load_or_seed(path)?;
        let mut engine = Self {
            store,
            config,
            forecaster: None,
            scorer: None,
            last_verdict: None,
            last_expected: None,
            stored_since_fit: 0,
        };
        engine.refit();
        Ok(engine)
    }

    /// Classify a live flow reading, optionally storing `total_usage`
    /// at the current hour first.
    ///
    /// Only a storage failure is an error, and it leaves the prior
    /// in-memory state intact. A non-finite total skips the store
    /// update but still classifies against current state.
    pub fn ingest(&mut self, live_flow_rate: f64, total_usage: Option<f64>) -> Result<Verdict> {
        match total_usage {
            Some(total) if total.is_finite() => {
                self.store.append(Reading::new(Utc::now(), total))?;
                self.stored_since_fit += 1;
                if self.config.retrain.due(self.stored_since_fit) {
                    self.refit();
                }
            }
            Some(total) => {
                tracing::debug!(total, "skipping non-finite total usage");
            }
            None => {}
        }

        let average_usage = self.store.mean();
        let expected = self.expected_usage(average_usage);
        let threshold = average_usage * self.config.threshold_ratio;
        let anomaly_score = self
            .scorer
            .as_ref()
            .and_then(|scorer| scorer.score_one(live_flow_rate).ok())
            .unwrap_or(0.0);

        let (status, leak_probability) =
            classify(live_flow_rate, average_usage, threshold, anomaly_score);
        let verdict = Verdict {
            live_flow_rate,
            expected_usage: expected.value(),
            status,
            leak_probability,
        };

        self.last_expected = Some(expected);
        self.last_verdict = Some(verdict.clone());
        Ok(verdict)
    }

    /// Last verdict computed by [`DetectionEngine::ingest`].
    pub fn current_verdict(&self) -> Option<Verdict> {
        self.last_verdict.clone()
    }

    /// Provenance of the last expected-usage figure.
    pub fn last_expected_usage(&self) -> Option<ExpectedUsage> {
        self.last_expected
    }

    /// Forecast usage several steps past the last observed reading.
    ///
    /// Multi-step extension of the one-step forecaster; the same mean
    /// fallback applies per step when the model is unfit.
    pub fn predict_usage(&self, steps: usize) -> Vec<f64> {
        let fitted = self
            .forecaster
            .as_ref()
            .and_then(|model| model.predict(steps).ok());
        match fitted {
            Some(predictions) => predictions.into_iter().map(round2).collect(),
            None => vec![round2(self.store.mean()); steps],
        }
    }

    /// Readings stored since the models were last rebuilt.
    pub fn readings_since_refit(&self) -> usize {
        self.stored_since_fit
    }

    pub fn series_mean(&self) -> f64 {
        self.store.mean()
    }

    pub fn history_len(&self) -> usize {
        self.store.series().len()
    }

    pub fn store(&self) -> &UsageStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rebuild both models over the current series. A fit failure
    /// leaves the corresponding model unfit; the classify path then
    /// degrades (mean forecast, zero score) instead of erroring.
    fn refit(&mut self) {
        let values = self.store.series().values();

        self.forecaster = match ArPredictor::new(self.config.lags, self.config.diff) {
            Ok(mut model) => match model.fit(&values) {
                Ok(()) => Some(model),
                Err(err) => {
                    tracing::debug!(%err, "forecast fit failed; expected usage falls back to the mean");
                    None
                }
            },
            Err(err) => {
                tracing::debug!(%err, "invalid forecaster parameters");
                None
            }
        };

        let mut forest = IsolationForest::new(IsolationForestConfig {
            n_trees: self.config.n_trees,
            contamination: self.config.contamination,
            seed: self.config.seed,
            ..IsolationForestConfig::default()
        });
        self.scorer = match forest.fit(&values) {
            Ok(()) => Some(forest),
            Err(err) => {
                tracing::debug!(%err, "anomaly fit failed; scores default to zero");
                None
            }
        };

        self.stored_since_fit = 0;
    }

    fn expected_usage(&self, average_usage: f64) -> ExpectedUsage {
        let forecast = self
            .forecaster
            .as_ref()
            .and_then(|model| model.predict(1).ok())
            .and_then(|predictions| predictions.first().copied())
            .filter(|v| v.is_finite());
        match forecast {
            Some(value) => ExpectedUsage::Fitted(round2(value)),
            None => ExpectedUsage::MeanFallback(round2(average_usage)),
        }
    }
}
