//! Isolation forest over 1-dimensional values.
//!
//! An ensemble of randomized partition trees: each tree repeatedly
//! splits its sample at a uniform random point between the sample's
//! min and max. Values isolated in fewer splits are more anomalous.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{AnomalyError, Result};
use crate::result::AnomalyResult;
use crate::AnomalyDetector;

/// Euler-Mascheroni constant, for the average path-length correction.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Isolation forest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForestConfig {
    /// Number of trees in the ensemble (default: 100).
    pub n_trees: usize,
    /// Per-tree subsample size, capped at the data length (default: 256).
    pub sample_size: usize,
    /// Expected outlier fraction in the training data (default: 0.05).
    pub contamination: f64,
    /// RNG seed; a fixed seed makes scoring fully deterministic.
    pub seed: u64,
}

impl Default for IsolationForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            sample_size: 256,
            contamination: 0.05,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

/// Ensemble of randomized partition trees over 1-dimensional values.
///
/// Scoring matches the usual decision-function convention: the raw
/// ensemble score is shifted by the contamination-quantile of the
/// training scores, so inliers land near or above zero and outliers
/// below it.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    config: IsolationForestConfig,
    trees: Vec<Node>,
    sample_size: usize,
    offset: f64,
    fitted: bool,
}

impl IsolationForest {
    /// Create an unfitted forest.
    pub fn new(config: IsolationForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            sample_size: 0,
            offset: 0.0,
            fitted: false,
        }
    }

    /// Forest with the given contamination and seed, defaults otherwise.
    pub fn with_contamination(contamination: f64, seed: u64) -> Self {
        Self::new(IsolationForestConfig {
            contamination,
            seed,
            ..IsolationForestConfig::default()
        })
    }

    /// Decision score for a single value.
    pub fn score_one(&self, value: f64) -> Result<f64> {
        if !self.fitted {
            return Err(AnomalyError::NotFitted);
        }
        Ok(self.score_sample(value) - self.offset)
    }

    /// Raw ensemble score in [-1, 0): closer to -1 is more anomalous.
    fn score_sample(&self, value: f64) -> f64 {
        let normalizer = average_path_length(self.sample_size);
        if normalizer <= 0.0 {
            // Degenerate single-point fit; every value is maximally isolated.
            return -1.0;
        }
        let mean_path = self
            .trees
            .iter()
            .map(|tree| path_length(tree, value, 0))
            .sum::<f64>()
            / self.trees.len() as f64;
        -(2f64.powf(-mean_path / normalizer))
    }
}

impl AnomalyDetector for IsolationForest {
    fn fit(&mut self, data: &[f64]) -> Result<()> {
        let values: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return Err(AnomalyError::EmptyData);
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let n_trees = self.config.n_trees.max(1);
        let sample_size = self.config.sample_size.min(values.len()).max(1);
        let depth_limit = (sample_size as f64).log2().ceil().max(1.0) as usize;

        let mut trees = Vec::with_capacity(n_trees);
        for _ in 0..n_trees {
            let sample: Vec<f64> = values
                .choose_multiple(&mut rng, sample_size)
                .copied()
                .collect();
            trees.push(build_tree(sample, 0, depth_limit, &mut rng));
        }

        self.trees = trees;
        self.sample_size = sample_size;
        self.fitted = true;

        // Calibrate the zero crossing so that roughly `contamination`
        // of the training values score negative.
        let mut training: Vec<f64> = values.iter().map(|&v| self.score_sample(v)).collect();
        training.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        self.offset = quantile(&training, self.config.contamination);
        Ok(())
    }

    fn score(&self, data: &[f64]) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(AnomalyError::NotFitted);
        }
        Ok(data
            .iter()
            .map(|&v| self.score_sample(v) - self.offset)
            .collect())
    }

    fn detect(&self, data: &[f64]) -> Result<AnomalyResult> {
        let scores = self.score(data)?;
        let is_anomaly = scores.iter().map(|&s| s < 0.0).collect();
        Ok(AnomalyResult::new(is_anomaly, scores))
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

fn build_tree(sample: Vec<f64>, depth: usize, limit: usize, rng: &mut StdRng) -> Node {
    let size = sample.len();
    if size <= 1 || depth >= limit {
        return Node::Leaf { size };
    }

    let min = sample.iter().copied().fold(f64::INFINITY, f64::min);
    let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        // All values equal; nothing left to isolate.
        return Node::Leaf { size };
    }

    let value = rng.gen_range(min..max);
    let (left, right): (Vec<f64>, Vec<f64>) = sample.into_iter().partition(|&v| v < value);
    if left.is_empty() || right.is_empty() {
        return Node::Leaf { size };
    }

    Node::Split {
        value,
        left: Box::new(build_tree(left, depth + 1, limit, rng)),
        right: Box::new(build_tree(right, depth + 1, limit, rng)),
    }
}

fn path_length(node: &Node, value: f64, depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            value: split,
            left,
            right,
        } => {
            if value < *split {
                path_length(left, value, depth + 1)
            } else {
                path_length(right, value, depth + 1)
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolation quantile of pre-sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let fraction = position - lower as f64;
        sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clustered_data() -> Vec<f64> {
        // Values tightly clustered around 10.
        (0..200)
            .map(|i| 10.0 + ((i * 37) % 13) as f64 * 0.1 - 0.6)
            .collect()
    }

    #[test]
    fn test_fit_requires_data() {
        let mut forest = IsolationForest::new(IsolationForestConfig::default());
        assert_eq!(forest.fit(&[]), Err(AnomalyError::EmptyData));
        assert_eq!(forest.fit(&[f64::NAN]), Err(AnomalyError::EmptyData));
    }

    #[test]
    fn test_score_before_fit() {
        let forest = IsolationForest::new(IsolationForestConfig::default());
        assert_eq!(forest.score_one(10.0), Err(AnomalyError::NotFitted));
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let data = clustered_data();

        let mut a = IsolationForest::with_contamination(0.05, 42);
        let mut b = IsolationForest::with_contamination(0.05, 42);
        a.fit(&data).unwrap();
        b.fit(&data).unwrap();

        assert_eq!(a.score(&data).unwrap(), b.score(&data).unwrap());
    }

    #[test]
    fn test_outliers_score_below_inliers() {
        let data = clustered_data();
        let mut forest = IsolationForest::with_contamination(0.05, 42);
        forest.fit(&data).unwrap();

        let inlier = forest.score_one(10.0).unwrap();
        let outlier = forest.score_one(40.0).unwrap();

        assert!(outlier < inlier);
        assert!(outlier < 0.0);
    }

    #[test]
    fn test_contamination_bounds_training_flags() {
        let data = clustered_data();
        let mut forest = IsolationForest::with_contamination(0.05, 42);
        forest.fit(&data).unwrap();

        let result = forest.detect(&data).unwrap();
        // The offset sits at the 5% quantile of training scores; ties
        // aside, no more than ~10% of the history should flag.
        assert!(result.anomaly_count() <= data.len() / 10);
    }

    #[test]
    fn test_score_one_matches_batch_score() {
        let data = clustered_data();
        let mut forest = IsolationForest::with_contamination(0.05, 42);
        forest.fit(&data).unwrap();

        let batch = forest.score(&[9.7, 25.0]).unwrap();
        assert_eq!(forest.score_one(9.7).unwrap(), batch[0]);
        assert_eq!(forest.score_one(25.0).unwrap(), batch[1]);
    }

    #[test]
    fn test_single_point_fit_does_not_panic() {
        let mut forest = IsolationForest::with_contamination(0.05, 42);
        forest.fit(&[10.0]).unwrap();
        assert!(forest.score_one(10.0).unwrap().is_finite());
    }
}
