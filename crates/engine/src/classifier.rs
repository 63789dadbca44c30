//! Leak classification policy.

use serde::{Deserialize, Serialize};

/// Classification of a live flow reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeakStatus {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Potential Leak")]
    PotentialLeak,
    #[serde(rename = "Leak Detected")]
    LeakDetected,
}

/// Round to 2 decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Classify a live flow rate against the historical baseline.
///
/// Above-baseline flow is explained by a linear overuse ratio against
/// the threshold (a fixed multiple of the average); at-or-below-
/// baseline flow defers to the anomaly score, which captures unusual
/// patterns rather than magnitude. Flow exactly at the threshold
/// classifies as a detected leak.
pub fn classify(
    live_flow_rate: f64,
    average_usage: f64,
    threshold: f64,
    anomaly_score: f64,
) -> (LeakStatus, f64) {
    if live_flow_rate > average_usage {
        let status = if live_flow_rate < threshold {
            LeakStatus::PotentialLeak
        } else {
            LeakStatus::LeakDetected
        };
        let span = threshold - average_usage;
        // A zero span means the average is zero; any flow above it is
        // full overuse.
        let overuse_factor = if span > 0.0 {
            ((live_flow_rate - average_usage) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        (status, round2(overuse_factor * 100.0))
    } else {
        let probability = (anomaly_score * 100.0).clamp(0.0, 100.0);
        (LeakStatus::Normal, round2(probability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_above_baseline_below_threshold_is_potential_leak() {
        let (status, probability) = classify(12.0, 10.0, 15.0, 0.0);
        assert_eq!(status, LeakStatus::PotentialLeak);
        assert_eq!(probability, 40.00);
    }

    #[test]
    fn test_above_threshold_is_leak_detected() {
        let (status, probability) = classify(16.0, 10.0, 15.0, 0.0);
        assert_eq!(status, LeakStatus::LeakDetected);
        assert_eq!(probability, 100.00);
    }

    #[test]
    fn test_exactly_at_threshold_is_leak_detected() {
        let (status, probability) = classify(15.0, 10.0, 15.0, 0.0);
        assert_eq!(status, LeakStatus::LeakDetected);
        assert_eq!(probability, 100.00);
    }

    #[test]
    fn test_below_baseline_uses_anomaly_score() {
        let (status, probability) = classify(9.0, 10.0, 15.0, 0.3);
        assert_eq!(status, LeakStatus::Normal);
        assert_eq!(probability, 30.00);
    }

    #[test]
    fn test_negative_anomaly_score_clamps_to_zero() {
        let (status, probability) = classify(9.0, 10.0, 15.0, -0.2);
        assert_eq!(status, LeakStatus::Normal);
        assert_eq!(probability, 0.00);
    }

    #[test]
    fn test_anomaly_score_clamps_to_hundred() {
        let (_, probability) = classify(9.0, 10.0, 15.0, 1.7);
        assert_eq!(probability, 100.00);
    }

    #[test]
    fn test_zero_average_has_no_division_by_zero() {
        let (status, probability) = classify(5.0, 0.0, 0.0, 0.0);
        assert_eq!(status, LeakStatus::LeakDetected);
        assert_eq!(probability, 100.00);
    }

    #[test]
    fn test_at_baseline_is_normal() {
        let (status, _) = classify(10.0, 10.0, 15.0, 0.1);
        assert_eq!(status, LeakStatus::Normal);
    }

    #[test]
    fn test_probability_rounds_to_two_decimals() {
        let (_, probability) = classify(11.0, 10.0, 13.0, 0.0);
        // (11 - 10) / (13 - 10) = 0.3333... -> 33.33
        assert_eq!(probability, 33.33);
    }

    #[test]
    fn test_status_wire_rendering() {
        assert_eq!(
            serde_json::to_string(&LeakStatus::PotentialLeak).unwrap(),
            "\"Potential Leak\""
        );
        assert_eq!(
            serde_json::to_string(&LeakStatus::LeakDetected).unwrap(),
            "\"Leak Detected\""
        );
    }
}
