//! Autoregressive forecaster with differencing.
//!
//! Fits an AR(`lags`) model on a series differenced `diff` times.
//! Coefficients come from the Yule-Walker equations solved with the
//! Levinson-Durbin recursion; forecasts are produced on the
//! differenced scale and cumulatively undifferenced back.

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::Predictor;

/// Autoregressive model over a differenced series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArPredictor {
    /// AR lag order
    lags: usize,
    /// Differencing order
    diff: usize,
    /// Fitted AR coefficients
    coefficients: Vec<f64>,
    /// Mean of the differenced series
    constant: f64,
    /// Differenced training series
    differenced: Vec<f64>,
    /// Fitting residuals on the differenced scale
    residuals: Vec<f64>,
    /// Last value at each differencing level, for undifferencing
    level_tails: Vec<f64>,
    fitted: bool,
}

impl ArPredictor {
    /// Create a new unfitted model.
    ///
    /// `lags` must be in 1..=10, `diff` in 0..=2.
    pub fn new(lags: usize, diff: usize) -> Result<Self> {
        if lags == 0 || lags > 10 {
            return Err(ForecastError::InvalidParameter {
                name: "lags".to_string(),
                reason: "lag order must be between 1 and 10".to_string(),
            });
        }
        if diff > 2 {
            return Err(ForecastError::InvalidParameter {
                name: "diff".to_string(),
                reason: "differencing order must be <= 2".to_string(),
            });
        }

        Ok(Self {
            lags,
            diff,
            coefficients: vec![0.0; lags],
            constant: 0.0,
            differenced: Vec::new(),
            residuals: Vec::new(),
            level_tails: Vec::new(),
            fitted: false,
        })
    }

    /// Minimum series length accepted by [`Predictor::fit`].
    pub fn min_observations(&self) -> usize {
        self.lags + self.diff + 1
    }

    /// Fitted AR coefficients, most recent lag first.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Fitting residuals on the differenced scale.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Difference a series once.
    fn difference(data: &[f64]) -> Vec<f64> {
        data.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Integrate forecasts back to the original scale, starting from
    /// the stored tail value of each differencing level.
    fn undifference(&self, forecasts: &[f64]) -> Vec<f64> {
        let mut current = forecasts.to_vec();
        for &tail in self.level_tails.iter().rev() {
            let mut running = tail;
            for value in current.iter_mut() {
                running += *value;
                *value = running;
            }
        }
        current
    }

    /// Yule-Walker AR coefficients via Levinson-Durbin.
    fn estimate_coefficients(data: &[f64], lags: usize) -> Vec<f64> {
        let n = data.len();
        let mean = data.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = data.iter().map(|x| x - mean).collect();

        let mut autocov = vec![0.0; lags + 1];
        for (k, cov) in autocov.iter_mut().enumerate() {
            let mut sum = 0.0;
            for i in k..n {
                sum += centered[i] * centered[i - k];
            }
            *cov = sum / n as f64;
        }

        let mut coefficients = vec![0.0; lags];
        if autocov[0].abs() < 1e-12 {
            // Constant series: zero coefficients, forecast is the mean.
            return coefficients;
        }

        coefficients[0] = autocov[1] / autocov[0];
        for k in 1..lags {
            let mut numerator = autocov[k + 1];
            for j in 0..k {
                numerator -= coefficients[j] * autocov[k - j];
            }
            let mut denominator = autocov[0];
            for j in 0..k {
                denominator -= coefficients[j] * autocov[j + 1];
            }
            if denominator.abs() < 1e-12 {
                break;
            }

            let reflection = numerator / denominator;
            let previous = coefficients.clone();
            coefficients[k] = reflection;
            for j in 0..k {
                coefficients[j] = previous[j] - reflection * previous[k - 1 - j];
            }
        }
        coefficients
    }
}

impl Predictor for ArPredictor {
    fn fit(&mut self, data: &[f64]) -> Result<()> {
        let required = self.min_observations();
        if data.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                actual: data.len(),
            });
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(ForecastError::InvalidData(
                "series contains NaN or infinite values".to_string(),
            ));
        }

        let mut working = data.to_vec();
        self.level_tails = Vec::with_capacity(self.diff);
        for _ in 0..self.diff {
            // The tail of each level anchors the later undifferencing.
            self.level_tails.push(working[working.len() - 1]);
            working = Self::difference(&working);
        }
        self.differenced = working;

        let n = self.differenced.len();
        self.constant = self.differenced.iter().sum::<f64>() / n as f64;
        self.coefficients = Self::estimate_coefficients(&self.differenced, self.lags);

        self.residuals = vec![0.0; n];
        for i in self.lags..n {
            let mut prediction = self.constant;
            for j in 0..self.lags {
                prediction += self.coefficients[j] * (self.differenced[i - j - 1] - self.constant);
            }
            self.residuals[i] = self.differenced[i] - prediction;
        }

        self.fitted = true;
        Ok(())
    }

    fn predict(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ForecastError::NotFitted);
        }
        if steps == 0 {
            return Ok(Vec::new());
        }

        let n = self.differenced.len();
        let mut extended = self.differenced.clone();
        for _ in 0..steps {
            let mut forecast = self.constant;
            for j in 0..self.lags {
                let idx = extended.len() - j - 1;
                forecast += self.coefficients[j] * (extended[idx] - self.constant);
            }
            extended.push(forecast);
        }

        Ok(self.undifference(&extended[n..]))
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_validation() {
        assert!(ArPredictor::new(5, 1).is_ok());
        assert!(ArPredictor::new(0, 1).is_err());
        assert!(ArPredictor::new(11, 1).is_err());
        assert!(ArPredictor::new(5, 3).is_err());
    }

    #[test]
    fn test_insufficient_data() {
        let mut model = ArPredictor::new(5, 1).unwrap();
        let short = vec![10.0, 11.0, 9.5];

        let result = model.fit(&short);
        assert_eq!(
            result,
            Err(ForecastError::InsufficientData {
                required: 7,
                actual: 3
            })
        );
        assert!(!model.is_fitted());
    }

    #[test]
    fn test_rejects_nan() {
        let mut model = ArPredictor::new(2, 1).unwrap();
        let data = vec![1.0, 2.0, f64::NAN, 4.0, 5.0];
        assert!(matches!(model.fit(&data), Err(ForecastError::InvalidData(_))));
    }

    #[test]
    fn test_predict_before_fit() {
        let model = ArPredictor::new(5, 1).unwrap();
        assert_eq!(model.predict(1), Err(ForecastError::NotFitted));
    }

    #[test]
    fn test_fit_predict_shapes() {
        let data: Vec<f64> = (1..=50).map(|x| x as f64 + (x as f64 * 0.1).sin()).collect();
        let mut model = ArPredictor::new(5, 1).unwrap();

        model.fit(&data).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.coefficients().len(), 5);
        assert_eq!(model.residuals().len(), data.len() - 1);

        let forecast = model.predict(3).unwrap();
        assert_eq!(forecast.len(), 3);
        assert!(forecast.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_constant_series_forecasts_the_constant() {
        let data = vec![7.0; 20];
        let mut model = ArPredictor::new(5, 1).unwrap();

        model.fit(&data).unwrap();
        let forecast = model.predict(2).unwrap();

        assert!((forecast[0] - 7.0).abs() < 1e-9);
        assert!((forecast[1] - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_trend_continues() {
        // Differencing turns a linear ramp into a constant step; the
        // forecast keeps climbing.
        let data: Vec<f64> = (1..=40).map(|x| 2.0 * x as f64).collect();
        let mut model = ArPredictor::new(5, 1).unwrap();

        model.fit(&data).unwrap();
        let forecast = model.predict(3).unwrap();

        assert!(forecast[0] > data[data.len() - 1]);
        assert!(forecast[1] > forecast[0]);
        assert!((forecast[0] - 82.0).abs() < 1.0);
    }

    #[test]
    fn test_no_differencing() {
        let data: Vec<f64> = (0..30).map(|x| 10.0 + ((x % 4) as f64 - 1.5)).collect();
        let mut model = ArPredictor::new(3, 0).unwrap();

        model.fit(&data).unwrap();
        let forecast = model.predict(1).unwrap();
        assert!(forecast[0].is_finite());
    }
}
