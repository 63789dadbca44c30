//! # forecast
//!
//! One-step-ahead (and multi-step) usage forecasting.
//!
//! The crate provides [`ArPredictor`], an autoregressive model fitted
//! on a differenced series, behind the fit-predict [`Predictor`]
//! trait.
//!
//! ## Example
//!
//! ```rust
//! use forecast::{ArPredictor, Predictor};
//!
//! let data: Vec<f64> = (1..=30).map(|x| x as f64).collect();
//! let mut model = ArPredictor::new(5, 1).unwrap();
//! model.fit(&data).unwrap();
//! let next = model.predict(1).unwrap();
//! assert_eq!(next.len(), 1);
//! ```

mod ar;
mod error;

pub use ar::ArPredictor;
pub use error::{ForecastError, Result};

/// Common trait for time series predictors.
///
/// Follows the fit-predict pattern: a model is fitted over historical
/// data and then queried for any number of future steps.
pub trait Predictor {
    /// Fit the model to historical data.
    fn fit(&mut self, data: &[f64]) -> Result<()>;

    /// Predict the next `steps` values.
    fn predict(&self, steps: usize) -> Result<Vec<f64>>;

    /// Whether the model has been successfully fitted.
    fn is_fitted(&self) -> bool;
}
