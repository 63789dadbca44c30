//! # engine
//!
//! The leak-detection engine. Owns the usage history, a forecaster,
//! and an anomaly scorer; every ingested reading is appended to the
//! store, the models are rebuilt per policy, and the classifier fuses
//! their outputs into a [`Verdict`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use engine::{DetectionEngine, EngineConfig};
//!
//! let mut engine = DetectionEngine::open("water_usage_data.csv", EngineConfig::default()).unwrap();
//! let verdict = engine.ingest(11.0, Some(10.0)).unwrap();
//! println!("{:?} ({}%)", verdict.status, verdict.leak_probability);
//! ```

mod classifier;
mod config;
mod engine;
mod error;
mod verdict;

pub use classifier::{classify, LeakStatus};
pub use config::{EngineConfig, RetrainPolicy};
pub use engine::DetectionEngine;
pub use error::{EngineError, Result};
pub use verdict::{ExpectedUsage, Verdict};
