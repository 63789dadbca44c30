//! # store
//!
//! CSV-backed time-series store for hourly water-usage readings.
//!
//! The store owns the ordered usage history: it loads a persisted
//! series (or synthesizes a deterministic seed on first run), keeps
//! timestamps strictly increasing with keep-last dedup semantics, and
//! persists every mutation back to disk before committing it in memory.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use store::{Reading, UsageStore};
//!
//! let mut store = UsageStore::load_or_seed("water_usage_data.csv").unwrap();
//! store.append(Reading::new(Utc::now(), 11.4)).unwrap();
//! println!("average usage: {:.2}", store.mean());
//! ```

mod error;
mod reading;
mod series;
mod storage;

pub use error::{Result, StoreError};
pub use reading::{floor_to_hour, Reading};
pub use series::TimeSeries;
pub use storage::{seed_series, UsageStore};
