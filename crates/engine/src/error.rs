//! Engine error types.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the detection engine.
///
/// Model-fit problems degrade the verdict (mean fallback, zero score)
/// instead of erroring; only storage failures reach the caller.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The persisted series could not be read or written
    #[error("Storage error: {0}")]
    Store(#[from] store::StoreError),
}
