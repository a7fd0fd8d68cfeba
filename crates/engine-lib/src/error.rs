//! Error types for the optimization engine
//!
//! Only configuration problems are real errors: they fail fast at
//! engine construction, before any resource is evaluated. Missing
//! samples and pricing lookup misses are not errors; they resolve to
//! explicit recommendation outcomes so batch processing stays total.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed thresholds or policy settings. Never partially applied.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Inventory snapshot could not be read or parsed
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl EngineError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        EngineError::Configuration(msg.into())
    }
}
