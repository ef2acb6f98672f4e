//! Error handling module
//!
//! Provides the unified error type for the engine. The analysis functions in
//! this crate are total over arbitrary SQL text and never fail; errors only
//! arise at the JSON boundary with the introspection/validation collaborators.

use thiserror::Error;

/// Engine-wide error type
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid schema document: {0}")]
    InvalidSchema(#[from] serde_json::Error),
}

/// Result type alias for engine entry points that can fail
pub type EngineResult<T> = Result<T, EngineError>;
