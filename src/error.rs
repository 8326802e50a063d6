//! Error types for the Promille engine

use thiserror::Error;

/// Errors that can occur at the engine boundary.
///
/// The computation core itself is total over its input domain and never
/// produces these; they arise only when parsing collaborator JSON or
/// encoding snapshot output.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to parse record log: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
