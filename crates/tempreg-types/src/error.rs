use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid content path: {0}")]
    InvalidPath(String),

    #[error("invalid dataset reference '{input}': {reason}")]
    InvalidRef { input: String, reason: String },
}
