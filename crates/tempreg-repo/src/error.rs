use std::path::PathBuf;

use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("repository already set up at {}", .0.display())]
    AlreadySetup(PathBuf),

    #[error("no repository at {}", .0.display())]
    NotSetup(PathBuf),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("identity error: {0}")]
    Identity(String),

    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("invalid reference: {0}")]
    InvalidRef(#[from] tempreg_types::TypeError),

    #[error("invalid body: {0}")]
    InvalidBody(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] tempreg_store::StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;
