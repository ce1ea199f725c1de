use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid remote policy: {0}")]
    InvalidPolicy(String),

    #[error("node is not ready: no peer id")]
    NodeNotReady,

    #[error("remote is disabled")]
    Disabled,

    #[error("transfer of {size} bytes exceeds limit of {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("transfer is missing blocks: {}", .0.join(", "))]
    IncompleteBlocks(Vec<String>),

    #[error("invalid transfer: {0}")]
    InvalidPush(String),

    #[error("transfer timed out after {0:?}")]
    Timeout(Duration),

    #[error("removing datasets is not allowed")]
    RemovesNotAllowed,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("peername '{peername}' is registered to another profile")]
    ProfileConflict { peername: String },

    #[error("repo error: {0}")]
    Repo(tempreg_repo::RepoError),

    #[error("store error: {0}")]
    Store(#[from] tempreg_store::StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<tempreg_repo::RepoError> for RegistryError {
    fn from(e: tempreg_repo::RepoError) -> Self {
        match e {
            tempreg_repo::RepoError::NotFound(what) => Self::NotFound(what),
            other => Self::Repo(other),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
