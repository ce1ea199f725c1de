use thiserror::Error;

use crate::actions::ActionError;

/// Errors raised while building or driving a temporary registry.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("creating temporary registry: {0}")]
    Provision(#[from] std::io::Error),

    #[error("setting up repository: {0}")]
    Setup(#[from] tempreg_repo::RepoError),

    #[error("creating remote: {0}")]
    Remote(#[from] tempreg_registry::RegistryError),

    #[error("seeding with {action}: {source}")]
    Seed {
        action: String,
        #[source]
        source: Box<HarnessError>,
    },

    #[error("action not found: '{key}'")]
    ActionNotFound { key: String },

    #[error("running action {action}: {source}")]
    ActionExecution {
        action: String,
        #[source]
        source: ActionError,
    },
}

impl HarnessError {
    /// Fatal errors abort startup; the rest are reported per request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Provision(_) | Self::Setup(_) | Self::Remote(_) | Self::Seed { .. }
        )
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
