use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tempreg_harness::HarnessError;
use tempreg_registry::RegistryError;
use tempreg_repo::RepoError;
use thiserror::Error;

use crate::response::Envelope;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Timeout(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("binding {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::Config(_) | Self::Bind { .. } | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<RegistryError> for ServerError {
    fn from(e: RegistryError) -> Self {
        let msg = e.to_string();
        match e {
            RegistryError::NotFound(_) => Self::NotFound(msg),
            RegistryError::Disabled | RegistryError::RemovesNotAllowed => Self::Forbidden(msg),
            RegistryError::TooLarge { .. } => Self::PayloadTooLarge(msg),
            RegistryError::IncompleteBlocks(_) | RegistryError::InvalidPush(_) => {
                Self::BadRequest(msg)
            }
            RegistryError::Timeout(_) => Self::Timeout(msg),
            RegistryError::ProfileConflict { .. } => Self::Conflict(msg),
            RegistryError::Repo(
                RepoError::InvalidName { .. } | RepoError::InvalidRef(_) | RepoError::InvalidBody(_),
            ) => Self::BadRequest(msg),
            _ => Self::Internal(msg),
        }
    }
}

/// Unknown action keys are the caller's fault; everything else that reaches
/// a request is a server failure.
impl From<HarnessError> for ServerError {
    fn from(e: HarnessError) -> Self {
        match &e {
            HarnessError::ActionNotFound { .. } => Self::BadRequest(e.to_string()),
            HarnessError::ActionExecution { source, .. } => Self::Internal(source.to_string()),
            _ => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(Envelope::<()>::error(status, self.to_string()))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
