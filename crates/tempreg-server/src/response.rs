//! JSON envelope shared by every route.
//!
//! ```json
//! {"meta":{"code":200},"data":...}
//! {"meta":{"code":400,"error":"..."}}
//! ```

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            meta: Meta {
                code: StatusCode::OK.as_u16(),
                error: None,
            },
            data: Some(data),
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            meta: Meta {
                code: status.as_u16(),
                error: Some(message.into()),
            },
            data: None,
        }
    }
}

/// Wrap `data` in a 200 envelope.
pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope::ok(data))
}
