//! Response envelope.
//!
//! Every response produced by the pipeline and its handlers has the shape
//! `{"status": <int>, "message": <string>, "data": <any|null>}` and the HTTP
//! status equals `status`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Message used for every successful continuation.
pub const SUCCESS: &str = "Success";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    pub status: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// 200 "Success" carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: SUCCESS.to_string(),
            data: Some(data),
        }
    }

    pub fn new(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl Envelope {
    /// Envelope with null data.
    pub fn empty(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, message, None)
    }

    /// Envelope whose message is the status' standard reason phrase.
    pub fn reason(status: StatusCode) -> Self {
        Self::empty(status, status.canonical_reason().unwrap_or_default())
    }

    /// The uniform response for every token and authorization rejection.
    pub fn unauthorized() -> Self {
        Self::reason(StatusCode::UNAUTHORIZED)
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
