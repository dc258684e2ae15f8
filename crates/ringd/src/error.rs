//! HTTP error responses for the peer endpoint

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

/// Failures surfaced to HTTP callers as plain-text responses
#[derive(Debug)]
pub enum HttpError {
    /// Path is not `<base>/<group>/<key>`
    BadRequest(String),

    /// Group is not registered
    NoSuchGroup(String),

    /// Group lookup failed
    Cache(ringcache::Error),
}

impl HttpError {
    fn status(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) | HttpError::Cache(ringcache::Error::EmptyKey) => {
                StatusCode::BAD_REQUEST
            }
            HttpError::NoSuchGroup(_) => StatusCode::NOT_FOUND,
            HttpError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            HttpError::BadRequest(msg) => msg.clone(),
            HttpError::NoSuchGroup(group) => format!("no such group: {}", group),
            HttpError::Cache(e) => e.to_string(),
        }
    }
}

impl From<ringcache::Error> for HttpError {
    fn from(err: ringcache::Error) -> Self {
        HttpError::Cache(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            warn!(%status, error = %message, "request failed");
        }
        (status, message).into_response()
    }
}
