//! HTTP error mapping.
//!
//! Every supervisor and hub failure becomes a distinct non-200 response with
//! a JSON error body; nothing is silently swallowed.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use vllmd_core::{HubError, SupervisorError};

/// Adapter-level error type returned by handlers.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found (empty handle, unknown model).
    #[error("{0}")]
    NotFound(String),

    /// Invalid request body or configuration.
    #[error("{0}")]
    BadRequest(String),

    /// A serving process already occupies the slot.
    #[error("{0}")]
    Conflict(String),

    /// The serving binary could not be started.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Upstream hub failure.
    #[error("{0}")]
    BadGateway(String),

    /// Internal failure, including unconfirmed termination.
    #[error("{0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl HttpError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
            status: status.as_u16(),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<SupervisorError> for HttpError {
    fn from(err: SupervisorError) -> Self {
        match err {
            SupervisorError::AlreadyRunning { .. } => Self::Conflict(err.to_string()),
            SupervisorError::NotRunning => Self::NotFound(err.to_string()),
            SupervisorError::Configuration(_) => Self::BadRequest(err.to_string()),
            SupervisorError::SpawnFailed(_) => Self::ServiceUnavailable(err.to_string()),
            SupervisorError::Hub(hub) => hub.into(),
            SupervisorError::TerminationIncomplete { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<HubError> for HttpError {
    fn from(err: HubError) -> Self {
        match err {
            HubError::ModelNotFound { .. } => Self::NotFound(err.to_string()),
            HubError::ApiRequestFailed { .. }
            | HubError::Network(_)
            | HubError::InvalidResponse(_) => Self::BadGateway(err.to_string()),
            HubError::Io(_) => Self::Internal(err.to_string()),
        }
    }
}
