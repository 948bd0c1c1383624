//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, ErrorKind};
use event_store::EventStoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request the domain never saw.
    BadRequest(String),
    /// Domain rule violation, classified by [`ErrorKind`].
    Domain(DomainError),
}

impl ApiError {
    /// Status code for an error class.
    pub fn status_for(kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::InvalidTransition | ErrorKind::InactiveRoute | ErrorKind::Precondition => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorKind::Validation, msg),
            ApiError::Domain(err) => {
                let kind = err.kind();
                if kind == ErrorKind::Internal {
                    tracing::error!(error = %err, "domain invariant broken");
                } else {
                    tracing::debug!(error = %err, %kind, "request rejected");
                }
                (Self::status_for(kind), kind, err.to_string())
            }
        };

        metrics::counter!("api_errors_total", "kind" => kind.as_str()).increment(1);

        let body = serde_json::json!({ "error": message, "kind": kind });
        (status, axum::Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<EventStoreError> for ApiError {
    fn from(err: EventStoreError) -> Self {
        ApiError::Domain(DomainError::from(err))
    }
}
