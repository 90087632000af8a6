//! Mapping archive errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scp_error::{
    DatabaseErrorKind, ReferenceErrorKind, ScpArchiveError, ScpArchiveErrorKind, ServerErrorKind,
};
use serde::Serialize;
use tracing::{debug, error};

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
    /// SCP keys that do not exist, for `MissingReferences`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

/// An archive error on its way to becoming an HTTP response.
#[derive(Debug, derive_more::From)]
pub struct ApiError(ScpArchiveError);

impl ApiError {
    /// The wrapped error.
    pub fn inner(&self) -> &ScpArchiveError {
        &self.0
    }

    /// Status code for the error.
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ScpArchiveErrorKind::Reference(e) => match &e.kind {
                ReferenceErrorKind::ScpNotFound(_) | ReferenceErrorKind::TaleNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                ReferenceErrorKind::MissingReferences(_) | ReferenceErrorKind::NoFieldsProvided => {
                    StatusCode::BAD_REQUEST
                }
                ReferenceErrorKind::ScpAlreadyExists(_)
                | ReferenceErrorKind::ScpStillReferenced { .. } => StatusCode::CONFLICT,
            },
            ScpArchiveErrorKind::Validation(_) => StatusCode::BAD_REQUEST,
            ScpArchiveErrorKind::Database(e) => match e.kind {
                DatabaseErrorKind::DuplicateKey(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ScpArchiveErrorKind::Server(e) => match e.kind {
                ServerErrorKind::InvalidParameter(_) | ServerErrorKind::InvalidBody(_) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ScpArchiveErrorKind::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body for the error. Store failures are not described to clients.
    pub fn body(&self) -> ErrorBody {
        let (error, missing) = match self.0.kind() {
            ScpArchiveErrorKind::Reference(e) => {
                let missing = match &e.kind {
                    ReferenceErrorKind::MissingReferences(keys) => Some(keys.clone()),
                    _ => None,
                };
                (e.kind.to_string(), missing)
            }
            ScpArchiveErrorKind::Validation(e) => (format!("{} {}", e.field, e.reason), None),
            ScpArchiveErrorKind::Database(e) => match &e.kind {
                DatabaseErrorKind::DuplicateKey(_) => (e.kind.to_string(), None),
                _ => ("Document store error".to_string(), None),
            },
            ScpArchiveErrorKind::Server(e) => match &e.kind {
                ServerErrorKind::InvalidParameter(_) | ServerErrorKind::InvalidBody(_) => {
                    (e.kind.to_string(), None)
                }
                _ => ("Internal server error".to_string(), None),
            },
            ScpArchiveErrorKind::Config(_) => ("Internal server error".to_string(), None),
        };
        ErrorBody { error, missing }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            debug!(status = %status, error = %self.0, "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
