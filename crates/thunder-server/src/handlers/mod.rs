//! HTTP surface: thin adapters from axum to the services.
//!
//! Handlers extract, delegate, and translate. Classified service errors map
//! to statuses in one place: not-found to 404, conflicts to 409, forbidden
//! to 403, other client errors to 400, server errors to 500, always with the
//! canonical `{ code, message, description }` body.

pub mod application;
pub mod health;
pub mod ou;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use thunder_core::{ErrorKind, ServiceError};

/// Canonical wire form of a classified error.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable machine code
    pub code: &'static str,
    /// Short error string
    pub message: &'static str,
    /// Human-readable elaboration, omitted when empty
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Response wrapper for [`ServiceError`].
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind {
            ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            code: self.0.code,
            message: self.0.message,
            description: self.0.description,
        };
        (status, Json(body)).into_response()
    }
}

/// Raw pagination query values; validation happens in the service-facing
/// handlers so range failures carry the subsystem's error code.
#[derive(Debug, Default, serde::Deserialize)]
pub struct PaginationQuery {
    /// Requested page size
    pub limit: Option<String>,
    /// Requested start offset
    pub offset: Option<String>,
}

/// Per-request deadline on the admin surface.
pub(crate) const REQUEST_DEADLINE: std::time::Duration = std::time::Duration::from_secs(30);

/// Fresh request context carrying the standard deadline.
pub(crate) fn request_context() -> crate::context::RequestContext {
    crate::context::RequestContext::with_deadline(REQUEST_DEADLINE)
}
