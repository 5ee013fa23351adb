//! Classified service-error taxonomy.
//!
//! Every service-layer failure is either a client fault (maps to a 4xx
//! status) or a server fault (5xx). Each error carries a stable machine code
//! with a per-subsystem prefix (`OU-`, `APP-`, `SSE-` for generic server
//! errors), a short error string, and an optional human-readable description.
//!
//! The store layer surfaces raw errors; services classify them into
//! [`ServiceError`]s; the HTTP layer translates the [`ErrorKind`] to a status
//! code and renders the canonical `{ code, message, description }` body.

use serde::Serialize;

/// How a [`ServiceError`] should be treated by the wire layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or out-of-range client input
    InvalidRequest,
    /// The addressed resource does not exist
    NotFound,
    /// A uniqueness or state invariant would be violated
    Conflict,
    /// The operation is not permitted on this resource
    Forbidden,
    /// A server-side fault; the client request was well-formed
    Internal,
}

impl ErrorKind {
    /// Whether this kind maps to a 4xx status.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        !matches!(self, Self::Internal)
    }
}

/// A classified service failure with a stable machine code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    /// Treatment class for the wire layer
    pub kind: ErrorKind,
    /// Stable machine code, e.g. `OU-CANNOT-MODIFY-IMMUTABLE`
    pub code: &'static str,
    /// Short error string
    pub message: &'static str,
    /// Optional human-readable elaboration
    pub description: String,
}

impl ServiceError {
    /// Build an error with an empty description.
    #[must_use]
    pub const fn new(kind: ErrorKind, code: &'static str, message: &'static str) -> Self {
        Self {
            kind,
            code,
            message,
            description: String::new(),
        }
    }

    /// Attach a human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Organization-unit error catalog (`OU-` prefix).
pub mod ou {
    use super::{ErrorKind, ServiceError};

    /// Malformed request body.
    #[must_use]
    pub const fn invalid_request_format() -> ServiceError {
        ServiceError::new(
            ErrorKind::InvalidRequest,
            "OU-INVALID-REQUEST-FORMAT",
            "Invalid request format",
        )
    }

    /// `limit` outside the accepted range.
    #[must_use]
    pub const fn invalid_limit() -> ServiceError {
        ServiceError::new(
            ErrorKind::InvalidRequest,
            "OU-INVALID-LIMIT",
            "Invalid pagination limit",
        )
    }

    /// Negative or non-numeric `offset`.
    #[must_use]
    pub const fn invalid_offset() -> ServiceError {
        ServiceError::new(
            ErrorKind::InvalidRequest,
            "OU-INVALID-OFFSET",
            "Invalid pagination offset",
        )
    }

    /// Empty or all-slash handle path on the tree surface.
    #[must_use]
    pub const fn invalid_handle_path() -> ServiceError {
        ServiceError::new(
            ErrorKind::InvalidRequest,
            "OU-INVALID-HANDLE-PATH",
            "Invalid handle path",
        )
    }

    /// Lookup failure for the addressed OU.
    #[must_use]
    pub const fn not_found() -> ServiceError {
        ServiceError::new(
            ErrorKind::NotFound,
            "OU-NOT-FOUND",
            "Organization unit not found",
        )
    }

    /// The referenced parent OU does not exist in any backend.
    #[must_use]
    pub const fn parent_not_found() -> ServiceError {
        ServiceError::new(
            ErrorKind::InvalidRequest,
            "OU-PARENT-NOT-FOUND",
            "Parent organization unit not found",
        )
    }

    /// `(parent, name)` already taken across the union of backends.
    #[must_use]
    pub const fn name_conflict() -> ServiceError {
        ServiceError::new(
            ErrorKind::Conflict,
            "OU-NAME-CONFLICT",
            "An organization unit with the same name exists under the same parent",
        )
    }

    /// `(parent, handle)` already taken across the union of backends.
    #[must_use]
    pub const fn handle_conflict() -> ServiceError {
        ServiceError::new(
            ErrorKind::Conflict,
            "OU-HANDLE-CONFLICT",
            "An organization unit with the same handle exists under the same parent",
        )
    }

    /// Re-parenting would create a cycle.
    #[must_use]
    pub const fn circular_dependency() -> ServiceError {
        ServiceError::new(
            ErrorKind::InvalidRequest,
            "OU-CIRCULAR-DEPENDENCY",
            "Operation would create a circular parent relation",
        )
    }

    /// The OU still owns child resources.
    #[must_use]
    pub const fn cannot_delete() -> ServiceError {
        ServiceError::new(
            ErrorKind::Conflict,
            "OU-CANNOT-DELETE",
            "Organization unit has child resources",
        )
    }

    /// The target exists only in the immutable file store.
    #[must_use]
    pub const fn cannot_modify_immutable() -> ServiceError {
        ServiceError::new(
            ErrorKind::Forbidden,
            "OU-CANNOT-MODIFY-IMMUTABLE",
            "Immutable organization units cannot be modified",
        )
    }
}

/// Application error catalog (`APP-` prefix).
pub mod app {
    use super::{ErrorKind, ServiceError};

    /// Malformed request body.
    #[must_use]
    pub const fn invalid_request_format() -> ServiceError {
        ServiceError::new(
            ErrorKind::InvalidRequest,
            "APP-INVALID-REQUEST-FORMAT",
            "Invalid request format",
        )
    }

    /// `limit` outside the accepted range.
    #[must_use]
    pub const fn invalid_limit() -> ServiceError {
        ServiceError::new(
            ErrorKind::InvalidRequest,
            "APP-INVALID-LIMIT",
            "Invalid pagination limit",
        )
    }

    /// Negative or non-numeric `offset`.
    #[must_use]
    pub const fn invalid_offset() -> ServiceError {
        ServiceError::new(
            ErrorKind::InvalidRequest,
            "APP-INVALID-OFFSET",
            "Invalid pagination offset",
        )
    }

    /// Lookup failure for the addressed application.
    #[must_use]
    pub const fn not_found() -> ServiceError {
        ServiceError::new(ErrorKind::NotFound, "APP-NOT-FOUND", "Application not found")
    }

    /// An application with the same name already exists.
    #[must_use]
    pub const fn already_exists() -> ServiceError {
        ServiceError::new(
            ErrorKind::Conflict,
            "APP-ALREADY-EXISTS",
            "An application with the same name already exists",
        )
    }

    /// The target exists only in the immutable file store.
    #[must_use]
    pub const fn cannot_modify_immutable() -> ServiceError {
        ServiceError::new(
            ErrorKind::Forbidden,
            "APP-CANNOT-MODIFY-IMMUTABLE",
            "Immutable applications cannot be modified",
        )
    }

    /// Stored payload failed the type check at read time.
    #[must_use]
    pub const fn data_corrupted() -> ServiceError {
        ServiceError::new(
            ErrorKind::Internal,
            "APP-DATA-CORRUPTED",
            "Stored application data is corrupted",
        )
    }
}

/// Generic server-error catalog (`SSE-` prefix).
pub mod server {
    use super::{ErrorKind, ServiceError};

    /// Catch-all server fault; the wire surface has no finer code.
    #[must_use]
    pub const fn internal() -> ServiceError {
        ServiceError::new(
            ErrorKind::Internal,
            "SSE-INTERNAL-ERROR",
            "Internal server error",
        )
    }
}
