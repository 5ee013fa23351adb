//! Store-layer errors.
//!
//! These are the raw errors the stores surface; the service layer classifies
//! them into the wire-facing taxonomy. `NotFound` doubles as the layering
//! signal inside the composite store: a `NotFound` from the mutable backend
//! falls through to the immutable one, every other error surfaces
//! immediately.

use thunder_core::ResourceKey;

/// Errors surfaced by any store backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No entity under the requested key
    #[error("resource not found")]
    NotFound,

    /// The backend does not support this mutation (immutable store)
    #[error("operation not supported by this store")]
    OperationNotSupported,

    /// Stored payload variant does not match the requested kind; treated as
    /// data corruption, not a recoverable condition
    #[error("payload type mismatch for {key}")]
    PayloadMismatch {
        /// Key whose payload failed the type check
        key: ResourceKey,
    },

    /// An atomic uniqueness constraint rejected the write
    #[error("uniqueness violation: {0}")]
    UniqueViolation(String),

    /// The operation was cancelled by the request deadline or caller
    #[error("operation cancelled")]
    Cancelled,

    /// Backend fault (connectivity, I/O)
    #[error("store failure: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether this is the fall-through signal for composite reads.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
