//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// The four authorization/workflow variants mirror what callers need to
/// render: "you are not allowed" (`Forbidden`) is always distinguished from
/// "that no longer exists" (`NotFound`). Authorization decisions are
/// deterministic given current state and are never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The actor lacks the role or club scope for the requested resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The operation collides with existing state (duplicate pending
    /// request, duplicate nomination, re-resolving a settled request).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced id does not resolve (or resolves to a soft-deleted row).
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed or inapplicable input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The backing store failed. Infrastructure detail, surfaced opaquely.
    #[error("storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
