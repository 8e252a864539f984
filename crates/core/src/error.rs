//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Infrastructure concerns belong elsewhere.
///
/// Authorization denials are **not** modeled here: the access gate returns
/// them as typed decisions, since a denial is an expected outcome rather
/// than a fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (malformed amount, type/sign mismatch,
    /// malformed reversal reference, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation is illegal for the current session status
    /// (e.g. movement against a closed session, double close).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (concurrent open/close race lost, stale version).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A till lock could not be acquired within the bounded wait.
    #[error("till is busy")]
    Busy,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
