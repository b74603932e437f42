//! Domain error model.
//!
//! One taxonomy for every failure the authorization core can surface. Each kind
//! is terminal for the current call; nothing here is retried.

use thiserror::Error;

/// Result type used across the domain and service layers.
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No valid identity was presented.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Identity present but lacking role, permission or organization reach.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A referenced entity id does not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// An invariant would be violated (duplicate email, hierarchy depth, ...).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed or unacceptable input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A storage call failed. Propagated as an internal error.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Any other infrastructure failure (token signing, credential hashing).
    #[error("internal failure: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short machine-readable code, used by the HTTP boundary.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Unauthenticated => "unauthenticated",
            DomainError::Forbidden(_) => "forbidden",
            DomainError::NotFound(_) => "not_found",
            DomainError::Conflict(_) => "conflict",
            DomainError::BadRequest(_) => "bad_request",
            DomainError::Storage(_) | DomainError::Internal(_) => "internal_error",
        }
    }
}
