//! Domain error model.

use thiserror::Error;

/// Result type used across the pure crates.
pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic failures raised before any IO happens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input or fetched data outside its allowed range.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Text that does not parse as an identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
