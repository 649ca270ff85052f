//! # AppError
//!
//! Centralized error handling for the deckshare ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all deck-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Resource not found (e.g., Presentation, User, Client)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., malformed image payload, missing title)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Missing or invalid credentials at the auth layer
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is known but not allowed (ownership mismatch, wrong password, expired link)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Infrastructure failure (e.g., DB down, disk full)
    #[error("internal service error: {0}")]
    Internal(String),

    /// Resource already exists (e.g., duplicate email, share id collision)
    #[error("conflict: {0}")]
    Conflict(String),
}

impl AppError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound(entity.to_string(), id.to_string())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::ValidationError(errors.to_string())
    }
}

/// A specialized Result type for deckshare logic.
pub type Result<T> = std::result::Result<T, AppError>;
