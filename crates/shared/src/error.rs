//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every failure that reaches an HTTP caller is expressed as one of these
/// variants so status codes and error codes stay consistent across routes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Access denied.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Loan lifecycle rule violation.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Conflict (e.g., duplicate entry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage collaborator failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::InvalidTransition(_) | Self::Conflict(_) => 409,
            Self::Storage(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::Conflict(_) => "CONFLICT",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the caller-facing message without the category prefix.
    ///
    /// Server-side failures never leak their detail.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::InvalidTransition(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Storage(_) => "The loan store is unavailable; re-query before retrying".to_string(),
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    /// Returns true for failures caused by a collaborator rather than the caller.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Internal(_))
    }
}
