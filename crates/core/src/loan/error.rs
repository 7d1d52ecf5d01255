//! Loan lifecycle error types.

use thiserror::Error;

use loanflow_shared::{AppError, LoanId};

use crate::loan::types::LoanStatus;
use crate::store::StoreError;

/// Errors that can occur during loan submission, transitions, and queries.
#[derive(Debug, Error)]
pub enum LoanError {
    /// Input was missing or invalid; `message` names the field.
    #[error("{message}")]
    Validation {
        /// First offending field.
        field: &'static str,
        /// Human-readable reason.
        message: String,
    },

    /// The referenced loan does not exist.
    #[error("Loan application {0} not found")]
    NotFound(LoanId),

    /// The actor's role or ownership does not permit the operation.
    #[error("{0}")]
    Forbidden(String),

    /// The state machine does not allow the requested transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: LoanStatus,
        /// The requested status.
        to: LoanStatus,
    },

    /// The store failed or timed out.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl LoanError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::InvalidTransition { .. } => 409,
            Self::Storage(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound(_) => "LOAN_NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<LoanError> for AppError {
    fn from(err: LoanError) -> Self {
        let message = err.to_string();
        match err {
            LoanError::Validation { .. } => Self::Validation(message),
            LoanError::NotFound(_) => Self::NotFound(message),
            LoanError::Forbidden(_) => Self::Forbidden(message),
            LoanError::InvalidTransition { .. } => Self::InvalidTransition(message),
            LoanError::Storage(_) => Self::Storage(message),
        }
    }
}
