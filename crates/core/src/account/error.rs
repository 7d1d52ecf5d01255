//! Account error types.

use thiserror::Error;

use loanflow_shared::{AppError, UserId};

use crate::auth::PasswordError;
use crate::store::StoreError;

/// Errors that can occur during registration, login, and account management.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Username or email already taken.
    #[error("{0}")]
    Conflict(String),

    /// Unknown email, wrong password, or inactive account.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No account with this ID.
    #[error("User {0} not found")]
    NotFound(UserId),

    /// Caller lacks permission.
    #[error("{0}")]
    Forbidden(String),

    /// Hashing or verification failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// The store failed or timed out.
    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => Self::Conflict(message),
            other => Self::Storage(other),
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err {
            AccountError::Validation(_) => Self::Validation(message),
            AccountError::Conflict(_) => Self::Conflict(message),
            AccountError::InvalidCredentials => Self::Unauthorized(message),
            AccountError::NotFound(_) => Self::NotFound(message),
            AccountError::Forbidden(_) => Self::Forbidden(message),
            AccountError::Password(_) => Self::Internal(message),
            AccountError::Storage(_) => Self::Storage(message),
        }
    }
}
