//! Repository abstractions for data access.
//!
//! Repositories implement the store traits from `loanflow-core`, hiding the
//! `SeaORM` implementation details from the rest of the application.

pub mod loan;
pub mod user;

pub use loan::LoanRepository;
pub use user::UserRepository;

use loanflow_core::StoreError;
use sea_orm::{DbErr, SqlErr};

/// Maps a database error onto the store contract.
pub(crate) fn store_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            StoreError::Conflict(conflict_message(&detail))
        }
        _ => StoreError::Unavailable(err.to_string()),
    }
}

fn conflict_message(detail: &str) -> String {
    if detail.contains("email") {
        "Email already registered".to_string()
    } else if detail.contains("username") {
        "Username already taken".to_string()
    } else {
        "Record already exists".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_column() {
        assert_eq!(
            conflict_message("duplicate key value violates unique constraint \"users_email_key\""),
            "Email already registered"
        );
        assert_eq!(
            conflict_message("duplicate key value violates unique constraint \"users_username_key\""),
            "Username already taken"
        );
        assert_eq!(conflict_message("loan_applications_pkey"), "Record already exists");
    }

    #[test]
    fn test_plain_db_error_is_unavailable() {
        let err = store_error(DbErr::Custom("connection reset".to_string()));
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
