//! Account domain types.

use chrono::{DateTime, Utc};

use loanflow_shared::UserId;

use crate::auth::Role;

/// A stored user account.
///
/// Deliberately not `Serialize`: the password hash never leaves the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Account ID.
    pub id: UserId,
    /// Unique login handle.
    pub username: String,
    /// Unique email, stored lower-case.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Display name.
    pub full_name: Option<String>,
    /// Inactive accounts cannot log in.
    pub is_active: bool,
    /// Admin who created this staff account.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Requested username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Optional display name.
    pub full_name: Option<String>,
}

/// Normalizes an email for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
