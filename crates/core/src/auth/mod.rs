//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Account role definitions
//! - The `Actor` passed explicitly into every engine operation

mod password;

pub use password::{MIN_PASSWORD_LEN, PasswordError, hash_password, verify_password};

use serde::{Deserialize, Serialize};

use loanflow_shared::UserId;

/// Account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Borrower; may submit and cancel their own applications.
    User,
    /// Reviews pending applications.
    Verifier,
    /// Decides verified applications and manages staff accounts.
    Admin,
}

impl Role {
    /// Every role, lowest privilege first.
    pub const ALL: [Self; 3] = [Self::User, Self::Verifier, Self::Admin];

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Verifier => "VERIFIER",
            Self::Admin => "ADMIN",
        }
    }

    /// Parses a role from a string, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Some(Self::User),
            "VERIFIER" => Some(Self::Verifier),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns true if this role may see every application.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Verifier | Self::Admin)
    }

    /// Returns true if this role can create and list accounts.
    #[must_use]
    pub const fn can_manage_users(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of an engine operation.
///
/// Identity and role arrive from a verified bearer token; the engine trusts them verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Caller's account ID.
    pub id: UserId,
    /// Caller's role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}
