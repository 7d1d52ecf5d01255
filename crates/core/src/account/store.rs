//! Persistence contract for user accounts.

use async_trait::async_trait;

use loanflow_shared::UserId;

use crate::account::types::UserAccount;
use crate::auth::Role;
use crate::store::StoreError;

/// Storage for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts an account. Fails with `StoreError::Conflict` when the
    /// username or email is taken.
    async fn insert(&self, account: &UserAccount) -> Result<(), StoreError>;

    /// Finds an account by ID.
    async fn find(&self, id: UserId) -> Result<Option<UserAccount>, StoreError>;

    /// Finds an account by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError>;

    /// Lists accounts, optionally filtered by role, newest first.
    async fn list(&self, role: Option<Role>) -> Result<Vec<UserAccount>, StoreError>;
}
