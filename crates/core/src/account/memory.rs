//! In-memory user store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use loanflow_shared::UserId;

use crate::account::store::UserStore;
use crate::account::types::UserAccount;
use crate::auth::Role;
use crate::store::StoreError;

/// User store kept in process memory.
///
/// Uniqueness spans every record, so inserts take a single write lock.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<UserId, UserAccount>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), StoreError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == account.email) {
            return Err(StoreError::Conflict("Email already registered".to_string()));
        }
        if users.values().any(|u| u.username == account.username) {
            return Err(StoreError::Conflict("Username already taken".to_string()));
        }

        users.insert(account.id, account.clone());
        Ok(())
    }

    async fn find(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<UserAccount>, StoreError> {
        let mut users: Vec<UserAccount> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(users)
    }
}
