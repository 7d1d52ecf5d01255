//! User repository for database operations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use loanflow_core::StoreError;
use loanflow_core::account::{UserAccount, UserStore};
use loanflow_core::auth::Role;
use loanflow_shared::UserId;

use crate::entities::{sea_orm_active_enums::UserRole, users};
use crate::repositories::store_error;

/// User repository implementing [`UserStore`].
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), StoreError> {
        let user = users::ActiveModel {
            id: Set(account.id.into_inner()),
            username: Set(account.username.clone()),
            email: Set(account.email.clone()),
            password_hash: Set(account.password_hash.clone()),
            role: Set(account.role.into()),
            full_name: Set(account.full_name.clone()),
            is_active: Set(account.is_active),
            created_by: Set(account.created_by.map(UserId::into_inner)),
            created_at: Set(account.created_at.into()),
            updated_at: Set(account.updated_at.into()),
        };

        user.insert(&self.db).await.map_err(store_error)?;
        debug!(user_id = %account.id, role = %account.role, "Inserted user");
        Ok(())
    }

    async fn find(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        Ok(users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(to_domain))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(to_domain))
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<UserAccount>, StoreError> {
        let mut query = users::Entity::find();
        if let Some(role) = role {
            let role: UserRole = role.into();
            query = query.filter(users::Column::Role.eq(role));
        }

        Ok(query
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(to_domain)
            .collect())
    }
}

fn to_domain(model: users::Model) -> UserAccount {
    UserAccount {
        id: UserId::from_uuid(model.id),
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        role: model.role.into(),
        full_name: model.full_name,
        is_active: model.is_active,
        created_by: model.created_by.map(UserId::from_uuid),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
