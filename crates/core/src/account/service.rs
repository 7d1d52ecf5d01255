//! Account registration, login, and staff management.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use loanflow_shared::UserId;

use crate::account::error::AccountError;
use crate::account::store::UserStore;
use crate::account::types::{NewAccount, UserAccount, normalize_email};
use crate::auth::{Actor, MIN_PASSWORD_LEN, Role, hash_password, verify_password};
use crate::store::{StoreError, store_now};

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=50;

/// Account service over a [`UserStore`].
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
    timeout: Duration,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    /// Creates a service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Self-registration. Always creates a USER account.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad input or `Conflict` if the username or
    /// email is taken.
    pub async fn register(&self, input: NewAccount) -> Result<UserAccount, AccountError> {
        self.create(input, Role::User, None).await
    }

    /// Creates a VERIFIER or ADMIN account on behalf of an admin.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless `actor` is an admin, `Validation` if `role`
    /// is USER or input is bad, or `Conflict` on duplicates.
    pub async fn create_staff(
        &self,
        actor: Actor,
        input: NewAccount,
        role: Role,
    ) -> Result<UserAccount, AccountError> {
        if !actor.role.can_manage_users() {
            return Err(AccountError::Forbidden(
                "Only admins may create staff accounts".to_string(),
            ));
        }
        if !role.is_staff() {
            return Err(AccountError::Validation(
                "role must be VERIFIER or ADMIN".to_string(),
            ));
        }
        self.create(input, role, Some(actor.id)).await
    }

    /// Creates the first admin unless an account with that email exists.
    ///
    /// Returns `None` when the account was already present.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad input or `Storage` on store failure.
    pub async fn bootstrap_admin(
        &self,
        input: NewAccount,
    ) -> Result<Option<UserAccount>, AccountError> {
        let email = normalize_email(&input.email);
        if self
            .guarded("find_by_email", self.store.find_by_email(&email))
            .await?
            .is_some()
        {
            return Ok(None);
        }
        self.create(input, Role::Admin, None).await.map(Some)
    }

    /// Checks credentials and returns the account.
    ///
    /// Unknown email, wrong password, and inactive accounts all report the
    /// same error.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials`, `Password`, or `Storage`.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserAccount, AccountError> {
        let email = normalize_email(email);
        let account = self
            .guarded("find_by_email", self.store.find_by_email(&email))
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !account.is_active || !verify_password(password, &account.password_hash)? {
            return Err(AccountError::InvalidCredentials);
        }
        Ok(account)
    }

    /// Fetches an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Storage`.
    pub async fn find(&self, id: UserId) -> Result<UserAccount, AccountError> {
        self.guarded("find", self.store.find(id))
            .await?
            .ok_or(AccountError::NotFound(id))
    }

    /// Lists accounts for an admin, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless `actor` is an admin.
    pub async fn list(
        &self,
        actor: Actor,
        role: Option<Role>,
    ) -> Result<Vec<UserAccount>, AccountError> {
        if !actor.role.can_manage_users() {
            return Err(AccountError::Forbidden(
                "Only admins may list accounts".to_string(),
            ));
        }
        self.guarded("list", self.store.list(role)).await
    }

    async fn create(
        &self,
        input: NewAccount,
        role: Role,
        created_by: Option<UserId>,
    ) -> Result<UserAccount, AccountError> {
        let username = input.username.trim().to_string();
        let email = normalize_email(&input.email);
        validate(&username, &email, &input.password)?;

        let now = store_now();
        let account = UserAccount {
            id: UserId::new(),
            username,
            email,
            password_hash: hash_password(&input.password)?,
            role,
            full_name: input
                .full_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            is_active: true,
            created_by,
            created_at: now,
            updated_at: now,
        };

        self.guarded("insert", self.store.insert(&account)).await?;
        Ok(account)
    }

    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> Result<T, AccountError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(AccountError::from),
            Err(_) => Err(AccountError::Storage(StoreError::Timeout { operation })),
        }
    }
}

fn validate(username: &str, email: &str, password: &str) -> Result<(), AccountError> {
    if !USERNAME_LEN.contains(&username.chars().count()) {
        return Err(AccountError::Validation(
            "username must be between 3 and 50 characters".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(AccountError::Validation(
            "email must be a valid address".to_string(),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
