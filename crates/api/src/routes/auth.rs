//! Authentication routes for registration, login, and the current account.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use tracing::{info, warn};

use crate::{AppState, ApiError, ApiResponse, middleware::AuthUser};
use loanflow_core::account::{AccountError, NewAccount, UserAccount};
use loanflow_shared::auth::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

/// Creates the auth routes that require a bearer token.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// Converts an account into its public representation.
pub(crate) fn user_info(account: &UserAccount) -> UserInfo {
    UserInfo {
        id: account.id.into_inner(),
        username: account.username.clone(),
        email: account.email.clone(),
        role: account.role.to_string(),
        full_name: account.full_name.clone(),
        is_active: account.is_active,
        created_by: account.created_by.map(|id| id.into_inner()),
        created_at: account.created_at,
    }
}

fn issue(state: &AppState, account: &UserAccount) -> Result<AuthResponse, ApiError> {
    let token = state.jwt_service.issue_token(
        account.id.into_inner(),
        account.role.as_str(),
        &account.email,
    )?;

    Ok(AuthResponse {
        user: user_info(account),
        token,
        expires_in: state.jwt_service.token_expires_in(),
    })
}

/// POST /auth/register - Create a USER account and return a token.
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiResponse<AuthResponse>, ApiError> {
    let Json(payload) = payload?;

    let account = state
        .accounts
        .register(NewAccount {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            full_name: payload.full_name,
        })
        .await?;

    info!(user_id = %account.id, "User registered");
    Ok(ApiResponse::created(issue(&state, &account)?))
}

/// POST /auth/login - Authenticate and return a token.
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<AuthResponse>, ApiError> {
    let Json(payload) = payload?;

    let account = match state
        .accounts
        .authenticate(&payload.email, &payload.password)
        .await
    {
        Ok(account) => account,
        Err(AccountError::InvalidCredentials) => {
            warn!(email = %payload.email, "Failed login attempt");
            return Err(AccountError::InvalidCredentials.into());
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %account.id, role = %account.role, "User logged in");
    Ok(ApiResponse::ok(issue(&state, &account)?))
}

/// GET /auth/me - The caller's account.
async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<UserInfo>, ApiError> {
    let account = state.accounts.find(auth.user_id()).await?;
    Ok(ApiResponse::ok(user_info(&account)))
}
