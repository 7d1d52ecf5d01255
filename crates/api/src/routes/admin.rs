//! Staff account management.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
    routing::get,
};
use serde::Deserialize;
use tracing::info;

use crate::{AppState, ApiError, ApiResponse, middleware::AuthUser, routes::auth::user_info};
use loanflow_core::account::NewAccount;
use loanflow_core::auth::Role;
use loanflow_shared::auth::UserInfo;

/// Creates the admin routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/users", get(list_users).post(create_user))
}

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Filter by role.
    pub role: Option<String>,
}

/// Request body for creating a staff account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Display name.
    pub full_name: Option<String>,
    /// VERIFIER or ADMIN.
    pub role: String,
}

fn parse_role(raw: &str) -> Result<Role, ApiError> {
    Role::parse(raw).ok_or_else(|| ApiError::validation(format!("Unknown role: {raw}")))
}

/// GET /admin/users - List accounts.
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<UserInfo>>, ApiError> {
    let Query(query) = query?;
    let role = query.role.as_deref().map(parse_role).transpose()?;

    let accounts = state.accounts.list(auth.actor(), role).await?;
    Ok(ApiResponse::ok(accounts.iter().map(user_info).collect()))
}

/// POST /admin/users - Create a VERIFIER or ADMIN account.
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateStaffRequest>, JsonRejection>,
) -> Result<ApiResponse<UserInfo>, ApiError> {
    let Json(payload) = payload?;
    let role = parse_role(&payload.role)?;

    let account = state
        .accounts
        .create_staff(
            auth.actor(),
            NewAccount {
                username: payload.username,
                email: payload.email,
                password: payload.password,
                full_name: payload.full_name,
            },
            role,
        )
        .await?;

    info!(
        user_id = %account.id,
        role = %account.role,
        created_by = %auth.user_id(),
        "Staff account created"
    );
    Ok(ApiResponse::created(user_info(&account)))
}
