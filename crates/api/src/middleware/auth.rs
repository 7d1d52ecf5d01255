//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{AppState, error::ApiError};
use loanflow_core::auth::{Actor, Role};
use loanflow_shared::{Claims, JwtError, UserId};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError::unauthorized("Authorization header with Bearer token is required")
            .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            let message = match e {
                JwtError::Expired => "Token has expired",
                _ => "Invalid or malformed token",
            };
            ApiError::unauthorized(message).into_response()
        }
    }
}

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl IntoResponse {
///     let actor = auth.actor();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    claims: Claims,
    actor: Actor,
}

impl AuthUser {
    /// Returns the caller as an engine actor.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        self.actor
    }

    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.actor.id
    }

    /// Returns the user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.actor.role
    }

    /// Returns the inner claims.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.claims
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let role = Role::parse(&claims.role)
            .ok_or_else(|| ApiError::unauthorized("Token carries an unknown role"))?;
        let actor = Actor::new(UserId::from_uuid(claims.user_id()), role);

        Ok(Self { claims, actor })
    }
}
