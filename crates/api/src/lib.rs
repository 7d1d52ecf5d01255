//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - The JSON success and error envelopes

pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use loanflow_core::account::{AccountService, MemoryUserStore};
use loanflow_core::loan::{LoanService, MemoryLoanStore};
use loanflow_db::{LoanRepository, UserRepository};
use loanflow_shared::JwtService;

pub use error::ApiError;
pub use response::ApiResponse;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loan lifecycle engine.
    pub loans: Arc<LoanService>,
    /// Account registration, login, and staff management.
    pub accounts: Arc<AccountService>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    /// Builds state backed by `PostgreSQL` repositories.
    #[must_use]
    pub fn with_database(
        db: &DatabaseConnection,
        jwt_service: JwtService,
        store_timeout: Duration,
    ) -> Self {
        Self {
            loans: Arc::new(LoanService::new(
                Arc::new(LoanRepository::new(db.clone())),
                store_timeout,
            )),
            accounts: Arc::new(AccountService::new(
                Arc::new(UserRepository::new(db.clone())),
                store_timeout,
            )),
            jwt_service: Arc::new(jwt_service),
        }
    }

    /// Builds state backed by in-memory stores.
    #[must_use]
    pub fn in_memory(jwt_service: JwtService, store_timeout: Duration) -> Self {
        Self {
            loans: Arc::new(LoanService::new(
                Arc::new(MemoryLoanStore::new()),
                store_timeout,
            )),
            accounts: Arc::new(AccountService::new(
                Arc::new(MemoryUserStore::new()),
                store_timeout,
            )),
            jwt_service: Arc::new(jwt_service),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
