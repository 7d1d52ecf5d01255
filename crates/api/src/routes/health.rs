//! Liveness probe for load balancers and the deploy pipeline.
//!
//! Answers without touching the loan or account stores.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

const LOANFLOW_VERSION: &str = env!("CARGO_PKG_VERSION");

/// `GET /health` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Always `healthy` while the process is serving.
    pub status: &'static str,
    /// Crate version of the running build.
    pub version: &'static str,
}

impl HealthStatus {
    const SERVING: Self = Self {
        status: "healthy",
        version: LOANFLOW_VERSION,
    };
}

async fn liveness() -> Json<HealthStatus> {
    Json(HealthStatus::SERVING)
}

/// Routes that need no bearer token.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(liveness))
}
