//! Loan application routes.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::{AppState, ApiError, ApiResponse, middleware::AuthUser};
use loanflow_core::loan::{LoanApplication, LoanStatus, LoanSubmission};
use loanflow_shared::{LoanId, UserId};

/// Creates the loan routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loans", get(list_loans).post(submit_loan))
        .route("/loans/mine", get(my_loans))
        .route("/loans/user/{user_id}", get(loans_for_user))
        .route("/loans/{loan_id}", get(get_loan))
        .route("/loans/{loan_id}/verify", put(verify_loan))
        .route("/loans/{loan_id}/admin-process", put(admin_process_loan))
        .route("/loans/{loan_id}/cancel", put(cancel_loan))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for submitting a loan.
///
/// Missing fields default to empty so the engine reports them by name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLoanRequest {
    /// Requested principal.
    #[serde(default)]
    pub amount: Decimal,
    /// Term in months.
    #[serde(default)]
    pub term_months: i64,
    /// Loan purpose.
    #[serde(default)]
    pub purpose: String,
    /// Employment status.
    #[serde(default)]
    pub employment_status: String,
    /// Employer name.
    pub employer_name: Option<String>,
    /// Employer address.
    #[serde(default)]
    pub employer_address: String,
}

impl From<SubmitLoanRequest> for LoanSubmission {
    fn from(req: SubmitLoanRequest) -> Self {
        Self {
            amount: req.amount,
            term_months: req.term_months,
            purpose: req.purpose,
            employment_status: req.employment_status,
            employer_name: req.employer_name,
            employer_address: req.employer_address,
        }
    }
}

/// Request body for a review decision.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    /// Requested status.
    pub status: String,
    /// Optional reviewer comment.
    pub comment: Option<String>,
}

/// Query parameters for listing loans.
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// Filter by status.
    pub status: Option<String>,
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_loan_id(raw: &str) -> Result<LoanId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("Invalid loan id: {raw}")))
}

fn parse_status(raw: &str) -> Result<LoanStatus, ApiError> {
    LoanStatus::parse(raw).ok_or_else(|| ApiError::validation(format!("Unknown status: {raw}")))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /loans - Submit an application as the caller.
async fn submit_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<SubmitLoanRequest>, JsonRejection>,
) -> Result<ApiResponse<LoanApplication>, ApiError> {
    let Json(payload) = payload?;

    let loan = state.loans.submit(auth.user_id(), payload.into()).await?;

    info!(loan_id = %loan.id, borrower_id = %loan.borrower_id, amount = %loan.amount, "Loan submitted");
    Ok(ApiResponse::created(loan))
}

/// GET /loans?status= - List every loan (staff only).
async fn list_loans(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ListLoansQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<LoanApplication>>, ApiError> {
    let Query(query) = query?;
    let status = query.status.as_deref().map(parse_status).transpose()?;

    let loans = state.loans.list_all(auth.role(), status).await?;
    Ok(ApiResponse::ok(loans))
}

/// GET /loans/mine - The caller's loans.
async fn my_loans(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<Vec<LoanApplication>>, ApiError> {
    let loans = state
        .loans
        .list_for_borrower(auth.actor(), auth.user_id())
        .await?;
    Ok(ApiResponse::ok(loans))
}

/// GET /loans/user/{user_id} - A borrower's loans.
async fn loans_for_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<Vec<LoanApplication>>, ApiError> {
    let borrower: UserId = user_id
        .parse()
        .map_err(|_| ApiError::validation(format!("Invalid user id: {user_id}")))?;

    let loans = state.loans.list_for_borrower(auth.actor(), borrower).await?;
    Ok(ApiResponse::ok(loans))
}

/// GET /loans/{loan_id} - A single loan.
async fn get_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(loan_id): Path<String>,
) -> Result<ApiResponse<LoanApplication>, ApiError> {
    let loan_id = parse_loan_id(&loan_id)?;
    let loan = state.loans.get(loan_id, auth.actor()).await?;
    Ok(ApiResponse::ok(loan))
}

/// PUT /loans/{loan_id}/verify - Verifier-stage decision.
async fn verify_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(loan_id): Path<String>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<ApiResponse<LoanApplication>, ApiError> {
    let loan_id = parse_loan_id(&loan_id)?;
    let Json(payload) = payload?;
    let decision = parse_status(&payload.status)?;

    let loan = state
        .loans
        .verify(loan_id, decision, auth.actor(), payload.comment.as_deref())
        .await?;

    info!(loan_id = %loan.id, status = %loan.status, verifier_id = %auth.user_id(), "Loan verified");
    Ok(ApiResponse::ok(loan))
}

/// PUT /loans/{loan_id}/admin-process - Admin-stage decision.
async fn admin_process_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(loan_id): Path<String>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<ApiResponse<LoanApplication>, ApiError> {
    let loan_id = parse_loan_id(&loan_id)?;
    let Json(payload) = payload?;
    let decision = parse_status(&payload.status)?;

    let loan = state
        .loans
        .admin_process(loan_id, decision, auth.actor(), payload.comment.as_deref())
        .await?;

    info!(loan_id = %loan.id, status = %loan.status, admin_id = %auth.user_id(), "Loan processed");
    Ok(ApiResponse::ok(loan))
}

/// PUT /loans/{loan_id}/cancel - Cancel a pending loan.
async fn cancel_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(loan_id): Path<String>,
) -> Result<ApiResponse<LoanApplication>, ApiError> {
    let loan_id = parse_loan_id(&loan_id)?;
    let loan = state.loans.cancel(loan_id, auth.actor()).await?;

    info!(loan_id = %loan.id, cancelled_by = %auth.user_id(), "Loan cancelled");
    Ok(ApiResponse::ok(loan))
}
