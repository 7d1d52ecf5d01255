//! Loan application lifecycle.
//!
//! This module implements the loan state machine, submission validation,
//! the store contract, and an in-memory store.
//!
//! # Modules
//!
//! - `types` - Loan domain types (LoanStatus, LoanApplication)
//! - `error` - Loan-specific error types
//! - `validation` - Submission field checks
//! - `transition` - Rule table and authorization
//! - `store` - Persistence contract
//! - `memory` - DashMap-backed store
//! - `service` - The lifecycle engine

pub mod error;
pub mod memory;
pub mod service;
pub mod store;
pub mod transition;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_tests;
#[cfg(test)]
mod transition_props;

pub use error::LoanError;
pub use memory::MemoryLoanStore;
pub use service::{DEFAULT_STORE_TIMEOUT, LoanService};
pub use store::LoanStore;
pub use types::{LoanApplication, LoanStatus, LoanSubmission, sort_newest_first};
