//! Persistence contract for loan applications.

use async_trait::async_trait;

use loanflow_shared::{LoanId, UserId};

use crate::loan::types::{LoanApplication, LoanStatus};
use crate::store::StoreError;

/// Storage for loan applications.
///
/// Implementations hold no lifecycle rules. `compare_and_swap` is the only
/// mutation after insert and must be atomic per record.
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Inserts a new application.
    async fn insert(&self, loan: &LoanApplication) -> Result<(), StoreError>;

    /// Finds an application by ID.
    async fn find(&self, id: LoanId) -> Result<Option<LoanApplication>, StoreError>;

    /// Replaces the record with `updated` only if its stored status is still
    /// `expected`. Returns false when the swap loses (status changed or the
    /// record is gone).
    async fn compare_and_swap(
        &self,
        expected: LoanStatus,
        updated: &LoanApplication,
    ) -> Result<bool, StoreError>;

    /// Lists a borrower's applications, newest first.
    async fn list_by_borrower(&self, borrower: UserId)
    -> Result<Vec<LoanApplication>, StoreError>;

    /// Lists all applications, optionally filtered by status, newest first.
    async fn list(&self, status: Option<LoanStatus>) -> Result<Vec<LoanApplication>, StoreError>;
}
