//! In-memory loan store backed by `DashMap`.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use loanflow_shared::{LoanId, UserId};

use crate::loan::store::LoanStore;
use crate::loan::types::{LoanApplication, LoanStatus, sort_newest_first};
use crate::store::StoreError;

/// Loan store kept in process memory.
///
/// A swap locks only the shard holding that ID, so transitions on different
/// loans never contend.
#[derive(Debug, Default)]
pub struct MemoryLoanStore {
    loans: DashMap<LoanId, LoanApplication>,
}

impl MemoryLoanStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored applications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.loans.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    /// Removes an application. Used to simulate concurrent deletion.
    pub fn remove(&self, id: LoanId) -> Option<LoanApplication> {
        self.loans.remove(&id).map(|(_, loan)| loan)
    }

    fn collect<F>(&self, keep: F) -> Vec<LoanApplication>
    where
        F: Fn(&LoanApplication) -> bool,
    {
        let mut loans: Vec<LoanApplication> = self
            .loans
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        sort_newest_first(&mut loans);
        loans
    }
}

#[async_trait]
impl LoanStore for MemoryLoanStore {
    async fn insert(&self, loan: &LoanApplication) -> Result<(), StoreError> {
        match self.loans.entry(loan.id) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "loan application {} already exists",
                loan.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(loan.clone());
                Ok(())
            }
        }
    }

    async fn find(&self, id: LoanId) -> Result<Option<LoanApplication>, StoreError> {
        Ok(self.loans.get(&id).map(|entry| entry.value().clone()))
    }

    async fn compare_and_swap(
        &self,
        expected: LoanStatus,
        updated: &LoanApplication,
    ) -> Result<bool, StoreError> {
        let Some(mut current) = self.loans.get_mut(&updated.id) else {
            return Ok(false);
        };
        if current.status != expected {
            return Ok(false);
        }
        *current = updated.clone();
        Ok(true)
    }

    async fn list_by_borrower(
        &self,
        borrower: UserId,
    ) -> Result<Vec<LoanApplication>, StoreError> {
        Ok(self.collect(|loan| loan.borrower_id == borrower))
    }

    async fn list(&self, status: Option<LoanStatus>) -> Result<Vec<LoanApplication>, StoreError> {
        Ok(self.collect(|loan| status.is_none_or(|s| loan.status == s)))
    }
}
