//! Loan lifecycle service.
//!
//! Every operation takes the acting user explicitly, consults the rule table
//! in [`crate::loan::transition`], and reaches persistence only through a
//! [`LoanStore`] with each call bounded by a timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use loanflow_shared::{LoanId, UserId};

use crate::auth::{Actor, Role};
use crate::loan::error::LoanError;
use crate::loan::store::LoanStore;
use crate::loan::transition::{self, Rule, Stage};
use crate::loan::types::{LoanApplication, LoanStatus, LoanSubmission};
use crate::loan::validation::validate_submission;
use crate::store::{StoreError, store_now};

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Loan lifecycle engine.
#[derive(Clone)]
pub struct LoanService {
    store: Arc<dyn LoanStore>,
    timeout: Duration,
}

impl std::fmt::Debug for LoanService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoanService")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl LoanService {
    /// Creates a service over `store`, bounding each store call by `timeout`.
    #[must_use]
    pub fn new(store: Arc<dyn LoanStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Submits a new application on behalf of `borrower`.
    ///
    /// Validation runs before any store call; on success exactly one insert
    /// is issued and the returned record is PENDING with no reviewer fields.
    ///
    /// # Errors
    ///
    /// Returns `LoanError::Validation` for bad input or `LoanError::Storage`
    /// if the insert fails.
    pub async fn submit(
        &self,
        borrower: UserId,
        input: LoanSubmission,
    ) -> Result<LoanApplication, LoanError> {
        let valid = validate_submission(&input)?;
        let now = store_now();

        let loan = LoanApplication {
            id: LoanId::new(),
            borrower_id: borrower,
            amount: valid.amount,
            term_months: valid.term_months,
            purpose: valid.purpose,
            employment_status: valid.employment_status,
            employer_name: valid.employer_name,
            employer_address: valid.employer_address,
            status: LoanStatus::Pending,
            verifier_id: None,
            verifier_comment: None,
            verified_at: None,
            admin_id: None,
            admin_comment: None,
            approved_at: None,
            rejected_at: None,
            created_at: now,
            updated_at: now,
        };

        self.guarded("insert", self.store.insert(&loan)).await?;
        Ok(loan)
    }

    /// Moves a loan to `requested` on behalf of `actor`.
    ///
    /// The write is a compare-and-swap on the status read here. If another
    /// writer got there first, the record is re-read and the error reports
    /// the status it actually holds.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Forbidden`, `InvalidTransition`, or `Storage`.
    pub async fn transition(
        &self,
        loan_id: LoanId,
        requested: LoanStatus,
        actor: Actor,
        comment: Option<&str>,
    ) -> Result<LoanApplication, LoanError> {
        let current = self.fetch(loan_id).await?;
        let rule = transition::authorize(&current, requested, actor)?;
        self.commit(&current, rule, actor, comment).await
    }

    /// Verifier-stage decision on a PENDING loan: `VERIFIED` or `REJECTED`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for any other decision, `Forbidden` unless
    /// `actor` is a verifier or admin, `InvalidTransition` unless the loan is
    /// PENDING, otherwise as [`Self::transition`].
    pub async fn verify(
        &self,
        loan_id: LoanId,
        decision: LoanStatus,
        actor: Actor,
        comment: Option<&str>,
    ) -> Result<LoanApplication, LoanError> {
        self.review(Stage::Verification, loan_id, decision, actor, comment)
            .await
    }

    /// Admin-stage decision on a VERIFIED loan: `APPROVED` or `REJECTED`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for any other decision, `Forbidden` unless
    /// `actor` is an admin, `InvalidTransition` unless the loan is VERIFIED,
    /// otherwise as [`Self::transition`].
    pub async fn admin_process(
        &self,
        loan_id: LoanId,
        decision: LoanStatus,
        actor: Actor,
        comment: Option<&str>,
    ) -> Result<LoanApplication, LoanError> {
        self.review(Stage::AdminReview, loan_id, decision, actor, comment)
            .await
    }

    /// Cancels a pending loan.
    ///
    /// # Errors
    ///
    /// As [`Self::transition`].
    pub async fn cancel(&self, loan_id: LoanId, actor: Actor) -> Result<LoanApplication, LoanError> {
        self.transition(loan_id, LoanStatus::Cancelled, actor, None)
            .await
    }

    /// Reads one loan. The borrower and staff may read it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Forbidden`, or `Storage`.
    pub async fn get(&self, loan_id: LoanId, actor: Actor) -> Result<LoanApplication, LoanError> {
        let loan = self.fetch(loan_id).await?;
        if loan.is_owned_by(actor.id) || actor.role.is_staff() {
            Ok(loan)
        } else {
            Err(LoanError::Forbidden(
                "You may only view your own loan applications".to_string(),
            ))
        }
    }

    /// Lists `borrower`'s loans, newest first, across all statuses.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless `actor` is the borrower or staff.
    pub async fn list_for_borrower(
        &self,
        actor: Actor,
        borrower: UserId,
    ) -> Result<Vec<LoanApplication>, LoanError> {
        if actor.id != borrower && !actor.role.is_staff() {
            return Err(LoanError::Forbidden(
                "You may only list your own loan applications".to_string(),
            ));
        }
        self.guarded("list_by_borrower", self.store.list_by_borrower(borrower))
            .await
    }

    /// Lists every loan, optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless `role` is VERIFIER or ADMIN.
    pub async fn list_all(
        &self,
        role: Role,
        status: Option<LoanStatus>,
    ) -> Result<Vec<LoanApplication>, LoanError> {
        if !role.is_staff() {
            return Err(LoanError::Forbidden(
                "Only verifiers and admins may list all loan applications".to_string(),
            ));
        }
        self.guarded("list", self.store.list(status)).await
    }

    async fn review(
        &self,
        stage: Stage,
        loan_id: LoanId,
        decision: LoanStatus,
        actor: Actor,
        comment: Option<&str>,
    ) -> Result<LoanApplication, LoanError> {
        stage.check_decision(decision)?;
        let current = self.fetch(loan_id).await?;
        let rule = transition::authorize_stage(&current, decision, actor, stage)?;
        self.commit(&current, rule, actor, comment).await
    }

    /// Writes the record produced by `rule` if `current` is still what the
    /// store holds. A lost swap re-reads and reports the status found.
    async fn commit(
        &self,
        current: &LoanApplication,
        rule: &Rule,
        actor: Actor,
        comment: Option<&str>,
    ) -> Result<LoanApplication, LoanError> {
        let updated = transition::apply(current, rule, actor, comment, store_now());

        let swapped = self
            .guarded(
                "compare_and_swap",
                self.store.compare_and_swap(current.status, &updated),
            )
            .await?;
        if swapped {
            return Ok(updated);
        }

        match self.guarded("find", self.store.find(current.id)).await? {
            Some(latest) => Err(LoanError::InvalidTransition {
                from: latest.status,
                to: rule.to,
            }),
            None => Err(LoanError::NotFound(current.id)),
        }
    }

    async fn fetch(&self, loan_id: LoanId) -> Result<LoanApplication, LoanError> {
        self.guarded("find", self.store.find(loan_id))
            .await?
            .ok_or(LoanError::NotFound(loan_id))
    }

    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> Result<T, LoanError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(LoanError::from),
            Err(_) => Err(StoreError::Timeout { operation }.into()),
        }
    }
}
