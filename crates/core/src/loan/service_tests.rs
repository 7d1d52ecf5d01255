//! Async tests for `LoanService` over the in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal_macros::dec;

use loanflow_shared::{LoanId, UserId};

use crate::auth::{Actor, Role};
use crate::loan::error::LoanError;
use crate::loan::memory::MemoryLoanStore;
use crate::loan::service::LoanService;
use crate::loan::store::LoanStore;
use crate::loan::types::{LoanApplication, LoanStatus, LoanSubmission};
use crate::store::StoreError;

fn service_with(store: Arc<MemoryLoanStore>) -> LoanService {
    LoanService::new(store, Duration::from_secs(5))
}

fn service() -> (LoanService, Arc<MemoryLoanStore>) {
    let store = Arc::new(MemoryLoanStore::new());
    (service_with(Arc::clone(&store)), store)
}

fn submission() -> LoanSubmission {
    LoanSubmission {
        amount: dec!(5000),
        term_months: 12,
        purpose: "car".to_string(),
        employment_status: "employed".to_string(),
        employer_name: Some("Acme".to_string()),
        employer_address: "1 Main St".to_string(),
    }
}

fn user() -> Actor {
    Actor::new(UserId::new(), Role::User)
}

fn verifier() -> Actor {
    Actor::new(UserId::new(), Role::Verifier)
}

fn admin() -> Actor {
    Actor::new(UserId::new(), Role::Admin)
}

#[tokio::test]
async fn test_submit_creates_pending_loan() {
    let (service, store) = service();
    let borrower = user();

    let loan = service.submit(borrower.id, submission()).await.unwrap();

    assert_eq!(loan.status, LoanStatus::Pending);
    assert_eq!(loan.borrower_id, borrower.id);
    assert_eq!(loan.amount, dec!(5000));
    assert_eq!(loan.employer_name, "Acme");
    assert!(loan.verifier_id.is_none());
    assert!(loan.verifier_comment.is_none());
    assert!(loan.verified_at.is_none());
    assert!(loan.admin_id.is_none());
    assert!(loan.approved_at.is_none());
    assert!(loan.rejected_at.is_none());
    assert_eq!(loan.created_at, loan.updated_at);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_invalid_submission_never_reaches_store() {
    let (service, store) = service();
    let mut input = submission();
    input.amount = dec!(0);

    let result = service.submit(UserId::new(), input).await;

    assert!(matches!(
        result,
        Err(LoanError::Validation {
            field: "amount",
            ..
        })
    ));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_terminal_states_are_sticky() {
    let (service, _) = service();
    let borrower = user();
    let admin = admin();

    let approved = service.submit(borrower.id, submission()).await.unwrap();
    service
        .verify(approved.id, LoanStatus::Verified, admin, None)
        .await
        .unwrap();
    service
        .admin_process(approved.id, LoanStatus::Approved, admin, None)
        .await
        .unwrap();

    let cancelled = service.submit(borrower.id, submission()).await.unwrap();
    service.cancel(cancelled.id, borrower).await.unwrap();

    for id in [approved.id, cancelled.id] {
        for target in LoanStatus::ALL {
            let result = service.transition(id, target, admin, None).await;
            assert!(
                matches!(result, Err(LoanError::InvalidTransition { .. })),
                "{target} from terminal state should be rejected, got {result:?}"
            );
        }
    }
}

#[tokio::test]
async fn test_user_cannot_verify() {
    let (service, _) = service();
    let borrower = user();
    let loan = service.submit(borrower.id, submission()).await.unwrap();

    let result = service
        .verify(loan.id, LoanStatus::Verified, borrower, None)
        .await;

    assert!(matches!(result, Err(LoanError::Forbidden(_))));
    let unchanged = service.get(loan.id, borrower).await.unwrap();
    assert_eq!(unchanged.status, LoanStatus::Pending);
}

#[tokio::test]
async fn test_verifier_sets_verifier_fields() {
    let (service, _) = service();
    let verifier = verifier();
    let loan = service.submit(UserId::new(), submission()).await.unwrap();

    let verified = service
        .verify(loan.id, LoanStatus::Verified, verifier, Some("docs ok"))
        .await
        .unwrap();

    assert_eq!(verified.status, LoanStatus::Verified);
    assert_eq!(verified.verifier_id, Some(verifier.id));
    assert_eq!(verified.verifier_comment.as_deref(), Some("docs ok"));
    assert!(verified.verified_at.is_some());
    assert!(verified.updated_at >= loan.updated_at);
}

#[tokio::test]
async fn test_admin_cannot_approve_pending() {
    let (service, _) = service();
    let loan = service.submit(UserId::new(), submission()).await.unwrap();

    let result = service
        .admin_process(loan.id, LoanStatus::Approved, admin(), None)
        .await;

    assert!(matches!(
        result,
        Err(LoanError::InvalidTransition {
            from: LoanStatus::Pending,
            to: LoanStatus::Approved
        })
    ));
}

#[tokio::test]
async fn test_verifier_cannot_use_admin_stage() {
    let (service, _) = service();
    let borrower = user();
    let loan = service.submit(borrower.id, submission()).await.unwrap();

    let on_pending = service
        .admin_process(loan.id, LoanStatus::Rejected, verifier(), Some("nope"))
        .await;
    assert!(matches!(on_pending, Err(LoanError::Forbidden(_))), "{on_pending:?}");

    let unchanged = service.get(loan.id, borrower).await.unwrap();
    assert_eq!(unchanged.status, LoanStatus::Pending);
    assert_eq!(unchanged.verifier_id, None);
    assert_eq!(unchanged.verifier_comment, None);

    service
        .verify(loan.id, LoanStatus::Verified, verifier(), None)
        .await
        .unwrap();
    let on_verified = service
        .admin_process(loan.id, LoanStatus::Approved, verifier(), None)
        .await;
    assert!(matches!(on_verified, Err(LoanError::Forbidden(_))));
}

#[tokio::test]
async fn test_admin_stage_requires_verified_loan() {
    let (service, _) = service();
    let loan = service.submit(UserId::new(), submission()).await.unwrap();

    let result = service
        .admin_process(loan.id, LoanStatus::Rejected, admin(), None)
        .await;
    assert!(matches!(
        result,
        Err(LoanError::InvalidTransition {
            from: LoanStatus::Pending,
            to: LoanStatus::Rejected
        })
    ));

    service
        .verify(loan.id, LoanStatus::Verified, verifier(), None)
        .await
        .unwrap();
    let late_verify = service
        .verify(loan.id, LoanStatus::Rejected, admin(), None)
        .await;
    assert!(matches!(
        late_verify,
        Err(LoanError::InvalidTransition {
            from: LoanStatus::Verified,
            to: LoanStatus::Rejected
        })
    ));
}

#[tokio::test]
async fn test_returned_timestamps_match_stored_precision() {
    let (service, store) = service();
    let borrower = user();
    let loan = service.submit(borrower.id, submission()).await.unwrap();
    assert_eq!(loan.created_at.timestamp_subsec_nanos() % 1_000, 0);

    let verified = service
        .verify(loan.id, LoanStatus::Verified, verifier(), None)
        .await
        .unwrap();
    assert_eq!(verified.updated_at.timestamp_subsec_nanos() % 1_000, 0);
    assert_eq!(store.find(loan.id).await.unwrap(), Some(verified));
}

#[tokio::test]
async fn test_cancel_ownership() {
    let (service, _) = service();
    let borrower = user();
    let loan = service.submit(borrower.id, submission()).await.unwrap();

    let result = service.cancel(loan.id, user()).await;
    assert!(matches!(result, Err(LoanError::Forbidden(_))));

    let cancelled = service.cancel(loan.id, borrower).await.unwrap();
    assert_eq!(cancelled.status, LoanStatus::Cancelled);
    assert!(cancelled.verifier_id.is_none());
    assert!(cancelled.verified_at.is_none());
    assert!(cancelled.admin_id.is_none());
    assert!(cancelled.approved_at.is_none());
    assert!(cancelled.rejected_at.is_none());
}

#[tokio::test]
async fn test_admin_may_cancel_any_pending_loan() {
    let (service, _) = service();
    let loan = service.submit(UserId::new(), submission()).await.unwrap();

    let cancelled = service.cancel(loan.id, admin()).await.unwrap();
    assert_eq!(cancelled.status, LoanStatus::Cancelled);
}

#[tokio::test]
async fn test_full_approval_scenario() {
    let (service, _) = service();
    let u1 = user();
    let v1 = verifier();
    let a1 = admin();

    let loan = service.submit(u1.id, submission()).await.unwrap();

    let verified = service
        .verify(loan.id, LoanStatus::Verified, v1, Some("ok"))
        .await
        .unwrap();
    assert_eq!(verified.verifier_id, Some(v1.id));

    let approved = service
        .admin_process(loan.id, LoanStatus::Approved, a1, Some("approved"))
        .await
        .unwrap();
    assert_eq!(approved.status, LoanStatus::Approved);
    assert_eq!(approved.verifier_id, Some(v1.id));
    assert_eq!(approved.admin_id, Some(a1.id));
    assert!(approved.approved_at.is_some());
    assert!(approved.rejected_at.is_none());

    let late_cancel = service.cancel(loan.id, u1).await;
    assert!(matches!(
        late_cancel,
        Err(LoanError::InvalidTransition {
            from: LoanStatus::Approved,
            to: LoanStatus::Cancelled
        })
    ));
}

#[tokio::test]
async fn test_admin_rejection_keeps_verifier_comment() {
    let (service, _) = service();
    let v1 = verifier();
    let a1 = admin();
    let loan = service.submit(UserId::new(), submission()).await.unwrap();

    service
        .verify(loan.id, LoanStatus::Verified, v1, Some("income confirmed"))
        .await
        .unwrap();
    let rejected = service
        .admin_process(loan.id, LoanStatus::Rejected, a1, Some("over limit"))
        .await
        .unwrap();

    assert_eq!(rejected.status, LoanStatus::Rejected);
    assert_eq!(rejected.verifier_comment.as_deref(), Some("income confirmed"));
    assert_eq!(rejected.admin_comment.as_deref(), Some("over limit"));
    assert!(rejected.rejected_at.is_some());
    assert!(rejected.approved_at.is_none());
}

#[tokio::test]
async fn test_wrong_decision_is_validation_error() {
    let (service, _) = service();
    let loan = service.submit(UserId::new(), submission()).await.unwrap();

    let verify = service
        .verify(loan.id, LoanStatus::Approved, admin(), None)
        .await;
    assert!(matches!(verify, Err(LoanError::Validation { .. })));

    let process = service
        .admin_process(loan.id, LoanStatus::Verified, admin(), None)
        .await;
    assert!(matches!(process, Err(LoanError::Validation { .. })));
}

#[tokio::test]
async fn test_missing_loan_is_not_found() {
    let (service, _) = service();
    let id = LoanId::new();

    let result = service
        .transition(id, LoanStatus::Verified, verifier(), None)
        .await;
    assert!(matches!(result, Err(LoanError::NotFound(missing)) if missing == id));

    let result = service.get(id, admin()).await;
    assert!(matches!(result, Err(LoanError::NotFound(_))));
}

#[tokio::test]
async fn test_get_access() {
    let (service, _) = service();
    let borrower = user();
    let loan = service.submit(borrower.id, submission()).await.unwrap();

    assert!(service.get(loan.id, borrower).await.is_ok());
    assert!(service.get(loan.id, verifier()).await.is_ok());
    assert!(service.get(loan.id, admin()).await.is_ok());
    assert!(matches!(
        service.get(loan.id, user()).await,
        Err(LoanError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_listing() {
    let (service, _) = service();
    let alice = user();
    let bob = user();

    let first = service.submit(alice.id, submission()).await.unwrap();
    let second = service.submit(alice.id, submission()).await.unwrap();
    let other = service.submit(bob.id, submission()).await.unwrap();
    service.cancel(first.id, alice).await.unwrap();

    let mine = service.list_for_borrower(alice, alice.id).await.unwrap();
    let ids: Vec<LoanId> = mine.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    assert!(matches!(
        service.list_for_borrower(bob, alice.id).await,
        Err(LoanError::Forbidden(_))
    ));
    assert_eq!(
        service
            .list_for_borrower(verifier(), alice.id)
            .await
            .unwrap()
            .len(),
        2
    );

    let all = service.list_all(Role::Verifier, None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, other.id);

    let pending = service
        .list_all(Role::Admin, Some(LoanStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|l| l.status == LoanStatus::Pending));

    assert!(matches!(
        service.list_all(Role::User, None).await,
        Err(LoanError::Forbidden(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transitions_have_one_winner() {
    let (service, _) = service();
    let loan = service.submit(UserId::new(), submission()).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        let decision = if i % 2 == 0 {
            LoanStatus::Verified
        } else {
            LoanStatus::Rejected
        };
        handles.push(tokio::spawn(async move {
            service.verify(loan.id, decision, verifier(), None).await
        }));
    }

    let results = futures::future::join_all(handles).await;
    let mut winners = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => winners += 1,
            Err(LoanError::InvalidTransition { from, .. }) => {
                assert_ne!(from, LoanStatus::Pending);
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(winners, 1);
}

/// Store that lets a competing writer win between the read and the swap.
struct RacingStore {
    inner: MemoryLoanStore,
    swaps: AtomicUsize,
    vanish: bool,
}

#[async_trait]
impl LoanStore for RacingStore {
    async fn insert(&self, loan: &LoanApplication) -> Result<(), StoreError> {
        self.inner.insert(loan).await
    }

    async fn find(&self, id: LoanId) -> Result<Option<LoanApplication>, StoreError> {
        self.inner.find(id).await
    }

    async fn compare_and_swap(
        &self,
        expected: LoanStatus,
        updated: &LoanApplication,
    ) -> Result<bool, StoreError> {
        if self.swaps.fetch_add(1, Ordering::SeqCst) == 0 {
            if self.vanish {
                self.inner.remove(updated.id);
            } else if let Some(mut rival) = self.inner.find(updated.id).await? {
                rival.status = LoanStatus::Cancelled;
                self.inner.compare_and_swap(expected, &rival).await?;
            }
        }
        self.inner.compare_and_swap(expected, updated).await
    }

    async fn list_by_borrower(
        &self,
        borrower: UserId,
    ) -> Result<Vec<LoanApplication>, StoreError> {
        self.inner.list_by_borrower(borrower).await
    }

    async fn list(&self, status: Option<LoanStatus>) -> Result<Vec<LoanApplication>, StoreError> {
        self.inner.list(status).await
    }
}

#[tokio::test]
async fn test_lost_race_reports_actual_status() {
    let store = Arc::new(RacingStore {
        inner: MemoryLoanStore::new(),
        swaps: AtomicUsize::new(0),
        vanish: false,
    });
    let service = LoanService::new(store, Duration::from_secs(5));
    let loan = service.submit(UserId::new(), submission()).await.unwrap();

    let result = service
        .verify(loan.id, LoanStatus::Verified, verifier(), None)
        .await;

    assert!(matches!(
        result,
        Err(LoanError::InvalidTransition {
            from: LoanStatus::Cancelled,
            to: LoanStatus::Verified
        })
    ));
}

#[tokio::test]
async fn test_vanished_loan_reports_not_found() {
    let store = Arc::new(RacingStore {
        inner: MemoryLoanStore::new(),
        swaps: AtomicUsize::new(0),
        vanish: true,
    });
    let service = LoanService::new(store, Duration::from_secs(5));
    let loan = service.submit(UserId::new(), submission()).await.unwrap();

    let result = service
        .verify(loan.id, LoanStatus::Verified, verifier(), None)
        .await;

    assert!(matches!(result, Err(LoanError::NotFound(_))));
}

/// Store whose every call outlives the service timeout.
struct SlowStore;

#[async_trait]
impl LoanStore for SlowStore {
    async fn insert(&self, _loan: &LoanApplication) -> Result<(), StoreError> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(())
    }

    async fn find(&self, _id: LoanId) -> Result<Option<LoanApplication>, StoreError> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(None)
    }

    async fn compare_and_swap(
        &self,
        _expected: LoanStatus,
        _updated: &LoanApplication,
    ) -> Result<bool, StoreError> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(true)
    }

    async fn list_by_borrower(
        &self,
        _borrower: UserId,
    ) -> Result<Vec<LoanApplication>, StoreError> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(Vec::new())
    }

    async fn list(&self, _status: Option<LoanStatus>) -> Result<Vec<LoanApplication>, StoreError> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_store_timeout_is_storage_error() {
    let service = LoanService::new(Arc::new(SlowStore), Duration::from_millis(20));

    let result = service.submit(UserId::new(), submission()).await;
    assert!(matches!(
        result,
        Err(LoanError::Storage(StoreError::Timeout {
            operation: "insert"
        }))
    ));

    let result = service.get(LoanId::new(), admin()).await;
    assert!(matches!(
        result,
        Err(LoanError::Storage(StoreError::Timeout { operation: "find" }))
    ));
}
