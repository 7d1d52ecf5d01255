//! Property-based tests for the transition rule table.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use loanflow_shared::{LoanId, UserId};

use crate::auth::{Actor, Role};
use crate::loan::error::LoanError;
use crate::loan::transition::{apply, authorize, is_valid_transition};
use crate::loan::types::{LoanApplication, LoanStatus};

/// Strategy for generating random LoanStatus values.
fn arb_status() -> impl Strategy<Value = LoanStatus> {
    prop_oneof![
        Just(LoanStatus::Pending),
        Just(LoanStatus::Verified),
        Just(LoanStatus::Rejected),
        Just(LoanStatus::Approved),
        Just(LoanStatus::Cancelled),
    ]
}

/// Strategy for generating random roles.
fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Verifier), Just(Role::Admin)]
}

/// Strategy for generating random user IDs.
fn arb_user_id() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for optional comments, including blank ones.
fn arb_comment() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("   ".to_string())),
        "[a-zA-Z0-9 ]{1,60}".prop_map(Some),
    ]
}

fn loan(status: LoanStatus, borrower: UserId) -> LoanApplication {
    let created = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
    LoanApplication {
        id: LoanId::from_uuid(Uuid::from_u128(1)),
        borrower_id: borrower,
        amount: Decimal::new(500_000, 2),
        term_months: 24,
        purpose: "home".to_string(),
        employment_status: "employed".to_string(),
        employer_name: String::new(),
        employer_address: "1 Main St".to_string(),
        status,
        verifier_id: None,
        verifier_comment: None,
        verified_at: None,
        admin_id: None,
        admin_comment: None,
        approved_at: None,
        rejected_at: None,
        created_at: created,
        updated_at: created,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Terminal states accept nothing, whoever asks.
    #[test]
    fn prop_terminal_states_are_sticky(
        from in arb_status().prop_filter("terminal", LoanStatus::is_terminal),
        to in arb_status(),
        role in arb_role(),
        borrower in arb_user_id(),
    ) {
        let record = loan(from, borrower);
        let result = authorize(&record, to, Actor::new(borrower, role));
        prop_assert!(result.is_err());
        prop_assert!(!matches!(result, Err(LoanError::NotFound(_))));
    }

    /// Nothing ever returns to PENDING.
    #[test]
    fn prop_never_back_to_pending(
        from in arb_status(),
        role in arb_role(),
        actor_id in arb_user_id(),
    ) {
        let record = loan(from, actor_id);
        let result = authorize(&record, LoanStatus::Pending, Actor::new(actor_id, role));
        let is_invalid_transition = matches!(result, Err(LoanError::InvalidTransition { .. }));
        prop_assert!(is_invalid_transition);
    }

    /// An authorized transition always lands on a legal edge and only
    /// touches status, reviewer fields, and timestamps.
    #[test]
    fn prop_authorized_transition_preserves_immutable_fields(
        from in arb_status(),
        to in arb_status(),
        role in arb_role(),
        actor_id in arb_user_id(),
        comment in arb_comment(),
    ) {
        let record = loan(from, actor_id);
        let actor = Actor::new(actor_id, role);
        if let Ok(rule) = authorize(&record, to, actor) {
            prop_assert!(is_valid_transition(from, to));

            let now = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();
            let next = apply(&record, rule, actor, comment.as_deref(), now);

            prop_assert_eq!(next.status, to);
            prop_assert_eq!(next.id, record.id);
            prop_assert_eq!(next.borrower_id, record.borrower_id);
            prop_assert_eq!(next.amount, record.amount);
            prop_assert_eq!(next.term_months, record.term_months);
            prop_assert_eq!(&next.purpose, &record.purpose);
            prop_assert_eq!(next.created_at, record.created_at);
            prop_assert_eq!(next.updated_at, now);
            prop_assert!(!(next.approved_at.is_some() && next.rejected_at.is_some()));
            if let Some(stored) = next.verifier_comment.as_deref().or(next.admin_comment.as_deref()) {
                prop_assert!(!stored.trim().is_empty());
            }
        }
    }

    /// Only the borrower or an admin may cancel a pending loan.
    #[test]
    fn prop_cancel_requires_owner_or_admin(
        role in arb_role(),
        borrower in arb_user_id(),
        actor_id in arb_user_id(),
    ) {
        let record = loan(LoanStatus::Pending, borrower);
        let result = authorize(&record, LoanStatus::Cancelled, Actor::new(actor_id, role));
        let allowed = role == Role::Admin || actor_id == borrower;
        prop_assert_eq!(result.is_ok(), allowed);
    }

    /// A plain user can never move a loan into a reviewed state.
    #[test]
    fn prop_user_cannot_review(
        from in arb_status(),
        to in prop_oneof![
            Just(LoanStatus::Verified),
            Just(LoanStatus::Rejected),
            Just(LoanStatus::Approved),
        ],
        actor_id in arb_user_id(),
    ) {
        let record = loan(from, actor_id);
        let result = authorize(&record, to, Actor::new(actor_id, Role::User));
        let is_forbidden = matches!(result, Err(LoanError::Forbidden(_)));
        prop_assert!(is_forbidden);
    }
}
