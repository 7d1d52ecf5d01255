//! Status transition rules.
//!
//! One table defines every legal edge of the loan lifecycle, who may take it,
//! and which audit fields it stamps. Both the in-memory and SQL stores apply
//! the record this module produces; neither encodes rules of its own.

use chrono::{DateTime, Utc};

use crate::auth::{Actor, Role};
use crate::loan::error::LoanError;
use crate::loan::types::{LoanApplication, LoanStatus};

/// Who may take an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Any actor holding one of these roles.
    Roles(&'static [Role]),
    /// The borrower who owns the loan, or an admin.
    OwnerOrAdmin,
}

/// Audit fields stamped when an edge is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    /// verifierId, verifierComment, verifiedAt.
    VerifierDecision,
    /// adminId, adminComment, approvedAt.
    AdminApproval,
    /// adminId, adminComment, rejectedAt.
    AdminRejection,
    /// Status and updatedAt only.
    StatusOnly,
}

/// One legal edge of the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Required current status.
    pub from: LoanStatus,
    /// Resulting status.
    pub to: LoanStatus,
    /// Who may take the edge.
    pub gate: Gate,
    /// Fields stamped on the record.
    pub stamp: Stamp,
}

const REVIEWERS: &[Role] = &[Role::Verifier, Role::Admin];
const ADMINS: &[Role] = &[Role::Admin];

/// Every legal transition.
pub const RULES: [Rule; 5] = [
    Rule {
        from: LoanStatus::Pending,
        to: LoanStatus::Verified,
        gate: Gate::Roles(REVIEWERS),
        stamp: Stamp::VerifierDecision,
    },
    Rule {
        from: LoanStatus::Pending,
        to: LoanStatus::Rejected,
        gate: Gate::Roles(REVIEWERS),
        stamp: Stamp::VerifierDecision,
    },
    Rule {
        from: LoanStatus::Pending,
        to: LoanStatus::Cancelled,
        gate: Gate::OwnerOrAdmin,
        stamp: Stamp::StatusOnly,
    },
    Rule {
        from: LoanStatus::Verified,
        to: LoanStatus::Approved,
        gate: Gate::Roles(ADMINS),
        stamp: Stamp::AdminApproval,
    },
    Rule {
        from: LoanStatus::Verified,
        to: LoanStatus::Rejected,
        gate: Gate::Roles(ADMINS),
        stamp: Stamp::AdminRejection,
    },
];

impl Gate {
    /// Role-level check, ignoring ownership.
    fn admits_role(&self, role: Role) -> bool {
        match self {
            Self::Roles(roles) => roles.contains(&role),
            Self::OwnerOrAdmin => true,
        }
    }
}

/// Returns the rule for `(from, to)`, if that edge exists.
#[must_use]
pub fn rule_for(from: LoanStatus, to: LoanStatus) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.from == from && rule.to == to)
}

/// Returns true if `from → to` is a legal edge for some actor.
#[must_use]
pub fn is_valid_transition(from: LoanStatus, to: LoanStatus) -> bool {
    rule_for(from, to).is_some()
}

/// Returns true if `role` may request `target` from at least one status.
///
/// Targets with no incoming edge (PENDING) are admitted here so the caller
/// reports them as invalid transitions rather than permission failures.
#[must_use]
pub fn role_may_request(role: Role, target: LoanStatus) -> bool {
    let mut edges = RULES.iter().filter(|rule| rule.to == target).peekable();
    if edges.peek().is_none() {
        return true;
    }
    edges.any(|rule| rule.gate.admits_role(role))
}

/// Checks that `actor` may move `loan` to `requested`.
///
/// Order: role may request the target at all, the edge exists, the edge's
/// own role set, then ownership for cancellation.
///
/// # Errors
///
/// Returns `LoanError::Forbidden` or `LoanError::InvalidTransition`.
pub fn authorize(
    loan: &LoanApplication,
    requested: LoanStatus,
    actor: Actor,
) -> Result<&'static Rule, LoanError> {
    if !role_may_request(actor.role, requested) {
        return Err(LoanError::Forbidden(format!(
            "Role {} may not set status {requested}",
            actor.role
        )));
    }

    let rule = rule_for(loan.status, requested).ok_or(LoanError::InvalidTransition {
        from: loan.status,
        to: requested,
    })?;

    match rule.gate {
        Gate::Roles(_) if !rule.gate.admits_role(actor.role) => Err(LoanError::Forbidden(
            format!(
                "Role {} may not move a loan from {} to {}",
                actor.role, rule.from, rule.to
            ),
        )),
        Gate::OwnerOrAdmin if actor.role != Role::Admin && !loan.is_owned_by(actor.id) => Err(
            LoanError::Forbidden("Only the borrower or an admin may cancel this loan".to_string()),
        ),
        _ => Ok(rule),
    }
}

/// A review endpoint's slice of the lifecycle.
///
/// Pins the status a decision must start from, so a decision sent to one
/// stage never takes an edge that belongs to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// PENDING → VERIFIED or REJECTED, by a verifier or admin.
    Verification,
    /// VERIFIED → APPROVED or REJECTED, by an admin.
    AdminReview,
}

impl Stage {
    /// Status a loan must hold to be decided at this stage.
    #[must_use]
    pub const fn source(self) -> LoanStatus {
        match self {
            Self::Verification => LoanStatus::Pending,
            Self::AdminReview => LoanStatus::Verified,
        }
    }

    /// Decisions accepted at this stage.
    #[must_use]
    pub const fn decisions(self) -> [LoanStatus; 2] {
        match self {
            Self::Verification => [LoanStatus::Verified, LoanStatus::Rejected],
            Self::AdminReview => [LoanStatus::Approved, LoanStatus::Rejected],
        }
    }

    const fn reviewers(self) -> &'static [Role] {
        match self {
            Self::Verification => REVIEWERS,
            Self::AdminReview => ADMINS,
        }
    }

    /// Checks `decision` is one this stage accepts.
    ///
    /// # Errors
    ///
    /// Returns `LoanError::Validation` on field `status`.
    pub fn check_decision(self, decision: LoanStatus) -> Result<(), LoanError> {
        if self.decisions().contains(&decision) {
            return Ok(());
        }
        let [first, second] = self.decisions();
        Err(LoanError::validation(
            "status",
            format!("status must be {first} or {second}"),
        ))
    }
}

/// Checks that `actor` may decide `loan` at `stage`.
///
/// Order: the actor reviews at this stage, the loan sits at the stage's
/// source status, then the rules of [`authorize`].
///
/// # Errors
///
/// Returns `LoanError::Forbidden` or `LoanError::InvalidTransition`.
pub fn authorize_stage(
    loan: &LoanApplication,
    decision: LoanStatus,
    actor: Actor,
    stage: Stage,
) -> Result<&'static Rule, LoanError> {
    if !stage.reviewers().contains(&actor.role) {
        return Err(LoanError::Forbidden(format!(
            "Role {} may not review loans at this stage",
            actor.role
        )));
    }
    if loan.status != stage.source() {
        return Err(LoanError::InvalidTransition {
            from: loan.status,
            to: decision,
        });
    }
    authorize(loan, decision, actor)
}

/// Produces the record after taking `rule`.
///
/// Blank comments are stored as `None`.
#[must_use]
pub fn apply(
    loan: &LoanApplication,
    rule: &Rule,
    actor: Actor,
    comment: Option<&str>,
    now: DateTime<Utc>,
) -> LoanApplication {
    let comment = comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(ToString::to_string);

    let mut next = loan.clone();
    next.status = rule.to;
    next.updated_at = now;

    match rule.stamp {
        Stamp::VerifierDecision => {
            next.verifier_id = Some(actor.id);
            next.verifier_comment = comment;
            next.verified_at = Some(now);
        }
        Stamp::AdminApproval => {
            next.admin_id = Some(actor.id);
            next.admin_comment = comment;
            next.approved_at = Some(now);
        }
        Stamp::AdminRejection => {
            next.admin_id = Some(actor.id);
            next.admin_comment = comment;
            next.rejected_at = Some(now);
        }
        Stamp::StatusOnly => {}
    }

    next
}
