//! Loan application domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use loanflow_shared::{LoanId, UserId};

/// Loan application status.
///
/// The valid transitions are:
/// - Pending → Verified (verifier stage)
/// - Pending → Rejected (verifier stage)
/// - Pending → Cancelled (borrower or admin)
/// - Verified → Approved (admin stage)
/// - Verified → Rejected (admin stage)
///
/// Approved, Rejected and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    /// Submitted and awaiting verification.
    Pending,
    /// Verified and awaiting an admin decision.
    Verified,
    /// Rejected at either review stage.
    Rejected,
    /// Approved by an admin.
    Approved,
    /// Withdrawn before any review decision.
    Cancelled,
}

impl LoanStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Verified,
        Self::Rejected,
        Self::Approved,
        Self::Cancelled,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
            Self::Approved => "APPROVED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "VERIFIED" => Some(Self::Verified),
            "REJECTED" => Some(Self::Rejected),
            "APPROVED" => Some(Self::Approved),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further transition is accepted.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Approved | Self::Cancelled)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single canonical loan application record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    /// Application ID.
    pub id: LoanId,
    /// Requesting borrower.
    pub borrower_id: UserId,
    /// Requested principal.
    pub amount: Decimal,
    /// Repayment term in months.
    pub term_months: u32,
    /// Purpose of the loan.
    pub purpose: String,
    /// Employment status at submission.
    pub employment_status: String,
    /// Employer name; may be empty.
    pub employer_name: String,
    /// Employer address.
    pub employer_address: String,
    /// Current lifecycle status.
    pub status: LoanStatus,
    /// Verifier who decided the verifier stage.
    pub verifier_id: Option<UserId>,
    /// Verifier's comment.
    pub verifier_comment: Option<String>,
    /// When the verifier stage was decided.
    pub verified_at: Option<DateTime<Utc>>,
    /// Admin who decided the admin stage.
    pub admin_id: Option<UserId>,
    /// Admin's comment.
    pub admin_comment: Option<String>,
    /// When an admin approved the application.
    pub approved_at: Option<DateTime<Utc>>,
    /// When an admin rejected the application.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl LoanApplication {
    /// Returns true if `user` submitted this application.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.borrower_id == user
    }
}

/// Raw submission fields as received from the borrower.
///
/// `term_months` is signed so that negative input reaches validation instead
/// of failing to deserialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanSubmission {
    /// Requested principal.
    pub amount: Decimal,
    /// Requested term in months.
    pub term_months: i64,
    /// Purpose of the loan.
    pub purpose: String,
    /// Employment status.
    pub employment_status: String,
    /// Employer name, optional.
    pub employer_name: Option<String>,
    /// Employer address.
    pub employer_address: String,
}

/// Orders applications newest first, breaking ties by ID.
pub fn sort_newest_first(loans: &mut [LoanApplication]) {
    loans.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
