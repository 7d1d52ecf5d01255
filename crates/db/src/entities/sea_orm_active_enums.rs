//! `SeaORM` mappings for the `PostgreSQL` enum types.

use loanflow_core::Role;
use loanflow_core::loan::LoanStatus as DomainLoanStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    #[sea_orm(string_value = "USER")]
    User,
    #[sea_orm(string_value = "VERIFIER")]
    Verifier,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "loan_status")]
pub enum LoanStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "VERIFIED")]
    Verified,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Verifier => Self::Verifier,
            Role::Admin => Self::Admin,
        }
    }
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::User => Self::User,
            UserRole::Verifier => Self::Verifier,
            UserRole::Admin => Self::Admin,
        }
    }
}

impl From<DomainLoanStatus> for LoanStatus {
    fn from(status: DomainLoanStatus) -> Self {
        match status {
            DomainLoanStatus::Pending => Self::Pending,
            DomainLoanStatus::Verified => Self::Verified,
            DomainLoanStatus::Rejected => Self::Rejected,
            DomainLoanStatus::Approved => Self::Approved,
            DomainLoanStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<LoanStatus> for DomainLoanStatus {
    fn from(status: LoanStatus) -> Self {
        match status {
            LoanStatus::Pending => Self::Pending,
            LoanStatus::Verified => Self::Verified,
            LoanStatus::Rejected => Self::Rejected,
            LoanStatus::Approved => Self::Approved,
            LoanStatus::Cancelled => Self::Cancelled,
        }
    }
}
