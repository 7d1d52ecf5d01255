//! Loan application repository.
//!
//! Implements [`LoanStore`] over `PostgreSQL`. Transitions are a single
//! `UPDATE ... WHERE id = $1 AND status = $2`; zero affected rows means the
//! swap lost.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, warn};

use loanflow_core::StoreError;
use loanflow_core::loan::{LoanApplication, LoanStatus, LoanStore};
use loanflow_shared::{LoanId, UserId};

use crate::entities::{loan_applications, sea_orm_active_enums};
use crate::repositories::store_error;

/// Loan application repository.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    db: DatabaseConnection,
}

impl LoanRepository {
    /// Creates a new loan repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Deletes an application. Only used by tests and maintenance tooling.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: LoanId) -> Result<bool, StoreError> {
        let result = loan_applications::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected == 1)
    }
}

#[async_trait]
impl LoanStore for LoanRepository {
    async fn insert(&self, loan: &LoanApplication) -> Result<(), StoreError> {
        to_active_model(loan)
            .insert(&self.db)
            .await
            .map_err(store_error)?;
        debug!(loan_id = %loan.id, borrower_id = %loan.borrower_id, "Inserted loan application");
        Ok(())
    }

    async fn find(&self, id: LoanId) -> Result<Option<LoanApplication>, StoreError> {
        loan_applications::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(to_domain)
            .transpose()
    }

    async fn compare_and_swap(
        &self,
        expected: LoanStatus,
        updated: &LoanApplication,
    ) -> Result<bool, StoreError> {
        let changes = loan_applications::ActiveModel {
            id: NotSet,
            borrower_id: NotSet,
            amount: NotSet,
            term_months: NotSet,
            purpose: NotSet,
            employment_status: NotSet,
            employer_name: NotSet,
            employer_address: NotSet,
            status: Set(updated.status.into()),
            verifier_id: Set(updated.verifier_id.map(UserId::into_inner)),
            verifier_comment: Set(updated.verifier_comment.clone()),
            verified_at: Set(updated.verified_at.map(Into::into)),
            admin_id: Set(updated.admin_id.map(UserId::into_inner)),
            admin_comment: Set(updated.admin_comment.clone()),
            approved_at: Set(updated.approved_at.map(Into::into)),
            rejected_at: Set(updated.rejected_at.map(Into::into)),
            created_at: NotSet,
            updated_at: Set(updated.updated_at.into()),
        };

        let expected_db: sea_orm_active_enums::LoanStatus = expected.into();
        let result = loan_applications::Entity::update_many()
            .set(changes)
            .filter(loan_applications::Column::Id.eq(updated.id.into_inner()))
            .filter(loan_applications::Column::Status.eq(expected_db))
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        let swapped = result.rows_affected == 1;
        if swapped {
            debug!(
                loan_id = %updated.id,
                from = %expected,
                to = %updated.status,
                "Loan status updated"
            );
        } else {
            warn!(loan_id = %updated.id, expected = %expected, "Loan status swap lost");
        }
        Ok(swapped)
    }

    async fn list_by_borrower(
        &self,
        borrower: UserId,
    ) -> Result<Vec<LoanApplication>, StoreError> {
        loan_applications::Entity::find()
            .filter(loan_applications::Column::BorrowerId.eq(borrower.into_inner()))
            .order_by_desc(loan_applications::Column::CreatedAt)
            .order_by_desc(loan_applications::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn list(&self, status: Option<LoanStatus>) -> Result<Vec<LoanApplication>, StoreError> {
        let mut query = loan_applications::Entity::find();
        if let Some(status) = status {
            let status: sea_orm_active_enums::LoanStatus = status.into();
            query = query.filter(loan_applications::Column::Status.eq(status));
        }

        query
            .order_by_desc(loan_applications::Column::CreatedAt)
            .order_by_desc(loan_applications::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }
}

fn to_active_model(loan: &LoanApplication) -> loan_applications::ActiveModel {
    loan_applications::ActiveModel {
        id: Set(loan.id.into_inner()),
        borrower_id: Set(loan.borrower_id.into_inner()),
        amount: Set(loan.amount),
        // Validation caps the term at 600 months.
        term_months: Set(i32::try_from(loan.term_months).unwrap_or(i32::MAX)),
        purpose: Set(loan.purpose.clone()),
        employment_status: Set(loan.employment_status.clone()),
        employer_name: Set(loan.employer_name.clone()),
        employer_address: Set(loan.employer_address.clone()),
        status: Set(loan.status.into()),
        verifier_id: Set(loan.verifier_id.map(UserId::into_inner)),
        verifier_comment: Set(loan.verifier_comment.clone()),
        verified_at: Set(loan.verified_at.map(Into::into)),
        admin_id: Set(loan.admin_id.map(UserId::into_inner)),
        admin_comment: Set(loan.admin_comment.clone()),
        approved_at: Set(loan.approved_at.map(Into::into)),
        rejected_at: Set(loan.rejected_at.map(Into::into)),
        created_at: Set(loan.created_at.into()),
        updated_at: Set(loan.updated_at.into()),
    }
}

fn to_domain(model: loan_applications::Model) -> Result<LoanApplication, StoreError> {
    let term_months = u32::try_from(model.term_months).map_err(|_| {
        StoreError::Unavailable(format!(
            "loan application {} has invalid term_months {}",
            model.id, model.term_months
        ))
    })?;

    Ok(LoanApplication {
        id: LoanId::from_uuid(model.id),
        borrower_id: UserId::from_uuid(model.borrower_id),
        amount: model.amount.normalize(),
        term_months,
        purpose: model.purpose,
        employment_status: model.employment_status,
        employer_name: model.employer_name,
        employer_address: model.employer_address,
        status: model.status.into(),
        verifier_id: model.verifier_id.map(UserId::from_uuid),
        verifier_comment: model.verifier_comment,
        verified_at: model.verified_at.map(|t| t.with_timezone(&Utc)),
        admin_id: model.admin_id.map(UserId::from_uuid),
        admin_comment: model.admin_comment,
        approved_at: model.approved_at.map(|t| t.with_timezone(&Utc)),
        rejected_at: model.rejected_at.map(|t| t.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
