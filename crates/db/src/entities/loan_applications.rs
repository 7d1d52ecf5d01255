//! `SeaORM` Entity for loan_applications table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LoanStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loan_applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub borrower_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub amount: Decimal,
    pub term_months: i32,
    pub purpose: String,
    pub employment_status: String,
    pub employer_name: String,
    pub employer_address: String,
    pub status: LoanStatus,
    pub verifier_id: Option<Uuid>,
    pub verifier_comment: Option<String>,
    pub verified_at: Option<DateTimeWithTimeZone>,
    pub admin_id: Option<Uuid>,
    pub admin_comment: Option<String>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub rejected_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BorrowerId",
        to = "super::users::Column::Id"
    )]
    Borrower,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Borrower.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
