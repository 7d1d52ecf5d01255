//! `SeaORM` entity definitions.

pub mod prelude;

pub mod loan_applications;
pub mod sea_orm_active_enums;
pub mod users;
