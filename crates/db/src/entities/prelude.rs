//! Entity re-exports.

pub use super::loan_applications::Entity as LoanApplications;
pub use super::users::Entity as Users;
