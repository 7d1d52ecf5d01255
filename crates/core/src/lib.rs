//! Core business logic for Loanflow.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through the store traits defined here, which the
//! `loanflow-db` crate implements with SeaORM and this crate implements in memory.
//!
//! # Modules
//!
//! - `auth` - Roles, actors, and password hashing
//! - `account` - User accounts, registration, and staff management
//! - `loan` - Loan application entity and lifecycle state machine
//! - `store` - Errors shared by every store implementation

pub mod account;
pub mod auth;
pub mod loan;
pub mod store;

pub use auth::{Actor, Role};
pub use store::StoreError;
