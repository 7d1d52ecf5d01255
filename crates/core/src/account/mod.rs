//! User accounts.
//!
//! Registration always yields a USER. Staff accounts are created by an admin
//! or bootstrapped once by the seeder.

pub mod error;
pub mod memory;
pub mod service;
pub mod store;
pub mod types;

pub use error::AccountError;
pub use memory::MemoryUserStore;
pub use service::AccountService;
pub use store::UserStore;
pub use types::{NewAccount, UserAccount, normalize_email};
