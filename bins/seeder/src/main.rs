//! Bootstraps the first ADMIN account.
//!
//! Reads `DATABASE_URL`, `ADMIN_EMAIL`, `ADMIN_PASSWORD`, and optionally
//! `ADMIN_USERNAME` (default `admin`). Running it twice is harmless: an
//! existing account with the same email is left untouched.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use loanflow_core::account::{AccountService, NewAccount};
use loanflow_db::UserRepository;

fn required_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set in environment"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = required_env("DATABASE_URL")?;
    let email = required_env("ADMIN_EMAIL")?;
    let password = required_env("ADMIN_PASSWORD")?;
    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());

    println!("Connecting to database...");
    let db = loanflow_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let accounts = AccountService::new(Arc::new(UserRepository::new(db)), Duration::from_secs(10));

    println!("Seeding admin account...");
    let created = accounts
        .bootstrap_admin(NewAccount {
            username,
            email: email.clone(),
            password,
            full_name: Some("Administrator".to_string()),
        })
        .await
        .context("Failed to create admin account")?;

    match created {
        Some(admin) => println!("  Created admin {} ({})", admin.username, admin.id),
        None => println!("  Account {email} already exists, skipping..."),
    }

    println!("Seeding complete!");
    Ok(())
}
