//! Initial database migration.
//!
//! Creates the role and status enums, the users table, and the single
//! canonical loan_applications table with its lifecycle constraints.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(LOAN_APPLICATIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('USER', 'VERIFIER', 'ADMIN');

CREATE TYPE loan_status AS ENUM (
    'PENDING',
    'VERIFIED',
    'REJECTED',
    'APPROVED',
    'CANCELLED'
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    username VARCHAR(50) NOT NULL UNIQUE,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    role user_role NOT NULL DEFAULT 'USER',
    full_name VARCHAR(255),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_by UUID REFERENCES users(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_email_lowercase CHECK (email = lower(email))
);

CREATE INDEX idx_users_role ON users(role, created_at DESC);
";

const LOAN_APPLICATIONS_SQL: &str = r"
CREATE TABLE loan_applications (
    id UUID PRIMARY KEY,
    borrower_id UUID NOT NULL REFERENCES users(id),
    amount NUMERIC(19, 2) NOT NULL,
    term_months INTEGER NOT NULL,
    purpose TEXT NOT NULL,
    employment_status TEXT NOT NULL,
    employer_name TEXT NOT NULL DEFAULT '',
    employer_address TEXT NOT NULL,
    status loan_status NOT NULL DEFAULT 'PENDING',

    verifier_id UUID REFERENCES users(id),
    verifier_comment TEXT,
    verified_at TIMESTAMPTZ,

    admin_id UUID REFERENCES users(id),
    admin_comment TEXT,
    approved_at TIMESTAMPTZ,
    rejected_at TIMESTAMPTZ,

    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_term_positive CHECK (term_months > 0 AND term_months <= 600),
    CONSTRAINT chk_single_admin_decision CHECK (approved_at IS NULL OR rejected_at IS NULL),
    CONSTRAINT chk_approved_has_timestamp CHECK (status <> 'APPROVED' OR approved_at IS NOT NULL)
);

-- Borrower history, newest first
CREATE INDEX idx_loans_borrower ON loan_applications(borrower_id, created_at DESC, id DESC);

-- Review queues by status
CREATE INDEX idx_loans_status ON loan_applications(status, created_at DESC, id DESC);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS loan_applications CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TYPE IF EXISTS loan_status;
DROP TYPE IF EXISTS user_role;
";
