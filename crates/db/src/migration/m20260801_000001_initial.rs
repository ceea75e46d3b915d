//! Initial database migration.
//!
//! Creates the enum types, the users and transactions tables, and the
//! indexes backing range queries, cascade deletes, and occurrence
//! idempotency.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TABLES
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 3: INDEXES
        // ============================================================
        db.execute_unprepared(INDEXES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Transaction classification
CREATE TYPE transaction_type AS ENUM (
    'income',
    'expense',
    'transfer',
    'recurring',
    'installment'
);

-- Lifecycle status; 'pending' is the only non-terminal state
CREATE TYPE transaction_status AS ENUM (
    'pending',
    'paid',
    'received',
    'completed',
    'cancelled'
);

-- Recurring template cadence
CREATE TYPE recurrence_pattern AS ENUM ('monthly', 'weekly', 'yearly');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    description TEXT NOT NULL CHECK (length(trim(description)) > 0),
    amount_in_cents BIGINT NOT NULL CHECK (amount_in_cents >= 0),
    date DATE NOT NULL,
    due_date DATE CHECK (due_date IS NULL OR due_date >= date),
    transaction_type transaction_type NOT NULL,
    status transaction_status NOT NULL DEFAULT 'pending',
    date_occurred TIMESTAMPTZ,
    installment_number INTEGER CHECK (installment_number IS NULL OR installment_number >= 1),
    total_installments INTEGER CHECK (
        total_installments IS NULL OR total_installments BETWEEN 2 AND 60
    ),
    parent_transaction_id UUID REFERENCES transactions(id) ON DELETE CASCADE,
    recurrence_pattern recurrence_pattern,
    next_occurrence DATE,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,

    -- Installment fields appear only on installment records
    CONSTRAINT installment_fields_match_type CHECK (
        transaction_type = 'installment'
        OR (installment_number IS NULL AND total_installments IS NULL)
    ),

    -- Recurrence fields appear only on recurring templates
    CONSTRAINT recurrence_fields_match_type CHECK (
        transaction_type = 'recurring'
        OR (recurrence_pattern IS NULL AND next_occurrence IS NULL)
    ),

    -- date_occurred is set exactly while settled
    CONSTRAINT date_occurred_iff_settled CHECK (
        (date_occurred IS NOT NULL) = (status IN ('paid', 'received'))
    ),

    -- Children are numbered within the purchase
    CONSTRAINT installment_number_within_total CHECK (
        installment_number IS NULL
        OR total_installments IS NULL
        OR installment_number <= total_installments
    )
);
";

const INDEXES_SQL: &str = r"
-- Range queries: owner + date window, stable tie-break on created_at
CREATE INDEX idx_transactions_user_date
    ON transactions (user_id, date, created_at);

-- Child lookups and cascade deletes
CREATE INDEX idx_transactions_parent
    ON transactions (parent_transaction_id)
    WHERE parent_transaction_id IS NOT NULL;

-- One materialized occurrence per (template, period)
CREATE UNIQUE INDEX uq_transactions_occurrence_period
    ON transactions (parent_transaction_id, date)
    WHERE parent_transaction_id IS NOT NULL AND transaction_type = 'expense';
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS users;
DROP TYPE IF EXISTS recurrence_pattern;
DROP TYPE IF EXISTS transaction_status;
DROP TYPE IF EXISTS transaction_type;
";
