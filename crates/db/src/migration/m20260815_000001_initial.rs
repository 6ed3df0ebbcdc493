//! Initial database migration.
//!
//! Creates the enums, tables, and indexes for the billing schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(SUBSCRIBERS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(USAGE_RECORDS_SQL).await?;
        db.execute_unprepared(BILLS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

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
CREATE TYPE payment_status AS ENUM (
    'successful',
    'failed'
);
";

const SUBSCRIBERS_SQL: &str = r"
CREATE TABLE subscribers (
    subscriber_no   TEXT PRIMARY KEY,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id              UUID PRIMARY KEY,
    email           TEXT NOT NULL UNIQUE,
    password_hash   TEXT NOT NULL,
    role            TEXT NOT NULL DEFAULT 'staff',
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const USAGE_RECORDS_SQL: &str = r"
CREATE TABLE usage_records (
    id              UUID PRIMARY KEY,
    subscriber_no   TEXT NOT NULL REFERENCES subscribers(subscriber_no),
    month           SMALLINT NOT NULL CHECK (month BETWEEN 1 AND 12),
    year            INTEGER NOT NULL,
    phone_minutes   BIGINT NOT NULL DEFAULT 0 CHECK (phone_minutes >= 0),
    internet_mb     NUMERIC(14, 3) NOT NULL DEFAULT 0 CHECK (internet_mb >= 0),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_usage_records_period
    ON usage_records (subscriber_no, year, month);
";

const BILLS_SQL: &str = r"
CREATE TABLE bills (
    id              UUID PRIMARY KEY,
    subscriber_no   TEXT NOT NULL REFERENCES subscribers(subscriber_no),
    month           SMALLINT NOT NULL CHECK (month BETWEEN 1 AND 12),
    year            INTEGER NOT NULL,
    phone_amount    NUMERIC(12, 2) NOT NULL DEFAULT 0 CHECK (phone_amount >= 0),
    internet_amount NUMERIC(12, 2) NOT NULL DEFAULT 0 CHECK (internet_amount >= 0),
    total_amount    NUMERIC(12, 2) NOT NULL DEFAULT 0 CHECK (total_amount >= 0),
    paid_amount     NUMERIC(12, 2) NOT NULL DEFAULT 0 CHECK (paid_amount >= 0),
    is_paid         BOOLEAN NOT NULL DEFAULT FALSE,
    version         BIGINT NOT NULL DEFAULT 0,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- At most one bill per subscriber per billing period
    CONSTRAINT uq_bills_period UNIQUE (subscriber_no, month, year)
);

CREATE INDEX idx_bills_unpaid
    ON bills (subscriber_no, year, month)
    WHERE is_paid = FALSE;
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id              UUID PRIMARY KEY,
    subscriber_no   TEXT NOT NULL REFERENCES subscribers(subscriber_no),
    month           SMALLINT NOT NULL CHECK (month BETWEEN 1 AND 12),
    year            INTEGER NOT NULL,
    amount          NUMERIC(12, 2) NOT NULL CHECK (amount > 0),
    status          payment_status NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_payments_period
    ON payments (subscriber_no, year, month);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS bills;
DROP TABLE IF EXISTS usage_records;
DROP TABLE IF EXISTS users;
DROP TABLE IF EXISTS subscribers;
DROP TYPE IF EXISTS payment_status;
";
