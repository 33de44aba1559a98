//! Initial database migration.
//!
//! Creates the enums, ledger tables, constraints and indexes.

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
        // PART 2: USERS
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNT_TYPES_SQL).await?;
        db.execute_unprepared(ACCOUNT_GROUPS_SQL).await?;
        db.execute_unprepared(CHART_OF_ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 4: FISCAL PERIODS
        // ============================================================
        db.execute_unprepared(FISCAL_PERIODS_SQL).await?;

        // ============================================================
        // PART 5: JOURNALS
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRY_LINES_SQL).await?;

        // ============================================================
        // PART 6: PRECOMPUTED BALANCES
        // ============================================================
        db.execute_unprepared(ACCOUNT_BALANCES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE normal_balance AS ENUM ('DEBIT', 'CREDIT');

CREATE TYPE journal_status AS ENUM ('DRAFT', 'POSTED', 'REVERSED');

CREATE TYPE account_category AS ENUM (
    'current_asset',
    'fixed_asset',
    'other_asset',
    'current_liability',
    'long_term_liability',
    'equity',
    'revenue',
    'cost_of_revenue',
    'operating_expense',
    'other_income',
    'other_expense'
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) UNIQUE,
    full_name VARCHAR(255) NOT NULL DEFAULT '',
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNT_TYPES_SQL: &str = r"
CREATE TABLE account_types (
    id UUID PRIMARY KEY,
    code VARCHAR(50) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    normal_balance normal_balance NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNT_GROUPS_SQL: &str = r"
CREATE TABLE account_groups (
    id UUID PRIMARY KEY,
    code VARCHAR(50) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    account_type_id UUID NOT NULL REFERENCES account_types(id) ON DELETE RESTRICT,
    normal_balance normal_balance NOT NULL,
    category account_category NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_account_groups_type ON account_groups(account_type_id);
";

const CHART_OF_ACCOUNTS_SQL: &str = r"
CREATE TABLE chart_of_accounts (
    id UUID PRIMARY KEY,
    code VARCHAR(50) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    parent_id UUID REFERENCES chart_of_accounts(id) ON DELETE RESTRICT,
    level INTEGER NOT NULL DEFAULT 1 CHECK (level >= 1),
    account_group_id UUID NOT NULL REFERENCES account_groups(id) ON DELETE RESTRICT,
    normal_balance normal_balance NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    is_locked BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_not_own_parent CHECK (parent_id IS NULL OR parent_id <> id)
);

CREATE INDEX idx_coa_group ON chart_of_accounts(account_group_id);
CREATE INDEX idx_coa_parent ON chart_of_accounts(parent_id);
";

const FISCAL_PERIODS_SQL: &str = r"
CREATE TABLE fiscal_periods (
    id UUID PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    is_closed BOOLEAN NOT NULL DEFAULT FALSE,
    closed_at TIMESTAMPTZ,
    closed_by UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_period_range CHECK (start_date <= end_date),
    CONSTRAINT excl_period_overlap EXCLUDE USING gist (
        daterange(start_date, end_date, '[]') WITH &&
    )
);

CREATE INDEX idx_fiscal_periods_dates ON fiscal_periods(start_date, end_date);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    number VARCHAR(50) NOT NULL UNIQUE,
    entry_date DATE NOT NULL,
    description TEXT NOT NULL,
    reference VARCHAR(100),
    status journal_status NOT NULL DEFAULT 'DRAFT',
    total_debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    fiscal_period_id UUID NOT NULL REFERENCES fiscal_periods(id) ON DELETE RESTRICT,
    created_by UUID NOT NULL REFERENCES users(id),
    posted_by UUID REFERENCES users(id),
    posted_at TIMESTAMPTZ,
    reverses_entry_id UUID REFERENCES journal_entries(id),
    reversed_by_entry_id UUID REFERENCES journal_entries(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_entry_balanced CHECK (total_debit = total_credit)
);

CREATE INDEX idx_journal_entries_date ON journal_entries(entry_date);
CREATE INDEX idx_journal_entries_period ON journal_entries(fiscal_period_id);
CREATE INDEX idx_journal_entries_status ON journal_entries(status);
";

const JOURNAL_ENTRY_LINES_SQL: &str = r"
CREATE TABLE journal_entry_lines (
    id UUID PRIMARY KEY,
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES chart_of_accounts(id) ON DELETE RESTRICT,
    line_number INTEGER NOT NULL CHECK (line_number > 0),
    description TEXT,
    debit_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_line_number UNIQUE (journal_entry_id, line_number),
    CONSTRAINT chk_one_side CHECK (
        (debit_amount > 0 AND credit_amount = 0)
        OR (credit_amount > 0 AND debit_amount = 0)
    )
);

CREATE INDEX idx_journal_lines_account ON journal_entry_lines(account_id);
";

const ACCOUNT_BALANCES_SQL: &str = r"
CREATE TABLE account_balances (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL REFERENCES chart_of_accounts(id) ON DELETE CASCADE,
    fiscal_period_id UUID NOT NULL REFERENCES fiscal_periods(id) ON DELETE CASCADE,
    opening_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    debit_movement NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit_movement NUMERIC(19, 4) NOT NULL DEFAULT 0,
    closing_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_account_period UNIQUE (account_id, fiscal_period_id)
);

CREATE INDEX idx_account_balances_period ON account_balances(fiscal_period_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS account_balances;
DROP TABLE IF EXISTS journal_entry_lines;
DROP TABLE IF EXISTS journal_entries;
DROP TABLE IF EXISTS fiscal_periods;
DROP TABLE IF EXISTS chart_of_accounts;
DROP TABLE IF EXISTS account_groups;
DROP TABLE IF EXISTS account_types;
DROP TABLE IF EXISTS users;
DROP TYPE IF EXISTS account_category;
DROP TYPE IF EXISTS journal_status;
DROP TYPE IF EXISTS normal_balance;
";
