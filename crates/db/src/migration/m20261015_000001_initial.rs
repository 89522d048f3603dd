//! Initial database migration.
//!
//! Creates the enum types, the ledger and inventory tables, and the
//! per-organization document counters.

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
        // PART 2: LEDGER
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(JOURNALS_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 3: INVENTORY
        // ============================================================
        db.execute_unprepared(ITEMS_SQL).await?;
        db.execute_unprepared(WAREHOUSES_SQL).await?;
        db.execute_unprepared(INVENTORY_LAYERS_SQL).await?;
        db.execute_unprepared(INVENTORY_MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 4: TRANSFERS
        // ============================================================
        db.execute_unprepared(TRANSFERS_SQL).await?;
        db.execute_unprepared(TRANSFER_ITEMS_SQL).await?;

        // ============================================================
        // PART 5: DOCUMENT NUMBERING
        // ============================================================
        db.execute_unprepared(DOCUMENT_SEQUENCES_SQL).await?;

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
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'income',
    'expense'
);

CREATE TYPE account_subtype AS ENUM (
    'bank',
    'cash',
    'receivable',
    'payable',
    'stock',
    'cost_of_goods_sold',
    'sales',
    'operating_expense',
    'opening_balance_equity',
    'other'
);

CREATE TYPE journal_source AS ENUM (
    'manual',
    'opening_balance',
    'inventory_transfer',
    'transfer_reversal'
);

CREATE TYPE movement_type AS ENUM (
    'purchase',
    'sale',
    'transfer_in',
    'transfer_out',
    'adjustment'
);

CREATE TYPE negative_inventory_policy AS ENUM (
    'disallow',
    'last_known_cost',
    'zero_cost'
);

CREATE TYPE transfer_status AS ENUM (
    'draft',
    'in_transit',
    'completed',
    'cancelled'
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    account_subtype account_subtype,
    is_active BOOLEAN NOT NULL DEFAULT true,
    is_system BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_accounts_org_code UNIQUE (organization_id, code)
);
";

const JOURNALS_SQL: &str = r"
CREATE TABLE journals (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    journal_number VARCHAR(20) NOT NULL,
    journal_date DATE NOT NULL,
    reference TEXT,
    source journal_source NOT NULL,
    total_debit NUMERIC(19, 4) NOT NULL,
    total_credit NUMERIC(19, 4) NOT NULL,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_journals_org_number UNIQUE (organization_id, journal_number),
    CONSTRAINT chk_journals_totals_non_negative CHECK (total_debit >= 0 AND total_credit >= 0)
);

CREATE INDEX idx_journals_org_date ON journals(organization_id, journal_date);
CREATE INDEX idx_journals_org_source ON journals(organization_id, source);
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY,
    journal_id UUID NOT NULL REFERENCES journals(id) ON DELETE CASCADE,
    organization_id UUID NOT NULL,
    line_number INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    memo TEXT,

    CONSTRAINT uq_journal_lines_number UNIQUE (journal_id, line_number),
    CONSTRAINT chk_journal_lines_non_negative CHECK (debit >= 0 AND credit >= 0),
    CONSTRAINT chk_journal_lines_one_side CHECK (debit = 0 OR credit = 0)
);

CREATE INDEX idx_journal_lines_account ON journal_lines(organization_id, account_id);
";

const ITEMS_SQL: &str = r"
CREATE TABLE items (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    sku VARCHAR(64) NOT NULL,
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_items_org_sku UNIQUE (organization_id, sku)
);
";

const WAREHOUSES_SQL: &str = r"
CREATE TABLE warehouses (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    cost_center VARCHAR(64),
    inventory_account_id UUID REFERENCES accounts(id),
    negative_inventory_policy negative_inventory_policy NOT NULL DEFAULT 'disallow',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_warehouses_org_code UNIQUE (organization_id, code)
);
";

const INVENTORY_LAYERS_SQL: &str = r"
CREATE TABLE inventory_layers (
    id UUID PRIMARY KEY,
    sequence BIGSERIAL NOT NULL UNIQUE,
    organization_id UUID NOT NULL,
    item_id UUID NOT NULL REFERENCES items(id),
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    quantity_original NUMERIC(20, 6) NOT NULL,
    quantity_remaining NUMERIC(20, 6) NOT NULL,
    unit_cost NUMERIC(20, 6) NOT NULL,
    movement_type movement_type NOT NULL,
    reference_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_layers_original_positive CHECK (quantity_original > 0),
    CONSTRAINT chk_layers_remaining_bounds
        CHECK (quantity_remaining >= 0 AND quantity_remaining <= quantity_original),
    CONSTRAINT chk_layers_unit_cost_non_negative CHECK (unit_cost >= 0)
);

-- FIFO scan: open layers per item and warehouse, oldest first
CREATE INDEX idx_layers_fifo
    ON inventory_layers(organization_id, item_id, warehouse_id, created_at, sequence)
    WHERE quantity_remaining > 0;
CREATE INDEX idx_layers_reference ON inventory_layers(reference_id) WHERE reference_id IS NOT NULL;
";

const INVENTORY_MOVEMENTS_SQL: &str = r"
CREATE TABLE inventory_movements (
    id UUID PRIMARY KEY,
    sequence BIGSERIAL NOT NULL UNIQUE,
    organization_id UUID NOT NULL,
    item_id UUID NOT NULL REFERENCES items(id),
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    quantity NUMERIC(20, 6) NOT NULL,
    unit_cost NUMERIC(20, 6) NOT NULL,
    total_cost NUMERIC NOT NULL,
    movement_type movement_type NOT NULL,
    reference_id UUID,
    posting_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_movements_quantity_non_zero CHECK (quantity <> 0)
);

CREATE INDEX idx_movements_item_warehouse
    ON inventory_movements(organization_id, item_id, warehouse_id, sequence);
";

const TRANSFERS_SQL: &str = r"
CREATE TABLE transfers (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    transfer_number VARCHAR(20) NOT NULL,
    source_warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    destination_warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    transfer_date DATE NOT NULL,
    status transfer_status NOT NULL DEFAULT 'draft',
    notes TEXT,
    total_value NUMERIC NOT NULL DEFAULT 0,
    journal_id UUID REFERENCES journals(id),
    reversal_journal_id UUID REFERENCES journals(id),
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    confirmed_at TIMESTAMPTZ,
    completed_at TIMESTAMPTZ,
    cancelled_at TIMESTAMPTZ,

    CONSTRAINT uq_transfers_org_number UNIQUE (organization_id, transfer_number),
    CONSTRAINT chk_transfers_distinct_warehouses
        CHECK (source_warehouse_id <> destination_warehouse_id)
);

CREATE INDEX idx_transfers_org_status ON transfers(organization_id, status);
";

const TRANSFER_ITEMS_SQL: &str = r"
CREATE TABLE transfer_items (
    id UUID PRIMARY KEY,
    transfer_id UUID NOT NULL REFERENCES transfers(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    item_id UUID NOT NULL REFERENCES items(id),
    quantity NUMERIC(20, 6) NOT NULL,
    unit_cost NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_value NUMERIC NOT NULL DEFAULT 0,

    CONSTRAINT uq_transfer_items_line UNIQUE (transfer_id, line_number),
    CONSTRAINT chk_transfer_items_quantity_positive CHECK (quantity > 0)
);
";

const DOCUMENT_SEQUENCES_SQL: &str = r"
CREATE TABLE document_sequences (
    organization_id UUID NOT NULL,
    document_type VARCHAR(32) NOT NULL,
    last_value BIGINT NOT NULL DEFAULT 0,

    PRIMARY KEY (organization_id, document_type)
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS document_sequences CASCADE;
DROP TABLE IF EXISTS transfer_items CASCADE;
DROP TABLE IF EXISTS transfers CASCADE;
DROP TABLE IF EXISTS inventory_movements CASCADE;
DROP TABLE IF EXISTS inventory_layers CASCADE;
DROP TABLE IF EXISTS warehouses CASCADE;
DROP TABLE IF EXISTS items CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journals CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;

DROP TYPE IF EXISTS transfer_status;
DROP TYPE IF EXISTS negative_inventory_policy;
DROP TYPE IF EXISTS movement_type;
DROP TYPE IF EXISTS journal_source;
DROP TYPE IF EXISTS account_subtype;
DROP TYPE IF EXISTS account_type;
";
