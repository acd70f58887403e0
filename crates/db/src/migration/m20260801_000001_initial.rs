//! Initial schema for the fee ledger.
//!
//! Creates the fee structure, invoice, payment, and carry-forward tables
//! with CHECK constraints mirroring the ledger invariants.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(FEE_STRUCTURES_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(CARRY_FORWARD_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
            DROP TABLE IF EXISTS carry_forward_details CASCADE;
            DROP TABLE IF EXISTS carry_forward_transfers CASCADE;
            DROP TABLE IF EXISTS payment_items CASCADE;
            DROP TABLE IF EXISTS payments CASCADE;
            DROP TABLE IF EXISTS invoice_items CASCADE;
            DROP TABLE IF EXISTS invoices CASCADE;
            DROP TABLE IF EXISTS fee_structure_items CASCADE;
            DROP TABLE IF EXISTS fee_structures CASCADE;
            DROP TYPE IF EXISTS transfer_status;
            DROP TYPE IF EXISTS payment_item_status;
            DROP TYPE IF EXISTS payment_status;
            DROP TYPE IF EXISTS invoice_item_status;
            DROP TYPE IF EXISTS invoice_status;
            DROP TYPE IF EXISTS term;
            ",
        )
        .await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE term AS ENUM ('first', 'second', 'third');
CREATE TYPE invoice_status AS ENUM ('unpaid', 'partially_paid', 'paid', 'overdue', 'cancelled');
CREATE TYPE invoice_item_status AS ENUM ('unpaid', 'partially_paid', 'paid', 'overdue');
CREATE TYPE payment_status AS ENUM ('pending', 'processing', 'completed', 'failed', 'cancelled', 'refunded');
CREATE TYPE payment_item_status AS ENUM ('pending', 'completed', 'cancelled', 'refunded');
CREATE TYPE transfer_status AS ENUM ('pending', 'transferred', 'failed');
";

const FEE_STRUCTURES_SQL: &str = r"
-- Fee structures are invoice templates: amounts are copied onto invoices
-- at creation time, so later edits never affect issued invoices.
CREATE TABLE fee_structures (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    class_id UUID NOT NULL,
    academic_year_id UUID NOT NULL,
    term term NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE fee_structure_items (
    id UUID PRIMARY KEY,
    fee_structure_id UUID NOT NULL REFERENCES fee_structures(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    amount NUMERIC(14, 2) NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_fee_item_amount_non_negative CHECK (amount >= 0)
);

CREATE INDEX idx_fee_structure_items_structure ON fee_structure_items(fee_structure_id, sort_order);
CREATE INDEX idx_fee_structures_scope ON fee_structures(class_id, academic_year_id, term) WHERE is_active;
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    invoice_number VARCHAR(64) NOT NULL UNIQUE,
    student_id UUID NOT NULL,
    class_id UUID NOT NULL,
    academic_year_id UUID NOT NULL,
    term term NOT NULL,
    due_date DATE NOT NULL,
    status invoice_status NOT NULL DEFAULT 'unpaid',
    cancelled_at TIMESTAMPTZ,
    cancelled_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_cancelled_consistent CHECK ((status = 'cancelled') = (cancelled_at IS NOT NULL))
);

-- Every fee line satisfies amount = paid + waived + balance at all times.
CREATE TABLE invoice_items (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    fee_structure_item_id UUID REFERENCES fee_structure_items(id) ON DELETE SET NULL,
    name VARCHAR(255) NOT NULL,
    amount NUMERIC(14, 2) NOT NULL,
    paid_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    waived_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    balance_amount NUMERIC(14, 2) NOT NULL,
    status invoice_item_status NOT NULL DEFAULT 'unpaid',
    carried_forward_from UUID REFERENCES invoice_items(id) ON DELETE RESTRICT,
    waiver_reason TEXT,
    waiver_approved_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_item_ledger_invariant CHECK (amount = paid_amount + waived_amount + balance_amount),
    CONSTRAINT chk_item_amounts_non_negative CHECK (
        amount >= 0 AND paid_amount >= 0 AND waived_amount >= 0 AND balance_amount >= 0
    )
);

CREATE INDEX idx_invoices_student_scope ON invoices(student_id, class_id, academic_year_id, term);
CREATE INDEX idx_invoice_items_invoice ON invoice_items(invoice_id);
CREATE INDEX idx_invoice_items_unpaid ON invoice_items(invoice_id) WHERE balance_amount > 0;
CREATE INDEX idx_invoice_items_source ON invoice_items(carried_forward_from) WHERE carried_forward_from IS NOT NULL;
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    payment_number VARCHAR(64) NOT NULL UNIQUE,
    student_id UUID NOT NULL,
    amount NUMERIC(14, 2) NOT NULL,
    status payment_status NOT NULL DEFAULT 'pending',
    received_by UUID,
    received_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_payment_amount_positive CHECK (amount > 0)
);

-- One allocation of a payment against one invoice item. The invoice item
-- reference is non-owning: reversals restore balance, deletion never
-- cascades to the item.
CREATE TABLE payment_items (
    id UUID PRIMARY KEY,
    payment_id UUID NOT NULL REFERENCES payments(id) ON DELETE CASCADE,
    invoice_item_id UUID NOT NULL REFERENCES invoice_items(id) ON DELETE RESTRICT,
    sequence INTEGER NOT NULL,
    amount NUMERIC(14, 2) NOT NULL,
    item_amount_snapshot NUMERIC(14, 2) NOT NULL,
    status payment_item_status NOT NULL DEFAULT 'pending',
    refund_amount NUMERIC(14, 2),
    refunded_at TIMESTAMPTZ,
    cancelled_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_payment_item_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_refund_within_allocation CHECK (refund_amount IS NULL OR (refund_amount > 0 AND refund_amount <= amount)),
    CONSTRAINT uq_payment_item_sequence UNIQUE (payment_id, sequence)
);

CREATE INDEX idx_payment_items_payment ON payment_items(payment_id, sequence);
CREATE INDEX idx_payment_items_invoice_item ON payment_items(invoice_item_id);
CREATE INDEX idx_payment_items_active ON payment_items(invoice_item_id) WHERE status = 'completed';
";

const CARRY_FORWARD_SQL: &str = r"
CREATE TABLE carry_forward_transfers (
    id UUID PRIMARY KEY,
    student_id UUID NOT NULL,
    from_class_id UUID NOT NULL,
    from_academic_year_id UUID NOT NULL,
    from_term term NOT NULL,
    to_class_id UUID NOT NULL,
    to_academic_year_id UUID NOT NULL,
    to_term term NOT NULL,
    destination_invoice_id UUID REFERENCES invoices(id) ON DELETE SET NULL,
    total_balance_transferred NUMERIC(14, 2) NOT NULL DEFAULT 0,
    status transfer_status NOT NULL DEFAULT 'pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_transfer_total_non_negative CHECK (total_balance_transferred >= 0)
);

-- Snapshot of one carried-over fee line. The source item reference is
-- non-owning immutable history.
CREATE TABLE carry_forward_details (
    id UUID PRIMARY KEY,
    transfer_id UUID NOT NULL REFERENCES carry_forward_transfers(id) ON DELETE CASCADE,
    source_item_id UUID NOT NULL REFERENCES invoice_items(id) ON DELETE RESTRICT,
    new_item_id UUID REFERENCES invoice_items(id) ON DELETE SET NULL,
    fee_name VARCHAR(255) NOT NULL,
    original_amount NUMERIC(14, 2) NOT NULL,
    balance_amount NUMERIC(14, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_detail_balance_positive CHECK (balance_amount > 0)
);

CREATE INDEX idx_carry_forward_transfers_student ON carry_forward_transfers(student_id);
CREATE INDEX idx_carry_forward_details_transfer ON carry_forward_details(transfer_id);
";
