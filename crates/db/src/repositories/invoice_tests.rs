//! Unit tests for the invoice repository's pure mapping helpers.

use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use bursar_core::invoice::{InvoiceStatus as CoreInvoiceStatus, LedgerError};

use crate::entities::{invoice_items, sea_orm_active_enums::InvoiceItemStatus};
use crate::repositories::invoice::{invoice_status_from_rows, ledger_from_model};

fn item_row(
    amount: rust_decimal::Decimal,
    paid: rust_decimal::Decimal,
    waived: rust_decimal::Decimal,
    balance: rust_decimal::Decimal,
    status: InvoiceItemStatus,
) -> invoice_items::Model {
    let now = Utc::now().into();
    invoice_items::Model {
        id: Uuid::now_v7(),
        invoice_id: Uuid::now_v7(),
        fee_structure_item_id: None,
        name: "Tuition".to_string(),
        amount,
        paid_amount: paid,
        waived_amount: waived,
        balance_amount: balance,
        status,
        carried_forward_from: None,
        waiver_reason: None,
        waiver_approved_by: None,
        created_at: now,
        updated_at: now,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_ledger_from_model_roundtrips_quantities() {
    let row = item_row(
        dec!(1000),
        dec!(400),
        dec!(100),
        dec!(500),
        InvoiceItemStatus::PartiallyPaid,
    );
    let ledger = ledger_from_model(&row).unwrap();

    assert_eq!(ledger.id.into_inner(), row.id);
    assert_eq!(ledger.amount.amount(), dec!(1000));
    assert_eq!(ledger.paid.amount(), dec!(400));
    assert_eq!(ledger.waived.amount(), dec!(100));
    assert_eq!(ledger.balance.amount(), dec!(500));
    assert!(ledger.is_consistent());
}

#[test]
fn test_ledger_from_model_rejects_corrupt_row() {
    let row = item_row(
        dec!(1000),
        dec!(400),
        dec!(100),
        dec!(400),
        InvoiceItemStatus::PartiallyPaid,
    );
    let err = ledger_from_model(&row).unwrap_err();
    assert!(matches!(err, LedgerError::Inconsistent { .. }));
}

#[test]
fn test_invoice_status_from_rows_partial() {
    let rows = [
        item_row(
            dec!(1000),
            dec!(400),
            dec!(0),
            dec!(600),
            InvoiceItemStatus::PartiallyPaid,
        ),
        item_row(dec!(200), dec!(0), dec!(0), dec!(200), InvoiceItemStatus::Unpaid),
    ];
    let status = invoice_status_from_rows(&rows, date(2026, 4, 30), false, date(2026, 2, 1));
    assert_eq!(status, CoreInvoiceStatus::PartiallyPaid);
}

#[test]
fn test_invoice_status_from_rows_overdue_and_cancelled_precedence() {
    let rows = [item_row(
        dec!(1000),
        dec!(400),
        dec!(0),
        dec!(600),
        InvoiceItemStatus::PartiallyPaid,
    )];
    let overdue = invoice_status_from_rows(&rows, date(2026, 4, 30), false, date(2026, 5, 1));
    assert_eq!(overdue, CoreInvoiceStatus::Overdue);

    let cancelled = invoice_status_from_rows(&rows, date(2026, 4, 30), true, date(2026, 5, 1));
    assert_eq!(cancelled, CoreInvoiceStatus::Cancelled);
}

#[test]
fn test_invoice_status_from_rows_waived_out_reads_paid() {
    let rows = [item_row(
        dec!(500),
        dec!(0),
        dec!(500),
        dec!(0),
        InvoiceItemStatus::Paid,
    )];
    let status = invoice_status_from_rows(&rows, date(2026, 4, 30), false, date(2026, 6, 1));
    assert_eq!(status, CoreInvoiceStatus::Paid);
}

#[test]
fn test_invoice_status_from_rows_empty_invoice_reads_paid() {
    let status = invoice_status_from_rows(&[], date(2026, 4, 30), false, date(2026, 2, 1));
    assert_eq!(status, CoreInvoiceStatus::Paid);
}
