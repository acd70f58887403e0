//! Development data seeder for Bursar.
//!
//! Seeds a fee structure for one class/term, issues an invoice for a
//! sample student, records a split payment, and waives part of a line -
//! a worked example of the reconciliation flow for local development.

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use tracing::info;

use bursar_core::payment::AllocationTarget;
use bursar_db::repositories::{
    AllocatePaymentInput, CreateFeeStructureInput, CreateInvoiceInput, FeeStructureItemInput,
    FeeStructureRepository, InvoiceRepository, PaymentRepository,
};
use bursar_shared::types::{
    AcademicYearId, ClassId, FeeStructureId, InvoiceItemId, Money, StaffId, StudentId, Term,
    TermScope,
};
use bursar_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = bursar_db::connect(&config.database.url)
        .await
        .context("failed to connect to database")?;

    let fee_structures = FeeStructureRepository::new(db.clone());
    let invoices = InvoiceRepository::new(db.clone());
    let payments = PaymentRepository::new(db);

    let scope = TermScope::new(ClassId::new(), AcademicYearId::new(), Term::First);
    let today = Utc::now().date_naive();

    let structure = fee_structures
        .create(CreateFeeStructureInput {
            name: "Grade 4 - Term 1".to_string(),
            scope,
            items: vec![
                FeeStructureItemInput {
                    name: "Tuition".to_string(),
                    amount: dec!(1200.00),
                },
                FeeStructureItemInput {
                    name: "Transport".to_string(),
                    amount: dec!(300.00),
                },
                FeeStructureItemInput {
                    name: "Library".to_string(),
                    amount: dec!(50.00),
                },
            ],
        })
        .await?;
    info!(id = %structure.structure.id, "seeded fee structure");

    let student_id = StudentId::new();
    let due_date = today
        .checked_add_days(chrono::Days::new(60))
        .unwrap_or(today);

    let invoice = invoices
        .create_invoice(
            CreateInvoiceInput {
                invoice_number: "INV-2026-0001".to_string(),
                student_id,
                fee_structure_id: FeeStructureId::from_uuid(structure.structure.id),
                due_date,
            },
            today,
        )
        .await?;
    info!(
        number = %invoice.invoice.invoice_number,
        items = invoice.items.len(),
        "seeded invoice"
    );

    // Split payment: settle Transport, part-pay Tuition.
    let tuition = &invoice.items[0];
    let transport = &invoice.items[1];
    let payment = payments
        .allocate_payment(
            AllocatePaymentInput {
                payment_number: "PAY-2026-0001".to_string(),
                student_id,
                amount: Money::new(dec!(700.00)),
                received_by: Some(StaffId::new()),
                targets: vec![
                    AllocationTarget {
                        item_id: InvoiceItemId::from_uuid(transport.id),
                        amount: Money::new(dec!(300.00)),
                    },
                    AllocationTarget {
                        item_id: InvoiceItemId::from_uuid(tuition.id),
                        amount: Money::new(dec!(400.00)),
                    },
                ],
            },
            today,
        )
        .await?;
    info!(number = %payment.payment.payment_number, "seeded payment");

    // Hardship waiver on the library fee.
    let library = &invoice.items[2];
    let waived = invoices
        .apply_waiver(
            InvoiceItemId::from_uuid(library.id),
            Money::new(dec!(50.00)),
            "Hardship waiver".to_string(),
            StaffId::new(),
            today,
        )
        .await?;
    info!(item = %waived.id, "seeded waiver");

    let refreshed = invoices
        .get_with_items(bursar_shared::types::InvoiceId::from_uuid(invoice.invoice.id))
        .await?;
    info!(status = ?refreshed.invoice.status, "seed complete");

    Ok(())
}
