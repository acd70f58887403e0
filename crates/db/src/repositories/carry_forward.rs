//! Balance carry-forward repository.
//!
//! Moves a student's outstanding fee-line balances from a source
//! (class, academic year, term) scope into the destination scope's
//! invoice. The transfer, its details, the new fee lines, and (when
//! needed) the destination invoice are written in one transaction -
//! either every detail transfers or none does. If a write fails after
//! planning, the rollback is recorded as a `failed` transfer.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use bursar_core::carryforward::{CarryForwardPlan, CarryForwardPlanner, SourceItem, TransferStatus};
use bursar_core::invoice::ItemLedger;
use bursar_shared::types::{
    CarryForwardDetailId, CarryForwardId, InvoiceId, InvoiceItemId, Money, StudentId, TermScope,
};

use crate::entities::{
    carry_forward_details, carry_forward_transfers, invoice_items, invoices,
    sea_orm_active_enums::InvoiceStatus as DbInvoiceStatus,
};

use super::invoice::refresh_invoice_status;

/// Error types for carry-forward operations.
#[derive(Debug, thiserror::Error)]
pub enum CarryForwardError {
    /// The transfer failed and was rolled back; recorded as `failed`.
    #[error("Carry-forward transfer failed, all details rolled back: {0}")]
    TransferFailed(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for a balance carry-forward.
#[derive(Debug, Clone)]
pub struct CarryForwardInput {
    /// The student whose balances move.
    pub student_id: StudentId,
    /// Source scope to drain.
    pub from: TermScope,
    /// Destination scope to fill.
    pub to: TermScope,
    /// Invoice number for the destination invoice if one must be created
    /// (supplied by the caller; format is opaque here).
    pub destination_invoice_number: String,
    /// Due date for a newly created destination invoice.
    pub destination_due_date: NaiveDate,
}

/// A completed transfer with its details and created fee lines.
#[derive(Debug, Clone)]
pub struct TransferWithDetails {
    /// Transfer record.
    pub transfer: carry_forward_transfers::Model,
    /// One detail per carried-over fee line.
    pub details: Vec<carry_forward_details::Model>,
    /// The fee lines created on the destination invoice.
    pub new_items: Vec<invoice_items::Model>,
}

/// Carry-forward repository.
#[derive(Debug, Clone)]
pub struct CarryForwardRepository {
    db: DatabaseConnection,
}

impl CarryForwardRepository {
    /// Creates a new carry-forward repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Carries a student's outstanding balances from one scope to
    /// another.
    ///
    /// A student with no outstanding balance yields a transfer with zero
    /// details and status `transferred` - a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns `TransferFailed` if a write failed after planning (the
    /// whole transfer rolled back and a `failed` transfer was recorded),
    /// or `Database` for failures before planning.
    pub async fn carry_forward_balances(
        &self,
        input: CarryForwardInput,
        today: NaiveDate,
    ) -> Result<TransferWithDetails, CarryForwardError> {
        let txn = self.db.begin().await?;

        let source_items = load_source_items(&txn, input.student_id, &input.from).await?;
        let plan = CarryForwardPlanner::plan(&source_items);

        match apply_plan(&txn, &input, &plan, today).await {
            Ok(result) => {
                txn.commit().await?;
                Ok(result)
            }
            Err(err) => {
                // The transaction rolls back on drop; record the failure
                // so the transfer's outcome is visible.
                drop(txn);
                self.record_failed_transfer(&input).await;
                Err(CarryForwardError::TransferFailed(err.to_string()))
            }
        }
    }

    /// Fetches a transfer with its details.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_with_details(
        &self,
        id: CarryForwardId,
    ) -> Result<Option<TransferWithDetails>, CarryForwardError> {
        let Some(transfer) = carry_forward_transfers::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let details = carry_forward_details::Entity::find()
            .filter(carry_forward_details::Column::TransferId.eq(transfer.id))
            .order_by_asc(carry_forward_details::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let new_item_ids: Vec<Uuid> = details.iter().filter_map(|d| d.new_item_id).collect();
        let new_items = if new_item_ids.is_empty() {
            Vec::new()
        } else {
            invoice_items::Entity::find()
                .filter(invoice_items::Column::Id.is_in(new_item_ids))
                .all(&self.db)
                .await?
        };

        Ok(Some(TransferWithDetails {
            transfer,
            details,
            new_items,
        }))
    }

    /// Best-effort record of a rolled-back transfer.
    async fn record_failed_transfer(&self, input: &CarryForwardInput) {
        let now = Utc::now().into();
        let row = carry_forward_transfers::ActiveModel {
            id: Set(CarryForwardId::new().into_inner()),
            student_id: Set(input.student_id.into_inner()),
            from_class_id: Set(input.from.class_id.into_inner()),
            from_academic_year_id: Set(input.from.academic_year_id.into_inner()),
            from_term: Set(input.from.term.into()),
            to_class_id: Set(input.to.class_id.into_inner()),
            to_academic_year_id: Set(input.to.academic_year_id.into_inner()),
            to_term: Set(input.to.term.into()),
            destination_invoice_id: Set(None),
            total_balance_transferred: Set(Money::ZERO.amount()),
            status: Set(TransferStatus::Failed.into()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        if let Err(err) = row.insert(&self.db).await {
            tracing::warn!(error = %err, "failed to record failed carry-forward transfer");
        }
    }
}

/// Loads (row-locked) the student's fee lines in the source scope.
async fn load_source_items(
    txn: &DatabaseTransaction,
    student_id: StudentId,
    from: &TermScope,
) -> Result<Vec<SourceItem>, DbErr> {
    let source_invoice_ids: Vec<Uuid> = invoices::Entity::find()
        .filter(invoices::Column::StudentId.eq(student_id.into_inner()))
        .filter(invoices::Column::ClassId.eq(from.class_id.into_inner()))
        .filter(invoices::Column::AcademicYearId.eq(from.academic_year_id.into_inner()))
        .filter(invoices::Column::Term.eq(crate::entities::sea_orm_active_enums::Term::from(
            from.term,
        )))
        .filter(invoices::Column::Status.ne(DbInvoiceStatus::Cancelled))
        .select_only()
        .column(invoices::Column::Id)
        .into_tuple()
        .all(txn)
        .await?;

    if source_invoice_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = invoice_items::Entity::find()
        .filter(invoice_items::Column::InvoiceId.is_in(source_invoice_ids))
        .order_by_asc(invoice_items::Column::Id)
        .lock_exclusive()
        .all(txn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| SourceItem {
            item_id: InvoiceItemId::from_uuid(row.id),
            fee_name: row.name,
            amount: Money::new(row.amount),
            balance: Money::new(row.balance_amount),
        })
        .collect())
}

/// Writes the transfer, destination invoice (if needed), new fee lines,
/// and details.
async fn apply_plan(
    txn: &DatabaseTransaction,
    input: &CarryForwardInput,
    plan: &CarryForwardPlan,
    today: NaiveDate,
) -> Result<TransferWithDetails, DbErr> {
    let now = Utc::now().into();

    let destination_invoice = if plan.is_noop() {
        None
    } else {
        Some(find_or_create_destination(txn, input, now).await?)
    };

    let transfer = carry_forward_transfers::ActiveModel {
        id: Set(CarryForwardId::new().into_inner()),
        student_id: Set(input.student_id.into_inner()),
        from_class_id: Set(input.from.class_id.into_inner()),
        from_academic_year_id: Set(input.from.academic_year_id.into_inner()),
        from_term: Set(input.from.term.into()),
        to_class_id: Set(input.to.class_id.into_inner()),
        to_academic_year_id: Set(input.to.academic_year_id.into_inner()),
        to_term: Set(input.to.term.into()),
        destination_invoice_id: Set(destination_invoice.as_ref().map(|i| i.id)),
        total_balance_transferred: Set(plan.total_balance_transferred.amount()),
        status: Set(plan.status.into()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;

    let mut new_items = Vec::with_capacity(plan.new_items.len());
    let mut details = Vec::with_capacity(plan.details.len());

    if let Some(invoice) = &destination_invoice {
        for (carried, detail) in plan.new_items.iter().zip(plan.details.iter()) {
            let ledger = ItemLedger::carried_forward(InvoiceItemId::new(), carried.amount);
            let item_row = invoice_items::ActiveModel {
                id: Set(ledger.id.into_inner()),
                invoice_id: Set(invoice.id),
                fee_structure_item_id: Set(None),
                name: Set(carried.fee_name.clone()),
                amount: Set(ledger.amount.amount()),
                paid_amount: Set(ledger.paid.amount()),
                waived_amount: Set(ledger.waived.amount()),
                balance_amount: Set(ledger.balance.amount()),
                status: Set(ledger.status.into()),
                carried_forward_from: Set(Some(carried.carried_forward_from.into_inner())),
                waiver_reason: Set(None),
                waiver_approved_by: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(txn)
            .await?;

            let detail_row = carry_forward_details::ActiveModel {
                id: Set(CarryForwardDetailId::new().into_inner()),
                transfer_id: Set(transfer.id),
                source_item_id: Set(detail.source_item_id.into_inner()),
                new_item_id: Set(Some(item_row.id)),
                fee_name: Set(detail.fee_name.clone()),
                original_amount: Set(detail.original_amount.amount()),
                balance_amount: Set(detail.balance_amount.amount()),
                created_at: Set(now),
            }
            .insert(txn)
            .await?;

            new_items.push(item_row);
            details.push(detail_row);
        }
    }

    if let Some(invoice) = destination_invoice {
        refresh_invoice_status(txn, invoice, today).await?;
    }

    Ok(TransferWithDetails {
        transfer,
        details,
        new_items,
    })
}

/// Finds the student's invoice in the destination scope, creating one
/// when none exists.
async fn find_or_create_destination(
    txn: &DatabaseTransaction,
    input: &CarryForwardInput,
    now: sea_orm::prelude::DateTimeWithTimeZone,
) -> Result<invoices::Model, DbErr> {
    let existing = invoices::Entity::find()
        .filter(invoices::Column::StudentId.eq(input.student_id.into_inner()))
        .filter(invoices::Column::ClassId.eq(input.to.class_id.into_inner()))
        .filter(invoices::Column::AcademicYearId.eq(input.to.academic_year_id.into_inner()))
        .filter(invoices::Column::Term.eq(crate::entities::sea_orm_active_enums::Term::from(
            input.to.term,
        )))
        .filter(invoices::Column::Status.ne(DbInvoiceStatus::Cancelled))
        .lock_exclusive()
        .one(txn)
        .await?;

    if let Some(invoice) = existing {
        return Ok(invoice);
    }

    invoices::ActiveModel {
        id: Set(InvoiceId::new().into_inner()),
        invoice_number: Set(input.destination_invoice_number.clone()),
        student_id: Set(input.student_id.into_inner()),
        class_id: Set(input.to.class_id.into_inner()),
        academic_year_id: Set(input.to.academic_year_id.into_inner()),
        term: Set(input.to.term.into()),
        due_date: Set(input.destination_due_date),
        status: Set(DbInvoiceStatus::Unpaid),
        cancelled_at: Set(None),
        cancelled_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await
}
