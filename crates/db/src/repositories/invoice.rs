//! Invoice repository.
//!
//! Creates invoices from fee structures, applies and revokes waivers, and
//! cancels invoices. Every mutation locks the affected invoice item rows
//! (`SELECT ... FOR UPDATE`) and re-validates against the instantaneous
//! balance inside the transaction, so no two writers can interleave a
//! read-modify-write of the same fee line.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use bursar_core::invoice::{aggregate, InvoiceTotals, ItemLedger, LedgerError};
use bursar_shared::types::{
    FeeStructureId, InvoiceId, InvoiceItemId, Money, PageRequest, PageResponse, StaffId, StudentId,
};

use crate::entities::{fee_structure_items, fee_structures, invoice_items, invoices};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// Invoice item not found.
    #[error("Invoice item not found: {0}")]
    ItemNotFound(Uuid),

    /// Fee structure not found.
    #[error("Fee structure not found: {0}")]
    FeeStructureNotFound(Uuid),

    /// Fee structure exists but is no longer active.
    #[error("Fee structure {0} is inactive")]
    FeeStructureInactive(Uuid),

    /// A ledger rule rejected the mutation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an invoice from a fee structure.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// Caller-supplied invoice number (format is opaque here).
    pub invoice_number: String,
    /// The billed student.
    pub student_id: StudentId,
    /// The fee structure to copy items from.
    pub fee_structure_id: FeeStructureId,
    /// Payment due date.
    pub due_date: NaiveDate,
}

/// An invoice with its fee lines.
#[derive(Debug, Clone)]
pub struct InvoiceWithItems {
    /// Invoice record.
    pub invoice: invoices::Model,
    /// Fee line records.
    pub items: Vec<invoice_items::Model>,
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an invoice for a student, copying the fee structure's
    /// lines at their current amounts.
    ///
    /// Later fee-structure edits do not retroactively affect the issued
    /// invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the fee structure is missing or inactive, or a
    /// database operation fails.
    pub async fn create_invoice(
        &self,
        input: CreateInvoiceInput,
        today: NaiveDate,
    ) -> Result<InvoiceWithItems, InvoiceError> {
        let structure_id = input.fee_structure_id.into_inner();
        let structure = fee_structures::Entity::find_by_id(structure_id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::FeeStructureNotFound(structure_id))?;
        if !structure.is_active {
            return Err(InvoiceError::FeeStructureInactive(structure_id));
        }

        let fee_items = fee_structure_items::Entity::find()
            .filter(fee_structure_items::Column::FeeStructureId.eq(structure.id))
            .order_by_asc(fee_structure_items::Column::SortOrder)
            .all(&self.db)
            .await?;

        let now = Utc::now().into();
        let invoice_id = InvoiceId::new();

        let txn = self.db.begin().await?;

        let invoice = invoices::ActiveModel {
            id: Set(invoice_id.into_inner()),
            invoice_number: Set(input.invoice_number),
            student_id: Set(input.student_id.into_inner()),
            class_id: Set(structure.class_id),
            academic_year_id: Set(structure.academic_year_id),
            term: Set(structure.term.clone()),
            due_date: Set(input.due_date),
            status: Set(crate::entities::sea_orm_active_enums::InvoiceStatus::Unpaid),
            cancelled_at: Set(None),
            cancelled_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(fee_items.len());
        for fee_item in fee_items {
            let ledger = ItemLedger::new(InvoiceItemId::new(), Money::new(fee_item.amount));
            let row = invoice_items::ActiveModel {
                id: Set(ledger.id.into_inner()),
                invoice_id: Set(invoice.id),
                fee_structure_item_id: Set(Some(fee_item.id)),
                name: Set(fee_item.name),
                amount: Set(ledger.amount.amount()),
                paid_amount: Set(ledger.paid.amount()),
                waived_amount: Set(ledger.waived.amount()),
                balance_amount: Set(ledger.balance.amount()),
                status: Set(ledger.status.into()),
                carried_forward_from: Set(None),
                waiver_reason: Set(None),
                waiver_approved_by: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            items.push(row);
        }

        let invoice = refresh_invoice_status(&txn, invoice, today).await?;

        txn.commit().await?;

        Ok(InvoiceWithItems { invoice, items })
    }

    /// Fetches an invoice with its fee lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the invoice does not exist.
    pub async fn get_with_items(&self, id: InvoiceId) -> Result<InvoiceWithItems, InvoiceError> {
        let invoice = invoices::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id.into_inner()))?;

        let items = invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(invoice.id))
            .order_by_asc(invoice_items::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(InvoiceWithItems { invoice, items })
    }

    /// Lists a student's invoices, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_student(
        &self,
        student_id: StudentId,
        page: PageRequest,
    ) -> Result<PageResponse<invoices::Model>, InvoiceError> {
        let paginator = invoices::Entity::find()
            .filter(invoices::Column::StudentId.eq(student_id.into_inner()))
            .order_by_desc(invoices::Column::CreatedAt)
            .paginate(&self.db, page.limit().max(1));

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(u64::from(page.page.saturating_sub(1))).await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Applies a waiver to a fee line, recording the reason and approver.
    ///
    /// # Errors
    ///
    /// Returns an error if the item or invoice is missing, the invoice is
    /// cancelled, the amount exceeds the balance, or a database operation
    /// fails.
    pub async fn apply_waiver(
        &self,
        item_id: InvoiceItemId,
        amount: Money,
        reason: String,
        approved_by: StaffId,
        today: NaiveDate,
    ) -> Result<invoice_items::Model, InvoiceError> {
        let txn = self.db.begin().await?;

        let (invoice, item) = find_item_for_update(&txn, item_id).await?;
        aggregate::ensure_mutable(
            InvoiceId::from_uuid(invoice.id),
            invoice.status.clone().into(),
        )?;

        let mut ledger = ledger_from_model(&item)?;
        ledger.apply_waiver(amount, invoice.due_date, today)?;

        let mut active: invoice_items::ActiveModel = item.into();
        active.waived_amount = Set(ledger.waived.amount());
        active.balance_amount = Set(ledger.balance.amount());
        active.status = Set(ledger.status.into());
        active.waiver_reason = Set(Some(reason));
        active.waiver_approved_by = Set(Some(approved_by.into_inner()));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        refresh_invoice_status(&txn, invoice, today).await?;

        txn.commit().await?;

        Ok(updated)
    }

    /// Revokes (part of) a previously applied waiver, restoring balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount exceeds the waived total, the
    /// invoice is cancelled, or a database operation fails.
    pub async fn revoke_waiver(
        &self,
        item_id: InvoiceItemId,
        amount: Money,
        today: NaiveDate,
    ) -> Result<invoice_items::Model, InvoiceError> {
        let txn = self.db.begin().await?;

        let (invoice, item) = find_item_for_update(&txn, item_id).await?;
        aggregate::ensure_mutable(
            InvoiceId::from_uuid(invoice.id),
            invoice.status.clone().into(),
        )?;

        let mut ledger = ledger_from_model(&item)?;
        ledger.reverse_waiver(amount, invoice.due_date, today)?;

        let mut active: invoice_items::ActiveModel = item.into();
        active.waived_amount = Set(ledger.waived.amount());
        active.balance_amount = Set(ledger.balance.amount());
        active.status = Set(ledger.status.into());
        if ledger.waived.is_zero() {
            active.waiver_reason = Set(None);
            active.waiver_approved_by = Set(None);
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        refresh_invoice_status(&txn, invoice, today).await?;

        txn.commit().await?;

        Ok(updated)
    }

    /// Cancels an invoice. Terminal: no further allocation is permitted.
    ///
    /// Fails while any completed, unreversed payment item references the
    /// invoice's fee lines - those must be refunded or cancelled first.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing or already cancelled,
    /// active payments exist, or a database operation fails.
    pub async fn cancel_invoice(
        &self,
        invoice_id: InvoiceId,
        cancelled_by: StaffId,
    ) -> Result<invoices::Model, InvoiceError> {
        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find_by_id(invoice_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(InvoiceError::NotFound(invoice_id.into_inner()))?;
        aggregate::ensure_mutable(invoice_id, invoice.status.clone().into())?;

        let active_items = count_active_payment_items(&txn, invoice.id).await?;
        aggregate::ensure_cancellable(invoice_id, active_items)?;

        let now = Utc::now();
        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(crate::entities::sea_orm_active_enums::InvoiceStatus::Cancelled);
        active.cancelled_at = Set(Some(now.into()));
        active.cancelled_by = Set(Some(cancelled_by.into_inner()));
        active.updated_at = Set(now.into());
        let cancelled = active.update(&txn).await?;

        txn.commit().await?;

        Ok(cancelled)
    }
}

/// Rebuilds the core item ledger from a stored row, verifying the
/// three-way invariant.
pub(crate) fn ledger_from_model(model: &invoice_items::Model) -> Result<ItemLedger, LedgerError> {
    ItemLedger::from_parts(
        InvoiceItemId::from_uuid(model.id),
        Money::new(model.amount),
        Money::new(model.paid_amount),
        Money::new(model.waived_amount),
        Money::new(model.balance_amount),
        model.status.clone().into(),
    )
}

/// Derives the invoice status from its stored fee lines.
pub(crate) fn invoice_status_from_rows(
    items: &[invoice_items::Model],
    due_date: NaiveDate,
    cancelled: bool,
    today: NaiveDate,
) -> bursar_core::invoice::InvoiceStatus {
    let totals = InvoiceTotals {
        total: items.iter().map(|i| Money::new(i.amount)).sum(),
        paid: items.iter().map(|i| Money::new(i.paid_amount)).sum(),
        waived: items.iter().map(|i| Money::new(i.waived_amount)).sum(),
        balance: items.iter().map(|i| Money::new(i.balance_amount)).sum(),
    };
    totals.status(due_date, cancelled, today)
}

/// Recomputes and persists an invoice's derived status within the
/// caller's transaction.
pub(crate) async fn refresh_invoice_status(
    txn: &DatabaseTransaction,
    invoice: invoices::Model,
    today: NaiveDate,
) -> Result<invoices::Model, DbErr> {
    let items = invoice_items::Entity::find()
        .filter(invoice_items::Column::InvoiceId.eq(invoice.id))
        .all(txn)
        .await?;

    let cancelled = invoice.cancelled_at.is_some();
    let status = invoice_status_from_rows(&items, invoice.due_date, cancelled, today);

    let current: crate::entities::sea_orm_active_enums::InvoiceStatus = status.into();
    if current == invoice.status {
        return Ok(invoice);
    }

    let mut active: invoices::ActiveModel = invoice.into();
    active.status = Set(current);
    active.updated_at = Set(Utc::now().into());
    active.update(txn).await
}

/// Loads an invoice item (row-locked) together with its invoice.
async fn find_item_for_update(
    txn: &DatabaseTransaction,
    item_id: InvoiceItemId,
) -> Result<(invoices::Model, invoice_items::Model), InvoiceError> {
    let item = invoice_items::Entity::find_by_id(item_id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(InvoiceError::ItemNotFound(item_id.into_inner()))?;

    let invoice = invoices::Entity::find_by_id(item.invoice_id)
        .one(txn)
        .await?
        .ok_or(InvoiceError::NotFound(item.invoice_id))?;

    Ok((invoice, item))
}

/// Counts completed, unreversed payment items referencing the invoice's
/// fee lines.
async fn count_active_payment_items(
    txn: &DatabaseTransaction,
    invoice_id: Uuid,
) -> Result<usize, DbErr> {
    use crate::entities::{payment_items, sea_orm_active_enums::PaymentItemStatus};

    let item_ids: Vec<Uuid> = invoice_items::Entity::find()
        .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
        .select_only()
        .column(invoice_items::Column::Id)
        .into_tuple()
        .all(txn)
        .await?;

    if item_ids.is_empty() {
        return Ok(0);
    }

    let count = payment_items::Entity::find()
        .filter(payment_items::Column::InvoiceItemId.is_in(item_ids))
        .filter(payment_items::Column::Status.eq(PaymentItemStatus::Completed))
        .count(txn)
        .await?;

    Ok(usize::try_from(count).unwrap_or(usize::MAX))
}

#[cfg(test)]
#[path = "invoice_tests.rs"]
mod tests;
