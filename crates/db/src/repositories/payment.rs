//! Payment repository: allocation, cancellation, and refund.
//!
//! `allocate_payment` runs the core allocation engine against row-locked
//! invoice items and persists payment, payment items, and updated ledgers
//! as one transaction - a failure at any target leaves no observable
//! effect. The reversal entry points wrap the core reversal service the
//! same way; a store failure mid-reversal surfaces as `ReversalAborted`
//! with every field change rolled back.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use bursar_core::invoice::LedgerError;
use bursar_core::payment::{
    AllocationEngine, AllocationError, AllocationItem, AllocationTarget,
    PaymentItemStatus as CorePaymentItemStatus,
};
use bursar_core::reversal::{PaymentItemState, ReversalError, ReversalOutcome, ReversalService};
use bursar_shared::types::{
    InvoiceId, InvoiceItemId, Money, PaymentId, PaymentItemId, StaffId, StudentId,
};

use crate::entities::{invoice_items, invoices, payment_items, payments};

use super::invoice::{ledger_from_model, refresh_invoice_status};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// Payment item not found.
    #[error("Payment item not found: {0}")]
    PaymentItemNotFound(Uuid),

    /// Invoice item not found.
    #[error("Invoice item not found: {0}")]
    ItemNotFound(Uuid),

    /// Invoice not found for a targeted item.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    /// The allocation engine rejected the batch.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// The reversal service rejected the operation.
    #[error(transparent)]
    Reversal(#[from] ReversalError),

    /// A store failure rolled the reversal back; no field change was
    /// retained.
    #[error("Reversal aborted, all changes rolled back: {0}")]
    ReversalAborted(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerError> for PaymentError {
    fn from(err: LedgerError) -> Self {
        Self::Allocation(AllocationError::from(err))
    }
}

/// Input for allocating one payment across invoice items.
#[derive(Debug, Clone)]
pub struct AllocatePaymentInput {
    /// Caller-supplied payment number (format is opaque here).
    pub payment_number: String,
    /// The paying student.
    pub student_id: StudentId,
    /// Total payment amount; must equal the sum of target amounts.
    pub amount: Money,
    /// Who collected the payment (opaque actor reference).
    pub received_by: Option<StaffId>,
    /// Ordered allocation targets (sequence = list position).
    pub targets: Vec<AllocationTarget>,
}

/// A payment with its allocations.
#[derive(Debug, Clone)]
pub struct PaymentWithItems {
    /// Payment record.
    pub payment: payments::Model,
    /// Allocation records, in sequence order.
    pub items: Vec<payment_items::Model>,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Allocates a payment across invoice items as one atomic unit.
    ///
    /// Targets are processed in list order; balances consumed by earlier
    /// targets are visible to later ones. The payment is marked completed
    /// only after every allocation succeeds; any failure rolls the whole
    /// operation back.
    ///
    /// # Errors
    ///
    /// Returns an error if a target item or its invoice is missing, the
    /// engine rejects the batch, or a database operation fails.
    pub async fn allocate_payment(
        &self,
        input: AllocatePaymentInput,
        today: NaiveDate,
    ) -> Result<PaymentWithItems, PaymentError> {
        let txn = self.db.begin().await?;

        // Lock every targeted item row in a deterministic order before
        // reading balances.
        let mut target_ids: Vec<Uuid> = input
            .targets
            .iter()
            .map(|t| t.item_id.into_inner())
            .collect();
        target_ids.sort_unstable();
        target_ids.dedup();

        let item_rows = invoice_items::Entity::find()
            .filter(invoice_items::Column::Id.is_in(target_ids.clone()))
            .order_by_asc(invoice_items::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?;

        if item_rows.len() != target_ids.len() {
            let found: Vec<Uuid> = item_rows.iter().map(|r| r.id).collect();
            let missing = target_ids
                .into_iter()
                .find(|id| !found.contains(id))
                .unwrap_or_default();
            return Err(PaymentError::ItemNotFound(missing));
        }

        let allocation_items = load_allocation_items(&txn, &item_rows).await?;

        let outcome =
            AllocationEngine::allocate(input.amount, &input.targets, &allocation_items, today)?;

        let now = Utc::now();
        let payment = payments::ActiveModel {
            id: Set(PaymentId::new().into_inner()),
            payment_number: Set(input.payment_number),
            student_id: Set(input.student_id.into_inner()),
            amount: Set(input.amount.amount()),
            status: Set(outcome.payment_status.into()),
            received_by: Set(input.received_by.map(StaffId::into_inner)),
            received_at: Set(now.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let mut allocation_rows = Vec::with_capacity(outcome.allocations.len());
        for planned in &outcome.allocations {
            let row = payment_items::ActiveModel {
                id: Set(PaymentItemId::new().into_inner()),
                payment_id: Set(payment.id),
                invoice_item_id: Set(planned.item_id.into_inner()),
                sequence: Set(i32::try_from(planned.sequence).unwrap_or(i32::MAX)),
                amount: Set(planned.amount.amount()),
                item_amount_snapshot: Set(planned.item_amount_snapshot.amount()),
                status: Set(planned.status.into()),
                refund_amount: Set(None),
                refunded_at: Set(None),
                cancelled_at: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(&txn)
            .await?;
            allocation_rows.push(row);
        }

        for ledger in &outcome.updated_items {
            let row = item_rows
                .iter()
                .find(|r| r.id == ledger.id.into_inner())
                .cloned()
                .ok_or(PaymentError::ItemNotFound(ledger.id.into_inner()))?;
            let mut active: invoice_items::ActiveModel = row.into();
            active.paid_amount = Set(ledger.paid.amount());
            active.balance_amount = Set(ledger.balance.amount());
            active.status = Set(ledger.status.into());
            active.updated_at = Set(now.into());
            active.update(&txn).await?;
        }

        // Derived invoice status, recomputed in the same transaction.
        let mut invoice_ids: Vec<Uuid> = outcome
            .allocations
            .iter()
            .map(|a| a.invoice_id.into_inner())
            .collect();
        invoice_ids.sort_unstable();
        invoice_ids.dedup();
        for invoice_id in invoice_ids {
            let invoice = invoices::Entity::find_by_id(invoice_id)
                .one(&txn)
                .await?
                .ok_or(PaymentError::InvoiceNotFound(invoice_id))?;
            refresh_invoice_status(&txn, invoice, today).await?;
        }

        txn.commit().await?;

        Ok(PaymentWithItems {
            payment,
            items: allocation_rows,
        })
    }

    /// Fetches a payment with its allocations.
    ///
    /// # Errors
    ///
    /// Returns `PaymentNotFound` if the payment does not exist.
    pub async fn get_with_items(&self, id: PaymentId) -> Result<PaymentWithItems, PaymentError> {
        let payment = payments::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(PaymentError::PaymentNotFound(id.into_inner()))?;

        let items = payment_items::Entity::find()
            .filter(payment_items::Column::PaymentId.eq(payment.id))
            .order_by_asc(payment_items::Column::Sequence)
            .all(&self.db)
            .await?;

        Ok(PaymentWithItems { payment, items })
    }

    /// Cancels one payment allocation, restoring the invoice item's
    /// balance in full.
    ///
    /// Cascades the parent payment to cancelled when this was its last
    /// non-cancelled allocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation is missing or not completed;
    /// `ReversalAborted` if a store failure rolled the reversal back.
    pub async fn cancel_payment_item(
        &self,
        payment_item_id: PaymentItemId,
        today: NaiveDate,
    ) -> Result<payment_items::Model, PaymentError> {
        let txn = self.db.begin().await?;
        let ctx = load_reversal_context(&txn, payment_item_id).await?;

        let outcome = ReversalService::cancel(
            &ctx.state,
            &ctx.sibling_statuses,
            &ctx.ledger,
            ctx.due_date,
            Utc::now(),
        )?;

        let updated = persist_reversal(&txn, ctx, &outcome, today)
            .await
            .map_err(|e| PaymentError::ReversalAborted(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| PaymentError::ReversalAborted(e.to_string()))?;

        Ok(updated)
    }

    /// Refunds a payment allocation, fully or partially.
    ///
    /// Cascades the parent payment to refunded only when all of its
    /// allocations are refunded.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation is missing or not completed,
    /// the amount exceeds the allocation; `ReversalAborted` if a store
    /// failure rolled the reversal back.
    pub async fn refund_payment_item(
        &self,
        payment_item_id: PaymentItemId,
        amount: Money,
        today: NaiveDate,
    ) -> Result<payment_items::Model, PaymentError> {
        let txn = self.db.begin().await?;
        let ctx = load_reversal_context(&txn, payment_item_id).await?;

        let outcome = ReversalService::refund(
            &ctx.state,
            amount,
            &ctx.sibling_statuses,
            &ctx.ledger,
            ctx.due_date,
            Utc::now(),
        )?;

        let updated = persist_reversal(&txn, ctx, &outcome, today)
            .await
            .map_err(|e| PaymentError::ReversalAborted(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| PaymentError::ReversalAborted(e.to_string()))?;

        Ok(updated)
    }
}

/// Everything a reversal needs, loaded under row locks in one snapshot.
struct ReversalContext {
    state: PaymentItemState,
    sibling_statuses: Vec<CorePaymentItemStatus>,
    ledger: bursar_core::invoice::ItemLedger,
    due_date: NaiveDate,
    payment_item: payment_items::Model,
    invoice_item: invoice_items::Model,
    payment: payments::Model,
    invoice: invoices::Model,
}

/// Builds engine inputs for the locked item rows.
async fn load_allocation_items(
    txn: &DatabaseTransaction,
    item_rows: &[invoice_items::Model],
) -> Result<Vec<AllocationItem>, PaymentError> {
    let mut invoice_ids: Vec<Uuid> = item_rows.iter().map(|r| r.invoice_id).collect();
    invoice_ids.sort_unstable();
    invoice_ids.dedup();

    let invoice_rows = invoices::Entity::find()
        .filter(invoices::Column::Id.is_in(invoice_ids.clone()))
        .all(txn)
        .await?;

    let mut items = Vec::with_capacity(item_rows.len());
    for row in item_rows {
        let invoice = invoice_rows
            .iter()
            .find(|i| i.id == row.invoice_id)
            .ok_or(PaymentError::InvoiceNotFound(row.invoice_id))?;
        let ledger = ledger_from_model(row)?;
        items.push(AllocationItem {
            invoice_id: InvoiceId::from_uuid(invoice.id),
            due_date: invoice.due_date,
            invoice_cancelled: invoice.cancelled_at.is_some(),
            ledger,
        });
    }
    Ok(items)
}

/// Loads the payment item, its siblings, the invoice item, and the
/// invoice under row locks so the cascade check observes a consistent
/// snapshot.
async fn load_reversal_context(
    txn: &DatabaseTransaction,
    payment_item_id: PaymentItemId,
) -> Result<ReversalContext, PaymentError> {
    let payment_item = payment_items::Entity::find_by_id(payment_item_id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(PaymentError::PaymentItemNotFound(payment_item_id.into_inner()))?;

    let payment = payments::Entity::find_by_id(payment_item.payment_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(PaymentError::PaymentNotFound(payment_item.payment_id))?;

    let siblings = payment_items::Entity::find()
        .filter(payment_items::Column::PaymentId.eq(payment.id))
        .filter(payment_items::Column::Id.ne(payment_item.id))
        .order_by_asc(payment_items::Column::Sequence)
        .lock_exclusive()
        .all(txn)
        .await?;

    let invoice_item = invoice_items::Entity::find_by_id(payment_item.invoice_item_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(PaymentError::ItemNotFound(payment_item.invoice_item_id))?;

    let invoice = invoices::Entity::find_by_id(invoice_item.invoice_id)
        .one(txn)
        .await?
        .ok_or(PaymentError::InvoiceNotFound(invoice_item.invoice_id))?;

    let ledger = ledger_from_model(&invoice_item)
        .map_err(|e| PaymentError::Reversal(ReversalError::from(e)))?;

    Ok(ReversalContext {
        state: payment_item_state(&payment_item),
        sibling_statuses: sibling_statuses(&siblings),
        ledger,
        due_date: invoice.due_date,
        payment_item,
        invoice_item,
        payment,
        invoice,
    })
}

/// Persists a reversal outcome: payment item, invoice item, payment
/// cascade, and invoice status, all within the caller's transaction.
async fn persist_reversal(
    txn: &DatabaseTransaction,
    ctx: ReversalContext,
    outcome: &ReversalOutcome,
    today: NaiveDate,
) -> Result<payment_items::Model, DbErr> {
    let now = Utc::now();

    let mut item_active: payment_items::ActiveModel = ctx.payment_item.into();
    item_active.status = Set(outcome.item_status.into());
    match &outcome.refund {
        Some(refund) => {
            item_active.refund_amount = Set(Some(refund.amount.amount()));
            item_active.refunded_at = Set(Some(refund.refunded_at.into()));
        }
        None => {
            item_active.cancelled_at = Set(Some(now.into()));
        }
    }
    item_active.updated_at = Set(now.into());
    let updated = item_active.update(txn).await?;

    let mut ledger_active: invoice_items::ActiveModel = ctx.invoice_item.into();
    ledger_active.paid_amount = Set(outcome.ledger.paid.amount());
    ledger_active.balance_amount = Set(outcome.ledger.balance.amount());
    ledger_active.status = Set(outcome.ledger.status.into());
    ledger_active.updated_at = Set(now.into());
    ledger_active.update(txn).await?;

    let mut payment_active: payments::ActiveModel = ctx.payment.into();
    payment_active.status = Set(outcome.payment_status.into());
    payment_active.updated_at = Set(now.into());
    payment_active.update(txn).await?;

    refresh_invoice_status(txn, ctx.invoice, today).await?;

    Ok(updated)
}

/// Maps a stored payment item row into the core reversal state.
pub(crate) fn payment_item_state(model: &payment_items::Model) -> PaymentItemState {
    PaymentItemState {
        id: PaymentItemId::from_uuid(model.id),
        payment_id: PaymentId::from_uuid(model.payment_id),
        invoice_item_id: InvoiceItemId::from_uuid(model.invoice_item_id),
        amount: Money::new(model.amount),
        status: model.status.clone().into(),
    }
}

/// Extracts the sibling statuses the payment cascade derives from.
pub(crate) fn sibling_statuses(siblings: &[payment_items::Model]) -> Vec<CorePaymentItemStatus> {
    siblings.iter().map(|s| s.status.clone().into()).collect()
}

#[cfg(test)]
#[path = "payment_tests.rs"]
mod tests;
