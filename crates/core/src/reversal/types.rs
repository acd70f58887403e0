//! Reversal domain types.

use bursar_shared::types::{InvoiceItemId, Money, PaymentId, PaymentItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::invoice::item::ItemLedger;
use crate::payment::types::{PaymentItemStatus, PaymentStatus};

/// Current state of the payment item being reversed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentItemState {
    /// The payment item's identifier.
    pub id: PaymentItemId,
    /// The payment that owns this allocation.
    pub payment_id: PaymentId,
    /// The invoice item the allocation was applied to.
    pub invoice_item_id: InvoiceItemId,
    /// The allocated amount.
    pub amount: Money,
    /// Current allocation status.
    pub status: PaymentItemStatus,
}

/// Audit record of a refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRecord {
    /// The refunded amount (may be less than the allocation).
    pub amount: Money,
    /// When the refund was recorded.
    pub refunded_at: DateTime<Utc>,
}

/// Result of a cancel or refund: the new statuses and the reversed
/// invoice item ledger, to be persisted together in one transaction.
#[derive(Debug, Clone)]
pub struct ReversalOutcome {
    /// New status of the reversed payment item.
    pub item_status: PaymentItemStatus,
    /// Parent payment status derived from all of its items.
    pub payment_status: PaymentStatus,
    /// The invoice item ledger with the allocation reversed.
    pub ledger: ItemLedger,
    /// Refund audit data (refunds only).
    pub refund: Option<RefundRecord>,
}
