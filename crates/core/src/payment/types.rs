//! Payment domain types for allocation and reversal state.

use bursar_shared::types::{InvoiceId, InvoiceItemId, Money};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::invoice::item::ItemLedger;

/// Status of a payment event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment recorded but not yet allocated.
    Pending,
    /// Allocation in progress.
    Processing,
    /// All allocations succeeded.
    Completed,
    /// Allocation failed; no financial effect was retained.
    Failed,
    /// Every allocation was cancelled.
    Cancelled,
    /// Every allocation was refunded.
    Refunded,
}

impl PaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    /// Derives a completed payment's status from its current payment
    /// items.
    ///
    /// Pure recomputation, never a stored flag re-synced by side effects:
    /// the payment reads `Cancelled` only when every item is cancelled and
    /// `Refunded` only when every item is refunded; any other mix leaves
    /// it `Completed`.
    #[must_use]
    pub fn derive(item_statuses: &[PaymentItemStatus]) -> Self {
        if !item_statuses.is_empty()
            && item_statuses
                .iter()
                .all(|s| *s == PaymentItemStatus::Cancelled)
        {
            Self::Cancelled
        } else if !item_statuses.is_empty()
            && item_statuses
                .iter()
                .all(|s| *s == PaymentItemStatus::Refunded)
        {
            Self::Refunded
        } else {
            Self::Completed
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of one payment allocation against one invoice item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentItemStatus {
    /// Allocation planned but not yet applied.
    Pending,
    /// Allocation applied to the invoice item.
    Completed,
    /// Allocation reversed in full by cancellation.
    Cancelled,
    /// Allocation reversed (fully or partially) by refund.
    Refunded,
}

impl PaymentItemStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    /// Returns true if the allocation still counts against its item's
    /// balance (completed and not reversed).
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for PaymentItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One caller-requested allocation: an invoice item and the amount to
/// apply against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationTarget {
    /// The targeted invoice item.
    pub item_id: InvoiceItemId,
    /// The amount to allocate to that item.
    pub amount: Money,
}

/// Engine input: one targetable invoice item with its invoice context.
#[derive(Debug, Clone)]
pub struct AllocationItem {
    /// The invoice the item belongs to.
    pub invoice_id: InvoiceId,
    /// The invoice due date (drives status recomputation).
    pub due_date: NaiveDate,
    /// Whether the invoice has been cancelled.
    pub invoice_cancelled: bool,
    /// The item's current ledger state.
    pub ledger: ItemLedger,
}

/// One planned payment item produced by the allocation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAllocation {
    /// The targeted invoice item.
    pub item_id: InvoiceItemId,
    /// The invoice the item belongs to.
    pub invoice_id: InvoiceId,
    /// Allocation order within the payment (1-based list position).
    pub sequence: u32,
    /// The allocated amount.
    pub amount: Money,
    /// The invoice item's original amount, captured at allocation time
    /// for audit.
    pub item_amount_snapshot: Money,
    /// Resulting allocation status.
    pub status: PaymentItemStatus,
}

/// Result of a successful allocation: the planned payment items and the
/// updated item ledgers, in target-input order.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    /// One planned payment item per target, in sequence order.
    pub allocations: Vec<PlannedAllocation>,
    /// Updated ledgers for every touched invoice item (deduplicated).
    pub updated_items: Vec<ItemLedger>,
    /// Resulting payment status (always `Completed`).
    pub payment_status: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_roundtrip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Processing,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Cancelled,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(PaymentStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_payment_item_status_roundtrip() {
        for status in [
            PaymentItemStatus::Pending,
            PaymentItemStatus::Completed,
            PaymentItemStatus::Cancelled,
            PaymentItemStatus::Refunded,
        ] {
            assert_eq!(PaymentItemStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_derive_all_cancelled() {
        let statuses = [PaymentItemStatus::Cancelled, PaymentItemStatus::Cancelled];
        assert_eq!(PaymentStatus::derive(&statuses), PaymentStatus::Cancelled);
    }

    #[test]
    fn test_derive_all_refunded() {
        let statuses = [PaymentItemStatus::Refunded, PaymentItemStatus::Refunded];
        assert_eq!(PaymentStatus::derive(&statuses), PaymentStatus::Refunded);
    }

    #[test]
    fn test_derive_partial_reversal_stays_completed() {
        let statuses = [PaymentItemStatus::Cancelled, PaymentItemStatus::Completed];
        assert_eq!(PaymentStatus::derive(&statuses), PaymentStatus::Completed);

        // A mix of the two terminal child states also stays Completed.
        let mixed = [PaymentItemStatus::Cancelled, PaymentItemStatus::Refunded];
        assert_eq!(PaymentStatus::derive(&mixed), PaymentStatus::Completed);
    }

    #[test]
    fn test_derive_empty_stays_completed() {
        assert_eq!(PaymentStatus::derive(&[]), PaymentStatus::Completed);
    }

    #[test]
    fn test_is_active() {
        assert!(PaymentItemStatus::Completed.is_active());
        assert!(!PaymentItemStatus::Cancelled.is_active());
        assert!(!PaymentItemStatus::Refunded.is_active());
        assert!(!PaymentItemStatus::Pending.is_active());
    }
}
