//! Allocation error types.

use bursar_shared::types::{InvoiceItemId, Money};
use thiserror::Error;

use crate::invoice::error::LedgerError;

/// Errors raised by the payment allocation engine.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// A payment must target at least one invoice item.
    #[error("Payment allocation requires at least one target")]
    EmptyAllocation,

    /// The target amounts do not sum to the payment amount.
    #[error("Allocated total {allocated} does not match payment amount {payment_amount}")]
    AllocationMismatch {
        /// The payment's total amount.
        payment_amount: Money,
        /// The sum of the requested target amounts.
        allocated: Money,
    },

    /// A single target exceeds the item's balance at its position in the
    /// batch (balances consumed by earlier targets included).
    #[error(
        "Target #{sequence} over-allocates item {item_id}: requested {requested}, available {available}"
    )]
    OverAllocation {
        /// The targeted invoice item.
        item_id: InvoiceItemId,
        /// 1-based position of the failing target.
        sequence: u32,
        /// The requested amount.
        requested: Money,
        /// The balance available at that point in the batch.
        available: Money,
    },

    /// A target references an item the engine was not given.
    #[error("Allocation target references unknown invoice item {0}")]
    UnknownTarget(InvoiceItemId),

    /// An item-level ledger rule rejected the allocation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl AllocationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyAllocation => "EMPTY_ALLOCATION",
            Self::AllocationMismatch { .. } => "ALLOCATION_MISMATCH",
            Self::OverAllocation { .. } => "OVER_ALLOCATION",
            Self::UnknownTarget(_) => "UNKNOWN_TARGET",
            Self::Ledger(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::EmptyAllocation
            | Self::AllocationMismatch { .. }
            | Self::OverAllocation { .. } => 400,
            Self::UnknownTarget(_) => 404,
            Self::Ledger(err) => err.http_status_code(),
        }
    }
}
