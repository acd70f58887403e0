//! Reversal error types.

use bursar_shared::types::{Money, PaymentItemId};
use thiserror::Error;

use crate::invoice::error::LedgerError;
use crate::payment::types::PaymentItemStatus;

/// Errors raised by the reversal engine.
#[derive(Debug, Error)]
pub enum ReversalError {
    /// Only completed, unreversed allocations can be cancelled or
    /// refunded.
    #[error("Payment item {payment_item_id} cannot be reversed from status {status}")]
    NotReversible {
        /// The payment item the caller attempted to reverse.
        payment_item_id: PaymentItemId,
        /// Its current status.
        status: PaymentItemStatus,
    },

    /// Refund amount is not positive or exceeds the allocated amount.
    #[error(
        "Refund of {requested} exceeds allocation {allocated} on payment item {payment_item_id}"
    )]
    RefundExceedsPayment {
        /// The payment item the caller attempted to refund.
        payment_item_id: PaymentItemId,
        /// The requested refund amount.
        requested: Money,
        /// The amount originally allocated.
        allocated: Money,
    },

    /// The invoice item ledger rejected the reversal.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ReversalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotReversible { .. } => "NOT_REVERSIBLE",
            Self::RefundExceedsPayment { .. } => "REFUND_EXCEEDS_PAYMENT",
            Self::Ledger(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotReversible { .. } => 409,
            Self::RefundExceedsPayment { .. } => 400,
            Self::Ledger(err) => err.http_status_code(),
        }
    }
}
