//! Ledger error types for item and invoice mutations.
//!
//! Every error carries enough context (entity id, attempted amount,
//! current balance) for the caller to report a precise message.

use bursar_shared::types::{InvoiceId, InvoiceItemId, Money};
use thiserror::Error;

/// Errors raised by the invoice item ledger and invoice aggregate.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Allocation amount is not positive or exceeds the item balance.
    #[error(
        "Invalid allocation of {requested} against item {item_id}: current balance is {balance}"
    )]
    InvalidAllocation {
        /// The targeted invoice item.
        item_id: InvoiceItemId,
        /// The amount the caller attempted to allocate.
        requested: Money,
        /// The item balance at the time of the attempt.
        balance: Money,
    },

    /// Reversal amount is not positive or exceeds the settled amount.
    #[error(
        "Invalid reversal of {requested} against item {item_id}: only {available} can be reversed"
    )]
    InvalidReversal {
        /// The targeted invoice item.
        item_id: InvoiceItemId,
        /// The amount the caller attempted to reverse.
        requested: Money,
        /// The amount currently available for reversal.
        available: Money,
    },

    /// Mutation attempted on a cancelled invoice.
    #[error("Invoice {0} is cancelled; no further allocation is permitted")]
    InvoiceCancelled(InvoiceId),

    /// Cancellation attempted while unreversed payments exist.
    #[error(
        "Invoice {invoice_id} has {active_items} active payment allocation(s); refund them first"
    )]
    HasActivePayments {
        /// The invoice the caller attempted to cancel.
        invoice_id: InvoiceId,
        /// Number of completed, unreversed payment items.
        active_items: usize,
    },

    /// Stored ledger quantities violate `amount = paid + waived + balance`.
    #[error(
        "Ledger for item {item_id} is inconsistent: amount {amount} != paid {paid} + waived {waived} + balance {balance}"
    )]
    Inconsistent {
        /// The corrupt invoice item.
        item_id: InvoiceItemId,
        /// Original fee amount.
        amount: Money,
        /// Paid amount on record.
        paid: Money,
        /// Waived amount on record.
        waived: Money,
        /// Balance on record.
        balance: Money,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAllocation { .. } => "INVALID_ALLOCATION",
            Self::InvalidReversal { .. } => "INVALID_REVERSAL",
            Self::InvoiceCancelled(_) => "INVOICE_CANCELLED",
            Self::HasActivePayments { .. } => "HAS_ACTIVE_PAYMENTS",
            Self::Inconsistent { .. } => "LEDGER_INCONSISTENT",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidAllocation { .. } | Self::InvalidReversal { .. } => 400,
            Self::InvoiceCancelled(_) | Self::HasActivePayments { .. } => 409,
            Self::Inconsistent { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        let err = LedgerError::InvalidAllocation {
            item_id: InvoiceItemId::new(),
            requested: Money::new(dec!(500)),
            balance: Money::new(dec!(100)),
        };
        assert_eq!(err.error_code(), "INVALID_ALLOCATION");
        assert_eq!(err.http_status_code(), 400);

        let err = LedgerError::InvoiceCancelled(InvoiceId::new());
        assert_eq!(err.error_code(), "INVOICE_CANCELLED");
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_error_display_includes_amounts() {
        let item_id = InvoiceItemId::new();
        let err = LedgerError::InvalidAllocation {
            item_id,
            requested: Money::new(dec!(500)),
            balance: Money::new(dec!(100.50)),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("100.50"));
        assert!(msg.contains(&item_id.to_string()));
    }

    #[test]
    fn test_has_active_payments_display() {
        let err = LedgerError::HasActivePayments {
            invoice_id: InvoiceId::new(),
            active_items: 3,
        };
        assert!(err.to_string().contains("3 active payment allocation(s)"));
        assert_eq!(err.error_code(), "HAS_ACTIVE_PAYMENTS");
    }
}
