//! Status types for invoices and invoice items.
//!
//! Both statuses are pure functions of the underlying ledger quantities
//! and are never set directly by callers, with the single exception of
//! invoice cancellation which is terminal.

use bursar_shared::types::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment status of a single invoice item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceItemStatus {
    /// Nothing has been paid or waived against the item.
    Unpaid,
    /// Some amount is settled but a balance remains.
    PartiallyPaid,
    /// The balance is fully settled (paid and/or waived).
    Paid,
    /// A balance remains past the invoice due date.
    Overdue,
}

impl InvoiceItemStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unpaid" => Some(Self::Unpaid),
            "partially_paid" => Some(Self::PartiallyPaid),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }

    /// Derives the status from the item's ledger quantities.
    ///
    /// Pure and idempotent: the same inputs always yield the same status.
    /// Precedence: `Paid` (zero balance) beats everything; an outstanding
    /// balance past the due date is `Overdue` regardless of partial
    /// settlement; otherwise any settled amount means `PartiallyPaid`.
    #[must_use]
    pub fn derive(
        paid: Money,
        waived: Money,
        balance: Money,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        if balance.is_zero() {
            Self::Paid
        } else if due_date < today {
            Self::Overdue
        } else if (paid + waived).is_positive() {
            Self::PartiallyPaid
        } else {
            Self::Unpaid
        }
    }
}

impl fmt::Display for InvoiceItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of an invoice as a whole.
///
/// Derived from the item ledgers except for `Cancelled`, which is set
/// once by an explicit cancellation and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// No item has any settled amount.
    Unpaid,
    /// Some amount is settled but a balance remains.
    PartiallyPaid,
    /// Every item balance is zero.
    Paid,
    /// A balance remains past the due date.
    Overdue,
    /// The invoice was cancelled; no further mutation is permitted.
    Cancelled,
}

impl InvoiceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unpaid" => Some(Self::Unpaid),
            "partially_paid" => Some(Self::PartiallyPaid),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further financial mutation is permitted.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
