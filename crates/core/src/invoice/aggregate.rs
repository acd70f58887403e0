//! Invoice aggregate: derived totals, status, and mutation guards.
//!
//! An invoice's total, paid, waived, and balance amounts are sums over
//! its current items, recomputed rather than stored independently. Status
//! is a pure function of those sums except `Cancelled`, which is set once
//! and is terminal.

use bursar_shared::types::{InvoiceId, Money};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::item::ItemLedger;
use super::types::InvoiceStatus;

/// Derived money totals of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of item amounts.
    pub total: Money,
    /// Sum of item paid amounts.
    pub paid: Money,
    /// Sum of item waived amounts.
    pub waived: Money,
    /// Sum of item balances.
    pub balance: Money,
}

impl InvoiceTotals {
    /// Computes the totals over the invoice's current items.
    #[must_use]
    pub fn from_items(items: &[ItemLedger]) -> Self {
        Self {
            total: items.iter().map(|i| i.amount).sum(),
            paid: items.iter().map(|i| i.paid).sum(),
            waived: items.iter().map(|i| i.waived).sum(),
            balance: items.iter().map(|i| i.balance).sum(),
        }
    }

    /// Derives the invoice status from the totals.
    ///
    /// `Cancelled` overrides everything once set. Otherwise the same
    /// precedence as the item rule applies: zero balance is `Paid` (so a
    /// fully waived invoice reads as settled), an outstanding balance past
    /// the due date is `Overdue`, any settled amount is `PartiallyPaid`.
    #[must_use]
    pub fn status(&self, due_date: NaiveDate, cancelled: bool, today: NaiveDate) -> InvoiceStatus {
        if cancelled {
            InvoiceStatus::Cancelled
        } else if self.balance.is_zero() {
            InvoiceStatus::Paid
        } else if due_date < today {
            InvoiceStatus::Overdue
        } else if (self.paid + self.waived).is_positive() {
            InvoiceStatus::PartiallyPaid
        } else {
            InvoiceStatus::Unpaid
        }
    }
}

/// Rejects mutation of a cancelled invoice.
///
/// # Errors
///
/// Returns `LedgerError::InvoiceCancelled` if the invoice status is
/// terminal.
pub fn ensure_mutable(invoice_id: InvoiceId, status: InvoiceStatus) -> Result<(), LedgerError> {
    if status.is_terminal() {
        return Err(LedgerError::InvoiceCancelled(invoice_id));
    }
    Ok(())
}

/// Rejects cancellation while completed, unreversed payment allocations
/// still reference the invoice's items.
///
/// # Errors
///
/// Returns `LedgerError::HasActivePayments` unless `active_payment_items`
/// is zero.
pub fn ensure_cancellable(
    invoice_id: InvoiceId,
    active_payment_items: usize,
) -> Result<(), LedgerError> {
    if active_payment_items > 0 {
        return Err(LedgerError::HasActivePayments {
            invoice_id,
            active_items: active_payment_items,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::types::InvoiceItemStatus;
    use bursar_shared::types::InvoiceItemId;
    use rust_decimal_macros::dec;

    fn money(d: rust_decimal::Decimal) -> Money {
        Money::new(d)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn items() -> Vec<ItemLedger> {
        let due = date(2026, 4, 30);
        let today = date(2026, 2, 1);
        let mut tuition = ItemLedger::new(InvoiceItemId::new(), money(dec!(1200)));
        tuition.apply_payment(money(dec!(700)), due, today).unwrap();
        let mut transport = ItemLedger::new(InvoiceItemId::new(), money(dec!(300)));
        transport.apply_waiver(money(dec!(300)), due, today).unwrap();
        let library = ItemLedger::new(InvoiceItemId::new(), money(dec!(50)));
        vec![tuition, transport, library]
    }

    #[test]
    fn test_totals_are_sums_over_items() {
        let totals = InvoiceTotals::from_items(&items());
        assert_eq!(totals.total, money(dec!(1550)));
        assert_eq!(totals.paid, money(dec!(700)));
        assert_eq!(totals.waived, money(dec!(300)));
        assert_eq!(totals.balance, money(dec!(550)));
        // total == paid + waived + balance holds at the aggregate level too
        assert_eq!(totals.total, totals.paid + totals.waived + totals.balance);
    }

    #[test]
    fn test_totals_of_empty_invoice_are_zero() {
        let totals = InvoiceTotals::from_items(&[]);
        assert_eq!(totals.total, Money::ZERO);
        assert_eq!(totals.balance, Money::ZERO);
    }

    #[test]
    fn test_status_partially_paid_before_due() {
        let totals = InvoiceTotals::from_items(&items());
        let status = totals.status(date(2026, 4, 30), false, date(2026, 2, 1));
        assert_eq!(status, InvoiceStatus::PartiallyPaid);
    }

    #[test]
    fn test_status_overdue_after_due() {
        let totals = InvoiceTotals::from_items(&items());
        let status = totals.status(date(2026, 4, 30), false, date(2026, 5, 1));
        assert_eq!(status, InvoiceStatus::Overdue);
    }

    #[test]
    fn test_status_paid_when_balance_zero() {
        let due = date(2026, 4, 30);
        let today = date(2026, 2, 1);
        let mut item = ItemLedger::new(InvoiceItemId::new(), money(dec!(100)));
        item.apply_payment(money(dec!(40)), due, today).unwrap();
        item.apply_waiver(money(dec!(60)), due, today).unwrap();
        assert_eq!(item.status, InvoiceItemStatus::Paid);

        let totals = InvoiceTotals::from_items(&[item]);
        // Paid even when observed after the due date.
        let status = totals.status(due, false, date(2026, 6, 1));
        assert_eq!(status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_status_unpaid_when_nothing_settled() {
        let item = ItemLedger::new(InvoiceItemId::new(), money(dec!(100)));
        let totals = InvoiceTotals::from_items(&[item]);
        let status = totals.status(date(2026, 4, 30), false, date(2026, 2, 1));
        assert_eq!(status, InvoiceStatus::Unpaid);
    }

    #[test]
    fn test_cancelled_overrides_everything() {
        let totals = InvoiceTotals::from_items(&items());
        let status = totals.status(date(2026, 4, 30), true, date(2026, 2, 1));
        assert_eq!(status, InvoiceStatus::Cancelled);
    }

    #[test]
    fn test_status_is_idempotent() {
        let totals = InvoiceTotals::from_items(&items());
        let first = totals.status(date(2026, 4, 30), false, date(2026, 5, 1));
        let second = totals.status(date(2026, 4, 30), false, date(2026, 5, 1));
        assert_eq!(first, second);
    }

    #[test]
    fn test_ensure_mutable() {
        let invoice_id = InvoiceId::new();
        assert!(ensure_mutable(invoice_id, InvoiceStatus::PartiallyPaid).is_ok());
        assert!(matches!(
            ensure_mutable(invoice_id, InvoiceStatus::Cancelled),
            Err(LedgerError::InvoiceCancelled(_))
        ));
    }

    #[test]
    fn test_ensure_cancellable() {
        let invoice_id = InvoiceId::new();
        assert!(ensure_cancellable(invoice_id, 0).is_ok());
        assert!(matches!(
            ensure_cancellable(invoice_id, 2),
            Err(LedgerError::HasActivePayments { active_items: 2, .. })
        ));
    }
}
