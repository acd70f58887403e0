//! Reversal service for cancelling and refunding payment allocations.
//!
//! Both operations require the payment item to currently be completed,
//! reverse the allocation on the invoice item ledger, and re-derive the
//! parent payment's status from the statuses of all its items. The
//! service works on a cloned ledger so a rejected reversal leaves the
//! caller's state untouched.

use chrono::{DateTime, Utc};

use bursar_shared::types::Money;

use super::error::ReversalError;
use super::types::{PaymentItemState, RefundRecord, ReversalOutcome};
use crate::invoice::item::ItemLedger;
use crate::payment::types::{PaymentItemStatus, PaymentStatus};

/// Stateless service executing reversals.
pub struct ReversalService;

impl ReversalService {
    /// Cancels a payment allocation in full.
    ///
    /// Reverses the entire allocated amount on the invoice item. The
    /// parent payment cascades to `Cancelled` only if every one of its
    /// items (the given siblings plus this one) is then cancelled.
    ///
    /// `sibling_statuses` are the statuses of the parent payment's other
    /// items, excluding the one being cancelled.
    ///
    /// # Errors
    ///
    /// - `NotReversible` if the payment item is not currently completed.
    /// - `Ledger(InvalidReversal)` if the item ledger cannot absorb the
    ///   reversal.
    pub fn cancel(
        item: &PaymentItemState,
        sibling_statuses: &[PaymentItemStatus],
        ledger: &ItemLedger,
        due_date: chrono::NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<ReversalOutcome, ReversalError> {
        Self::ensure_reversible(item)?;

        let mut ledger = ledger.clone();
        ledger.reverse_payment(item.amount, due_date, now.date_naive())?;

        let payment_status = Self::cascade(sibling_statuses, PaymentItemStatus::Cancelled);

        Ok(ReversalOutcome {
            item_status: PaymentItemStatus::Cancelled,
            payment_status,
            ledger,
            refund: None,
        })
    }

    /// Refunds a payment allocation, fully or partially.
    ///
    /// Requires `0 < amount <= item.amount`. Restores `amount` to the
    /// invoice item's balance and records the refund. The parent payment
    /// cascades to `Refunded` only when every one of its items is
    /// refunded.
    ///
    /// # Errors
    ///
    /// - `NotReversible` if the payment item is not currently completed.
    /// - `RefundExceedsPayment` if the amount is not positive or exceeds
    ///   the allocation.
    /// - `Ledger(InvalidReversal)` if the item ledger cannot absorb the
    ///   reversal.
    pub fn refund(
        item: &PaymentItemState,
        amount: Money,
        sibling_statuses: &[PaymentItemStatus],
        ledger: &ItemLedger,
        due_date: chrono::NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<ReversalOutcome, ReversalError> {
        Self::ensure_reversible(item)?;

        if !amount.is_positive() || amount > item.amount {
            return Err(ReversalError::RefundExceedsPayment {
                payment_item_id: item.id,
                requested: amount,
                allocated: item.amount,
            });
        }

        let mut ledger = ledger.clone();
        ledger.reverse_payment(amount, due_date, now.date_naive())?;

        let payment_status = Self::cascade(sibling_statuses, PaymentItemStatus::Refunded);

        Ok(ReversalOutcome {
            item_status: PaymentItemStatus::Refunded,
            payment_status,
            ledger,
            refund: Some(RefundRecord {
                amount,
                refunded_at: now,
            }),
        })
    }

    fn ensure_reversible(item: &PaymentItemState) -> Result<(), ReversalError> {
        if item.status != PaymentItemStatus::Completed {
            return Err(ReversalError::NotReversible {
                payment_item_id: item.id,
                status: item.status,
            });
        }
        Ok(())
    }

    /// Derives the parent payment status after this item transitions.
    fn cascade(
        sibling_statuses: &[PaymentItemStatus],
        new_status: PaymentItemStatus,
    ) -> PaymentStatus {
        let mut statuses = Vec::with_capacity(sibling_statuses.len() + 1);
        statuses.extend_from_slice(sibling_statuses);
        statuses.push(new_status);
        PaymentStatus::derive(&statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bursar_shared::types::{InvoiceItemId, PaymentId, PaymentItemId};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn money(d: rust_decimal::Decimal) -> Money {
        Money::new(d)
    }

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 30).unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2026-02-01T10:00:00Z".parse().unwrap()
    }

    fn completed_item(amount: rust_decimal::Decimal) -> PaymentItemState {
        PaymentItemState {
            id: PaymentItemId::new(),
            payment_id: PaymentId::new(),
            invoice_item_id: InvoiceItemId::new(),
            amount: money(amount),
            status: PaymentItemStatus::Completed,
        }
    }

    /// An item ledger that already absorbed the given payment.
    fn paid_ledger(
        item: &PaymentItemState,
        amount: rust_decimal::Decimal,
        paid: rust_decimal::Decimal,
    ) -> ItemLedger {
        let mut ledger = ItemLedger::new(item.invoice_item_id, money(amount));
        ledger
            .apply_payment(money(paid), due(), now().date_naive())
            .unwrap();
        ledger
    }

    #[test]
    fn test_cancel_restores_item_balance() {
        // Payment of 500 split 300/200; cancelling the 300 allocation
        // restores that item to its full balance while the payment stays
        // completed (the 200 allocation is still active).
        let item = completed_item(dec!(300));
        let ledger = paid_ledger(&item, dec!(300), dec!(300));

        let outcome = ReversalService::cancel(
            &item,
            &[PaymentItemStatus::Completed],
            &ledger,
            due(),
            now(),
        )
        .unwrap();

        assert_eq!(outcome.item_status, PaymentItemStatus::Cancelled);
        assert_eq!(outcome.payment_status, PaymentStatus::Completed);
        assert_eq!(outcome.ledger.balance, money(dec!(300)));
        assert_eq!(outcome.ledger.paid, Money::ZERO);
        assert!(outcome.refund.is_none());
    }

    #[test]
    fn test_cancel_last_item_cascades_payment() {
        let item = completed_item(dec!(200));
        let ledger = paid_ledger(&item, dec!(200), dec!(200));

        let outcome = ReversalService::cancel(
            &item,
            &[PaymentItemStatus::Cancelled],
            &ledger,
            due(),
            now(),
        )
        .unwrap();

        assert_eq!(outcome.payment_status, PaymentStatus::Cancelled);
    }

    #[test]
    fn test_cancel_single_item_payment_cascades() {
        let item = completed_item(dec!(150));
        let ledger = paid_ledger(&item, dec!(150), dec!(150));

        let outcome = ReversalService::cancel(&item, &[], &ledger, due(), now()).unwrap();
        assert_eq!(outcome.payment_status, PaymentStatus::Cancelled);
    }

    #[test]
    fn test_cancel_rejected_unless_completed() {
        let mut item = completed_item(dec!(300));
        item.status = PaymentItemStatus::Cancelled;
        let ledger = ItemLedger::new(item.invoice_item_id, money(dec!(300)));

        let err = ReversalService::cancel(&item, &[], &ledger, due(), now()).unwrap_err();
        assert!(matches!(err, ReversalError::NotReversible { .. }));
    }

    #[test]
    fn test_full_refund() {
        let item = completed_item(dec!(400));
        let ledger = paid_ledger(&item, dec!(1000), dec!(400));

        let outcome = ReversalService::refund(
            &item,
            money(dec!(400)),
            &[],
            &ledger,
            due(),
            now(),
        )
        .unwrap();

        assert_eq!(outcome.item_status, PaymentItemStatus::Refunded);
        assert_eq!(outcome.payment_status, PaymentStatus::Refunded);
        assert_eq!(outcome.ledger.balance, money(dec!(1000)));
        let refund = outcome.refund.unwrap();
        assert_eq!(refund.amount, money(dec!(400)));
        assert_eq!(refund.refunded_at, now());
    }

    #[test]
    fn test_partial_refund() {
        let item = completed_item(dec!(400));
        let ledger = paid_ledger(&item, dec!(1000), dec!(400));

        let outcome = ReversalService::refund(
            &item,
            money(dec!(150)),
            &[PaymentItemStatus::Completed],
            &ledger,
            due(),
            now(),
        )
        .unwrap();

        assert_eq!(outcome.item_status, PaymentItemStatus::Refunded);
        // A sibling is still active, so the payment stays completed.
        assert_eq!(outcome.payment_status, PaymentStatus::Completed);
        assert_eq!(outcome.ledger.paid, money(dec!(250)));
        assert_eq!(outcome.ledger.balance, money(dec!(750)));
        assert_eq!(outcome.refund.unwrap().amount, money(dec!(150)));
    }

    #[test]
    fn test_refund_cascades_when_all_refunded() {
        let item = completed_item(dec!(100));
        let ledger = paid_ledger(&item, dec!(100), dec!(100));

        let outcome = ReversalService::refund(
            &item,
            money(dec!(100)),
            &[PaymentItemStatus::Refunded, PaymentItemStatus::Refunded],
            &ledger,
            due(),
            now(),
        )
        .unwrap();

        assert_eq!(outcome.payment_status, PaymentStatus::Refunded);
    }

    #[test]
    fn test_refund_exceeding_allocation_rejected() {
        let item = completed_item(dec!(400));
        let ledger = paid_ledger(&item, dec!(1000), dec!(400));

        let err = ReversalService::refund(
            &item,
            money(dec!(400.01)),
            &[],
            &ledger,
            due(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, ReversalError::RefundExceedsPayment { .. }));
    }

    #[test]
    fn test_zero_refund_rejected() {
        let item = completed_item(dec!(400));
        let ledger = paid_ledger(&item, dec!(1000), dec!(400));

        let err =
            ReversalService::refund(&item, Money::ZERO, &[], &ledger, due(), now()).unwrap_err();
        assert!(matches!(err, ReversalError::RefundExceedsPayment { .. }));
    }

    #[test]
    fn test_cancel_then_reapply_round_trip() {
        // Reversing and re-allocating the same amount lands the ledger
        // exactly where it started.
        let item = completed_item(dec!(250));
        let ledger = paid_ledger(&item, dec!(600), dec!(250));
        let before = ledger.clone();

        let outcome = ReversalService::cancel(&item, &[], &ledger, due(), now()).unwrap();
        let mut restored = outcome.ledger;
        restored
            .apply_payment(money(dec!(250)), due(), now().date_naive())
            .unwrap();

        assert_eq!(restored, before);
    }
}
