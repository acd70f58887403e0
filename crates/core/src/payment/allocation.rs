//! Payment allocation engine.
//!
//! Splits one payment across an ordered list of invoice-item targets as a
//! single all-or-nothing unit. The engine works on cloned ledger state:
//! on any validation failure the caller's view is untouched, so the
//! surrounding transaction can simply abort without compensation.

use std::collections::BTreeMap;

use bursar_shared::types::Money;
use chrono::NaiveDate;

use super::error::AllocationError;
use super::types::{
    AllocationItem, AllocationOutcome, AllocationTarget, PaymentItemStatus, PaymentStatus,
    PlannedAllocation,
};

/// Stateless engine planning the allocation of one payment.
pub struct AllocationEngine;

impl AllocationEngine {
    /// Plans the allocation of `payment_amount` across `targets`.
    ///
    /// Validation and application happen per target in list order
    /// (sequence = 1-based position). Balances consumed by earlier
    /// targets in the same call are visible to later targets, so two
    /// targets on the same item cannot double-spend its balance.
    ///
    /// On success every targeted ledger has the payment applied and the
    /// payment is `Completed`. On failure the input is untouched and no
    /// partial plan is returned.
    ///
    /// # Errors
    ///
    /// - `EmptyAllocation` if `targets` is empty.
    /// - `AllocationMismatch` if the target amounts do not sum to
    ///   `payment_amount`.
    /// - `UnknownTarget` if a target references an item not in `items`.
    /// - `Ledger(InvoiceCancelled)` if a target's invoice is cancelled.
    /// - `OverAllocation` if a target exceeds the balance available at
    ///   its position in the batch.
    pub fn allocate(
        payment_amount: Money,
        targets: &[AllocationTarget],
        items: &[AllocationItem],
        today: NaiveDate,
    ) -> Result<AllocationOutcome, AllocationError> {
        if targets.is_empty() {
            return Err(AllocationError::EmptyAllocation);
        }

        let allocated: Money = targets.iter().map(|t| t.amount).sum();
        if allocated != payment_amount {
            return Err(AllocationError::AllocationMismatch {
                payment_amount,
                allocated,
            });
        }

        // Work on clones so a failure at target N leaves targets 1..N
        // unobservable to the caller.
        let input_order: Vec<_> = items.iter().map(|i| i.ledger.id).collect();
        let mut working: BTreeMap<_, _> = items
            .iter()
            .map(|item| (item.ledger.id, item.clone()))
            .collect();

        let mut allocations = Vec::with_capacity(targets.len());

        for (position, target) in targets.iter().enumerate() {
            let sequence = u32::try_from(position).unwrap_or(u32::MAX).saturating_add(1);
            let item = working
                .get_mut(&target.item_id)
                .ok_or(AllocationError::UnknownTarget(target.item_id))?;

            if item.invoice_cancelled {
                return Err(crate::invoice::error::LedgerError::InvoiceCancelled(
                    item.invoice_id,
                )
                .into());
            }

            if target.amount > item.ledger.balance {
                return Err(AllocationError::OverAllocation {
                    item_id: target.item_id,
                    sequence,
                    requested: target.amount,
                    available: item.ledger.balance,
                });
            }

            let item_amount_snapshot = item.ledger.amount;
            item.ledger
                .apply_payment(target.amount, item.due_date, today)?;

            allocations.push(PlannedAllocation {
                item_id: target.item_id,
                invoice_id: item.invoice_id,
                sequence,
                amount: target.amount,
                item_amount_snapshot,
                status: PaymentItemStatus::Completed,
            });
        }

        let touched: Vec<_> = allocations.iter().map(|a| a.item_id).collect();
        let updated_items = input_order
            .into_iter()
            .filter(|id| touched.contains(id))
            .filter_map(|id| working.remove(&id).map(|item| item.ledger))
            .collect();

        Ok(AllocationOutcome {
            allocations,
            updated_items,
            payment_status: PaymentStatus::Completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::item::ItemLedger;
    use crate::invoice::types::InvoiceItemStatus;
    use bursar_shared::types::{InvoiceId, InvoiceItemId};
    use rust_decimal_macros::dec;

    fn money(d: rust_decimal::Decimal) -> Money {
        Money::new(d)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    fn item(balance: rust_decimal::Decimal) -> AllocationItem {
        AllocationItem {
            invoice_id: InvoiceId::new(),
            due_date: NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
            invoice_cancelled: false,
            ledger: ItemLedger::new(InvoiceItemId::new(), money(balance)),
        }
    }

    fn target(item: &AllocationItem, amount: rust_decimal::Decimal) -> AllocationTarget {
        AllocationTarget {
            item_id: item.ledger.id,
            amount: money(amount),
        }
    }

    #[test]
    fn test_split_payment_across_two_items() {
        // 500 across balances 300 and 300 as [(item1, 300), (item2, 200)]
        let items = [item(dec!(300)), item(dec!(300))];
        let targets = [target(&items[0], dec!(300)), target(&items[1], dec!(200))];

        let outcome =
            AllocationEngine::allocate(money(dec!(500)), &targets, &items, today()).unwrap();

        assert_eq!(outcome.payment_status, PaymentStatus::Completed);
        assert_eq!(outcome.allocations.len(), 2);
        assert_eq!(outcome.allocations[0].sequence, 1);
        assert_eq!(outcome.allocations[1].sequence, 2);

        let first = &outcome.updated_items[0];
        let second = &outcome.updated_items[1];
        assert_eq!(first.balance, Money::ZERO);
        assert_eq!(first.status, InvoiceItemStatus::Paid);
        assert_eq!(second.balance, money(dec!(100)));
        assert_eq!(second.status, InvoiceItemStatus::PartiallyPaid);
    }

    #[test]
    fn test_snapshot_captures_item_amount() {
        let items = [item(dec!(300))];
        let targets = [target(&items[0], dec!(120))];

        let outcome =
            AllocationEngine::allocate(money(dec!(120)), &targets, &items, today()).unwrap();
        assert_eq!(outcome.allocations[0].item_amount_snapshot, money(dec!(300)));
    }

    #[test]
    fn test_mismatched_total_rejected() {
        let items = [item(dec!(300)), item(dec!(300))];
        let targets = [target(&items[0], dec!(300)), target(&items[1], dec!(100))];

        let err =
            AllocationEngine::allocate(money(dec!(500)), &targets, &items, today()).unwrap_err();
        assert!(matches!(err, AllocationError::AllocationMismatch { .. }));
    }

    #[test]
    fn test_empty_targets_rejected() {
        let err = AllocationEngine::allocate(money(dec!(500)), &[], &[], today()).unwrap_err();
        assert!(matches!(err, AllocationError::EmptyAllocation));
    }

    #[test]
    fn test_over_allocation_aborts_whole_batch() {
        // Target 3 of 4 over-allocates; nothing about the input changes.
        let items = [
            item(dec!(100)),
            item(dec!(100)),
            item(dec!(50)),
            item(dec!(100)),
        ];
        let targets = [
            target(&items[0], dec!(100)),
            target(&items[1], dec!(100)),
            target(&items[2], dec!(60)),
            target(&items[3], dec!(40)),
        ];

        let err =
            AllocationEngine::allocate(money(dec!(300)), &targets, &items, today()).unwrap_err();

        match err {
            AllocationError::OverAllocation {
                sequence,
                requested,
                available,
                ..
            } => {
                assert_eq!(sequence, 3);
                assert_eq!(requested, money(dec!(60)));
                assert_eq!(available, money(dec!(50)));
            }
            other => panic!("expected OverAllocation, got {other:?}"),
        }

        // Inputs are untouched: the engine cloned before applying.
        for input in &items {
            assert_eq!(input.ledger.paid, Money::ZERO);
            assert_eq!(input.ledger.balance, input.ledger.amount);
        }
    }

    #[test]
    fn test_same_item_twice_sees_consumed_balance() {
        // Two targets on the same item: the second sees the reduced
        // balance, so together they cannot exceed it.
        let items = [item(dec!(100))];
        let targets = [target(&items[0], dec!(80)), target(&items[0], dec!(30))];

        let err =
            AllocationEngine::allocate(money(dec!(110)), &targets, &items, today()).unwrap_err();

        match err {
            AllocationError::OverAllocation {
                sequence,
                available,
                ..
            } => {
                assert_eq!(sequence, 2);
                assert_eq!(available, money(dec!(20)));
            }
            other => panic!("expected OverAllocation, got {other:?}"),
        }

        // A fitting split on the same item succeeds.
        let targets = [target(&items[0], dec!(80)), target(&items[0], dec!(20))];
        let outcome =
            AllocationEngine::allocate(money(dec!(100)), &targets, &items, today()).unwrap();
        assert_eq!(outcome.updated_items.len(), 1);
        assert_eq!(outcome.updated_items[0].balance, Money::ZERO);
    }

    #[test]
    fn test_cancelled_invoice_rejected() {
        let mut cancelled = item(dec!(300));
        cancelled.invoice_cancelled = true;
        let targets = [target(&cancelled, dec!(100))];
        let items = [cancelled];

        let err =
            AllocationEngine::allocate(money(dec!(100)), &targets, &items, today()).unwrap_err();
        assert_eq!(err.error_code(), "INVOICE_CANCELLED");
    }

    #[test]
    fn test_unknown_target_rejected() {
        let items = [item(dec!(300))];
        let targets = [AllocationTarget {
            item_id: InvoiceItemId::new(),
            amount: money(dec!(300)),
        }];

        let err =
            AllocationEngine::allocate(money(dec!(300)), &targets, &items, today()).unwrap_err();
        assert!(matches!(err, AllocationError::UnknownTarget(_)));
    }

    #[test]
    fn test_zero_amount_target_rejected() {
        let items = [item(dec!(300))];
        let targets = [target(&items[0], dec!(0))];

        let err = AllocationEngine::allocate(Money::ZERO, &targets, &items, today()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ALLOCATION");
    }

    #[test]
    fn test_exact_balance_payment_settles_item() {
        let items = [item(dec!(300))];
        let targets = [target(&items[0], dec!(300))];

        let outcome =
            AllocationEngine::allocate(money(dec!(300)), &targets, &items, today()).unwrap();
        assert_eq!(outcome.updated_items[0].balance, Money::ZERO);
        assert_eq!(outcome.updated_items[0].status, InvoiceItemStatus::Paid);
    }
}
