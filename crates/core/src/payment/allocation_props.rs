//! Property-based tests for the payment allocation engine.

use bursar_shared::types::{InvoiceId, InvoiceItemId, Money};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::allocation::AllocationEngine;
use super::types::{AllocationItem, AllocationTarget, PaymentStatus};
use crate::invoice::item::ItemLedger;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
}

fn due() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 4, 30).unwrap()
}

fn cents(n: i64) -> Money {
    Money::new(Decimal::new(n, 2))
}

/// Strategy: a batch of item balances and, per item, a requested cent
/// amount between 1 and that balance.
fn fitting_batch_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec(
        (100i64..10_000_000i64).prop_flat_map(|balance| (Just(balance), 1i64..=balance)),
        1..8,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A batch where every target fits its item's balance always
    /// allocates in full: every ledger stays consistent, the allocated
    /// sum equals the payment amount, and sequences are contiguous.
    #[test]
    fn prop_fitting_batch_allocates_in_full(batch in fitting_batch_strategy()) {
        let items: Vec<AllocationItem> = batch
            .iter()
            .map(|(balance, _)| AllocationItem {
                invoice_id: InvoiceId::new(),
                due_date: due(),
                invoice_cancelled: false,
                ledger: ItemLedger::new(InvoiceItemId::new(), cents(*balance)),
            })
            .collect();
        let targets: Vec<AllocationTarget> = items
            .iter()
            .zip(batch.iter())
            .map(|(item, (_, requested))| AllocationTarget {
                item_id: item.ledger.id,
                amount: cents(*requested),
            })
            .collect();
        let payment_amount: Money = targets.iter().map(|t| t.amount).sum();

        let outcome =
            AllocationEngine::allocate(payment_amount, &targets, &items, today()).unwrap();

        prop_assert_eq!(outcome.payment_status, PaymentStatus::Completed);
        prop_assert_eq!(outcome.allocations.len(), targets.len());

        let allocated: Money = outcome.allocations.iter().map(|a| a.amount).sum();
        prop_assert_eq!(allocated, payment_amount);

        for (position, allocation) in outcome.allocations.iter().enumerate() {
            prop_assert_eq!(allocation.sequence as usize, position + 1);
        }
        for ledger in &outcome.updated_items {
            prop_assert!(ledger.is_consistent());
            prop_assert!(!ledger.balance.is_negative());
        }
    }

    /// A mismatched payment total is always rejected, whatever the batch
    /// looks like.
    #[test]
    fn prop_mismatch_always_rejected(
        batch in fitting_batch_strategy(),
        off_by in 1i64..10_000i64,
    ) {
        let items: Vec<AllocationItem> = batch
            .iter()
            .map(|(balance, _)| AllocationItem {
                invoice_id: InvoiceId::new(),
                due_date: due(),
                invoice_cancelled: false,
                ledger: ItemLedger::new(InvoiceItemId::new(), cents(*balance)),
            })
            .collect();
        let targets: Vec<AllocationTarget> = items
            .iter()
            .zip(batch.iter())
            .map(|(item, (_, requested))| AllocationTarget {
                item_id: item.ledger.id,
                amount: cents(*requested),
            })
            .collect();
        let correct: Money = targets.iter().map(|t| t.amount).sum();
        let wrong = correct + cents(off_by);

        let err = AllocationEngine::allocate(wrong, &targets, &items, today()).unwrap_err();
        prop_assert_eq!(err.error_code(), "ALLOCATION_MISMATCH");
    }

    /// Whatever the outcome, the engine never mutates its inputs: failed
    /// calls leave every item exactly as given.
    #[test]
    fn prop_failed_allocation_leaves_inputs_untouched(
        balance in 100i64..1_000_000i64,
        excess in 1i64..1_000i64,
    ) {
        let items = [AllocationItem {
            invoice_id: InvoiceId::new(),
            due_date: due(),
            invoice_cancelled: false,
            ledger: ItemLedger::new(InvoiceItemId::new(), cents(balance)),
        }];
        let targets = [AllocationTarget {
            item_id: items[0].ledger.id,
            amount: cents(balance + excess),
        }];

        let before = items[0].ledger.clone();
        let result =
            AllocationEngine::allocate(cents(balance + excess), &targets, &items, today());

        prop_assert!(result.is_err());
        prop_assert_eq!(&items[0].ledger, &before);
    }
}
