//! Property-based tests for the invoice item ledger.
//!
//! Exercises the three-way invariant, payment round-trips, and status
//! idempotence over generated operation sequences.

use bursar_shared::types::{InvoiceItemId, Money};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::item::ItemLedger;
use super::types::InvoiceItemStatus;

fn due() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 4, 30).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
}

/// Strategy for generating positive cent amounts up to 1,000,000.00.
fn amount_strategy() -> impl Strategy<Value = Money> {
    (1i64..100_000_000i64).prop_map(|cents| Money::new(Decimal::new(cents, 2)))
}

/// One generated ledger operation.
#[derive(Debug, Clone)]
enum Op {
    Pay(Money),
    Waive(Money),
    ReversePay(Money),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        amount_strategy().prop_map(Op::Pay),
        amount_strategy().prop_map(Op::Waive),
        amount_strategy().prop_map(Op::ReversePay),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any sequence of operations (accepted or rejected), the ledger
    /// always satisfies `amount = paid + waived + balance` with all
    /// quantities non-negative.
    #[test]
    fn prop_invariant_holds_under_any_operation_sequence(
        amount in amount_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut item = ItemLedger::new(InvoiceItemId::new(), amount);

        for op in ops {
            // Rejected operations must leave the ledger untouched; either
            // way the invariant holds afterwards.
            let before = item.clone();
            let rejected = match op {
                Op::Pay(m) => item.apply_payment(m, due(), today()).is_err(),
                Op::Waive(m) => item.apply_waiver(m, due(), today()).is_err(),
                Op::ReversePay(m) => item.reverse_payment(m, due(), today()).is_err(),
            };
            if rejected {
                prop_assert_eq!(&item, &before, "rejected op must not mutate");
            }
            prop_assert!(item.is_consistent());
            prop_assert!(!item.balance.is_negative());
        }
    }

    /// `apply_payment(x)` followed by `reverse_payment(x)` restores the
    /// exact prior (paid, balance) pair.
    #[test]
    fn prop_payment_reversal_round_trip(
        amount in amount_strategy(),
        fraction in 1u32..=100u32,
    ) {
        let mut item = ItemLedger::new(InvoiceItemId::new(), amount);
        let payment = Money::new(
            amount.amount() * Decimal::from(fraction) / Decimal::from(100u32),
        );
        prop_assume!(payment.is_positive() && payment <= item.balance);

        let paid_before = item.paid;
        let balance_before = item.balance;

        item.apply_payment(payment, due(), today()).unwrap();
        item.reverse_payment(payment, due(), today()).unwrap();

        prop_assert_eq!(item.paid, paid_before);
        prop_assert_eq!(item.balance, balance_before);
    }

    /// Status derivation is idempotent: recomputing from the same
    /// quantities never changes the answer.
    #[test]
    fn prop_status_recompute_is_idempotent(
        amount in amount_strategy(),
        payment in amount_strategy(),
    ) {
        let mut item = ItemLedger::new(InvoiceItemId::new(), amount);
        let _ = item.apply_payment(payment.min(item.balance), due(), today());

        let first = item.status;
        item.recompute_status(due(), today());
        prop_assert_eq!(item.status, first);
        item.recompute_status(due(), today());
        prop_assert_eq!(item.status, first);
    }

    /// A payment of the exact balance always lands on Paid with a zero
    /// balance; no negative balance is ever observable.
    #[test]
    fn prop_exact_balance_payment_settles(amount in amount_strategy()) {
        let mut item = ItemLedger::new(InvoiceItemId::new(), amount);
        item.apply_payment(item.balance, due(), today()).unwrap();

        prop_assert_eq!(item.balance, Money::ZERO);
        prop_assert_eq!(item.status, InvoiceItemStatus::Paid);
    }

    /// Settled amount never exceeds the original amount, whatever mix of
    /// payments and waivers is applied.
    #[test]
    fn prop_settled_never_exceeds_amount(
        amount in amount_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut item = ItemLedger::new(InvoiceItemId::new(), amount);
        for op in ops {
            let _ = match op {
                Op::Pay(m) => item.apply_payment(m, due(), today()).map(|_| ()),
                Op::Waive(m) => item.apply_waiver(m, due(), today()),
                Op::ReversePay(m) => item.reverse_payment(m, due(), today()),
            };
        }
        prop_assert!(item.settled() <= item.amount);
    }
}
