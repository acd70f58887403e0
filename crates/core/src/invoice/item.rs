//! Invoice item ledger: per-line bookkeeping of paid, waived, and balance.
//!
//! Every fee line satisfies `amount = paid + waived + balance` with all
//! four quantities non-negative, at all times. Mutations validate against
//! the instantaneous balance and recompute the status afterwards; callers
//! never set the status directly.

use bursar_shared::types::{InvoiceItemId, Money};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::types::InvoiceItemStatus;

/// The ledger state of one invoice item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLedger {
    /// The invoice item this ledger belongs to.
    pub id: InvoiceItemId,
    /// Original fee amount, fixed at invoice creation.
    pub amount: Money,
    /// Total paid against the item.
    pub paid: Money,
    /// Total waived against the item.
    pub waived: Money,
    /// Outstanding balance.
    pub balance: Money,
    /// Derived payment status.
    pub status: InvoiceItemStatus,
}

impl ItemLedger {
    /// Creates a fresh ledger for a newly issued fee line.
    ///
    /// `amount` must be non-negative; the full amount starts as balance.
    #[must_use]
    pub fn new(id: InvoiceItemId, amount: Money) -> Self {
        Self {
            id,
            amount,
            paid: Money::ZERO,
            waived: Money::ZERO,
            balance: amount,
            status: InvoiceItemStatus::Unpaid,
        }
    }

    /// Creates a ledger for a carried-forward line: the unpaid balance of
    /// a previous term's item becomes this line's full obligation.
    #[must_use]
    pub fn carried_forward(id: InvoiceItemId, balance: Money) -> Self {
        Self::new(id, balance)
    }

    /// Rehydrates a ledger from stored quantities, verifying the
    /// three-way invariant.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Inconsistent` if the stored quantities do not
    /// satisfy `amount = paid + waived + balance` or any is negative.
    pub fn from_parts(
        id: InvoiceItemId,
        amount: Money,
        paid: Money,
        waived: Money,
        balance: Money,
        status: InvoiceItemStatus,
    ) -> Result<Self, LedgerError> {
        let consistent = amount == paid + waived + balance
            && !amount.is_negative()
            && !paid.is_negative()
            && !waived.is_negative()
            && !balance.is_negative();
        if !consistent {
            return Err(LedgerError::Inconsistent {
                item_id: id,
                amount,
                paid,
                waived,
                balance,
            });
        }
        Ok(Self {
            id,
            amount,
            paid,
            waived,
            balance,
            status,
        })
    }

    /// Total settled against the item (paid plus waived).
    #[must_use]
    pub fn settled(&self) -> Money {
        self.paid + self.waived
    }

    /// Returns true if the ledger satisfies its invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.amount == self.paid + self.waived + self.balance
            && !self.paid.is_negative()
            && !self.waived.is_negative()
            && !self.balance.is_negative()
    }

    /// Applies a payment to the item.
    ///
    /// Requires `0 < amount <= balance`; callers clamp before calling,
    /// this operation never does. Returns the amount applied, which is
    /// always equal to the request.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidAllocation` if the amount is not
    /// positive or exceeds the current balance.
    pub fn apply_payment(
        &mut self,
        amount: Money,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Money, LedgerError> {
        if !amount.is_positive() || amount > self.balance {
            return Err(LedgerError::InvalidAllocation {
                item_id: self.id,
                requested: amount,
                balance: self.balance,
            });
        }
        self.paid += amount;
        self.balance -= amount;
        self.recompute_status(due_date, today);
        Ok(amount)
    }

    /// Applies an administrative waiver to the item.
    ///
    /// Same bounds as a payment: `0 < amount <= balance`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidAllocation` if the amount is not
    /// positive or exceeds the current balance.
    pub fn apply_waiver(
        &mut self,
        amount: Money,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(), LedgerError> {
        if !amount.is_positive() || amount > self.balance {
            return Err(LedgerError::InvalidAllocation {
                item_id: self.id,
                requested: amount,
                balance: self.balance,
            });
        }
        self.waived += amount;
        self.balance -= amount;
        self.recompute_status(due_date, today);
        Ok(())
    }

    /// Reverses a prior payment, restoring balance.
    ///
    /// Exact inverse of `apply_payment`: requires `0 < amount <= paid`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidReversal` if the amount would drive
    /// the paid total negative.
    pub fn reverse_payment(
        &mut self,
        amount: Money,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(), LedgerError> {
        if !amount.is_positive() || amount > self.paid {
            return Err(LedgerError::InvalidReversal {
                item_id: self.id,
                requested: amount,
                available: self.paid,
            });
        }
        self.paid -= amount;
        self.balance += amount;
        self.recompute_status(due_date, today);
        Ok(())
    }

    /// Reverses a prior waiver, restoring balance.
    ///
    /// Requires `0 < amount <= waived`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidReversal` if the amount would drive
    /// the waived total negative.
    pub fn reverse_waiver(
        &mut self,
        amount: Money,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(), LedgerError> {
        if !amount.is_positive() || amount > self.waived {
            return Err(LedgerError::InvalidReversal {
                item_id: self.id,
                requested: amount,
                available: self.waived,
            });
        }
        self.waived -= amount;
        self.balance += amount;
        self.recompute_status(due_date, today);
        Ok(())
    }

    /// Recomputes the derived status from the current quantities.
    ///
    /// Idempotent; called after every mutation.
    pub fn recompute_status(&mut self, due_date: NaiveDate, today: NaiveDate) {
        self.status =
            InvoiceItemStatus::derive(self.paid, self.waived, self.balance, due_date, today);
    }
}
