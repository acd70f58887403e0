//! Money type with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` with a fixed two-decimal scale.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A monetary amount with two decimal places.
///
/// All fee amounts, payments, waivers and balances in the ledger use this
/// type. Construction rounds to two decimal places using banker's rounding
/// (`MidpointNearestEven`), so sums of `Money` values never accumulate
/// sub-cent residue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Decimal places carried by every amount.
    pub const SCALE: u32 = 2;

    /// Creates a Money value, rounding to two decimal places.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        let mut rounded =
            amount.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointNearestEven);
        rounded.rescale(Self::SCALE);
        Self(rounded)
    }

    /// Creates a Money value from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self::new(Decimal::new(units, 0))
    }

    /// Returns the inner decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Subtracts `other`, returning `None` if the result would be negative.
    ///
    /// Ledger fields (paid, waived, balance) are never negative; callers
    /// use this when a plain `-` would need a separate bounds check.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        if other.0 > self.0 {
            None
        } else {
            Some(Self(self.0 - other.0))
        }
    }

    /// Returns the smaller of two amounts.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut amount = self.0;
        amount.rescale(Self::SCALE);
        write!(f, "{amount}")
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_new_rounds_to_two_places() {
        assert_eq!(Money::new(dec!(10.005)).amount(), dec!(10.00));
        assert_eq!(Money::new(dec!(10.015)).amount(), dec!(10.02));
        assert_eq!(Money::new(dec!(10.014)).amount(), dec!(10.01));
    }

    #[test]
    fn test_money_zero() {
        assert!(Money::ZERO.is_zero());
        assert!(!Money::ZERO.is_positive());
        assert!(!Money::ZERO.is_negative());
    }

    #[test]
    fn test_money_from_units() {
        assert_eq!(Money::from_units(1000).amount(), dec!(1000));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(100.50));
        let b = Money::new(dec!(25.25));
        assert_eq!(a + b, Money::new(dec!(125.75)));
        assert_eq!(a - b, Money::new(dec!(75.25)));

        let mut c = a;
        c += b;
        assert_eq!(c, Money::new(dec!(125.75)));
        c -= b;
        assert_eq!(c, a);
    }

    #[test]
    fn test_money_checked_sub() {
        let a = Money::new(dec!(50));
        let b = Money::new(dec!(30));
        assert_eq!(a.checked_sub(b), Some(Money::new(dec!(20))));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(a.checked_sub(a), Some(Money::ZERO));
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [dec!(10.10), dec!(20.20), dec!(30.30)]
            .into_iter()
            .map(Money::new)
            .sum();
        assert_eq!(total, Money::new(dec!(60.60)));
    }

    #[test]
    fn test_money_min() {
        let a = Money::new(dec!(50));
        let b = Money::new(dec!(30));
        assert_eq!(a.min(b), b);
        assert_eq!(b.min(a), b);
    }

    #[test]
    fn test_money_ordering() {
        assert!(Money::new(dec!(10)) < Money::new(dec!(20)));
        assert!(Money::new(dec!(20.00)) == Money::new(dec!(20)));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(dec!(1234.5)).to_string(), "1234.50");
    }
}
