//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored in the store currency's standard unit (pounds, not
//! pence). The store trades in a single currency, so [`Price`] carries only the
//! amount and [`CurrencyCode`] is applied at display time.

use std::iter::Sum;
use std::ops::{Add, Sub};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A non-negative monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of minor units (e.g. pence).
    #[must_use]
    pub fn from_minor(units: i64) -> Self {
        Self(Decimal::new(units, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Whether the amount is negative.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Multiply by an item quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// The given percentage of this price, rounded to two decimal places.
    #[must_use]
    pub fn percent(self, percent: u8) -> Self {
        let share = self.0 * Decimal::from(percent) / Decimal::ONE_HUNDRED;
        Self(share.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Percentage saved against an original (pre-discount) price.
    ///
    /// Returns `None` when there is no original price or the original is not
    /// higher than this price. The result is rounded to the nearest whole
    /// percent.
    #[must_use]
    pub fn discount_percent(self, original: Option<Self>) -> Option<u8> {
        let original = original?;
        if original.0 <= self.0 || original.0.is_zero() {
            return None;
        }
        let saved = (original.0 - self.0) / original.0 * Decimal::ONE_HUNDRED;
        saved
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u8()
    }

    /// Format for display (e.g. "£19.99").
    #[must_use]
    pub fn display(self, currency: CurrencyCode) -> String {
        format!("{}{:.2}", currency.symbol(), self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

/// ISO 4217 currency codes the store can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    GBP,
    EUR,
    USD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::GBP => "£",
            Self::EUR => "€",
            Self::USD => "$",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_percent() {
        let price = Price::from_minor(7_500);
        assert_eq!(price.discount_percent(Some(Price::from_minor(10_000))), Some(25));
        assert_eq!(price.discount_percent(Some(Price::from_minor(7_500))), None);
        assert_eq!(price.discount_percent(Some(Price::from_minor(5_000))), None);
        assert_eq!(price.discount_percent(None), None);
        // 1 - 20/30 = 33.33..%
        assert_eq!(
            Price::from_minor(2_000).discount_percent(Some(Price::from_minor(3_000))),
            Some(33)
        );
    }

    #[test]
    fn test_percent_rounds_to_pence() {
        assert_eq!(Price::from_minor(1_999).percent(15), Price::from_minor(300));
        assert_eq!(Price::from_minor(10_000).percent(0), Price::ZERO);
    }

    #[test]
    fn test_sum_and_times() {
        let total: Price = [Price::from_minor(1_050).times(2), Price::from_minor(499)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_minor(2_599));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_minor(1_999).display(CurrencyCode::GBP), "£19.99");
        assert_eq!(Price::from_minor(500).display(CurrencyCode::USD), "$5.00");
    }
}
