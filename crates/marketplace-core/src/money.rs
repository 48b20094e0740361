//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Catalog prices arrive as floats (19.9, 5.05, ...):                     │
//! │    19.9 * 100 = 1989.9999999999998                                      │
//! │    0.1 + 0.2  = 0.30000000000000004                                     │
//! │                                                                         │
//! │  OUR SOLUTION: round ONCE to integer cents at the edge                  │
//! │    Money::from_decimal(19.9) = 1990 cents                               │
//! │    every sum and product after that is exact                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use marketplace_core::money::Money;
//!
//! let price = Money::from_decimal(10.99);
//! assert_eq!(price.cents(), 1099);
//!
//! let doubled = price * 2;
//! let total = doubled + Money::from_cents(500);
//! assert_eq!(total.cents(), 2698);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::currency::CentDigits;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (centavos for BRL).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds, discounts
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Largest representable amount; sums saturate here.
    pub const MAX: Money = Money(i64::MAX);

    /// Smallest representable amount.
    pub const MIN: Money = Money(i64::MIN);

    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use marketplace_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // R$ 10,99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount in major units.
    ///
    /// Rounds half away from zero to the nearest cent, on the digits the
    /// amount is written with (so `1.005` is 101 cents). Amounts outside the
    /// i64 cent range saturate; `NaN` becomes zero.
    ///
    /// ## Example
    /// ```rust
    /// use marketplace_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(19.9).cents(), 1990);
    /// assert_eq!(Money::from_decimal(0.125).cents(), 13);
    /// assert_eq!(Money::from_decimal(1.005).cents(), 101);
    /// assert_eq!(Money::from_decimal(-5.5).cents(), -550);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        if amount.is_nan() {
            return Money::zero();
        }
        if amount.is_infinite() {
            return if amount > 0.0 { Money::MAX } else { Money::MIN };
        }

        let rounded = CentDigits::round(amount);
        let magnitude = rounded
            .whole
            .parse::<i64>()
            .ok()
            .and_then(|whole| whole.checked_mul(100))
            .and_then(|cents| cents.checked_add(i64::from(rounded.cents)));

        match (magnitude, rounded.negative) {
            (Some(cents), true) => Money(-cents),
            (Some(cents), false) => Money(cents),
            (None, true) => Money::MIN,
            (None, false) => Money::MAX,
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as a decimal amount in major units.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the major unit (reais) portion.
    ///
    /// ## Example
    /// ```rust
    /// use marketplace_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).major(), 10);
    /// assert_eq!(Money::from_cents(-550).major(), -5);
    /// ```
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (centavos) portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value, saturating at [`Money::MAX`].
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Multiplies money by a quantity, saturating at [`Money::MAX`] /
    /// [`Money::MIN`].
    ///
    /// ## Example
    /// ```rust
    /// use marketplace_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the storefront's currency convention.
///
/// See [`crate::currency::CurrencyFormat`] for other conventions.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::currency::CurrencyFormat::BRL.format(*self))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_from_decimal_rounds_float_noise() {
        assert_eq!(Money::from_decimal(19.9).cents(), 1990);
        assert_eq!(Money::from_decimal(5.05).cents(), 505);
        assert_eq!(Money::from_decimal(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_decimal(1000.0).cents(), 100_000);
    }

    #[test]
    fn test_from_decimal_negative() {
        let refund = Money::from_decimal(-5.5);
        assert_eq!(refund.cents(), -550);
        assert_eq!(refund.major(), -5);
        assert_eq!(refund.minor(), 50);
        assert!(refund.is_negative());
        assert_eq!(refund.abs().cents(), 550);
    }

    #[test]
    fn test_from_decimal_rounds_written_half_cents() {
        assert_eq!(Money::from_decimal(1.005).cents(), 101);
        assert_eq!(Money::from_decimal(0.285).cents(), 29);
        assert_eq!(Money::from_decimal(-1.255).cents(), -126);
        assert_eq!(Money::from_decimal(9.999).cents(), 1000);
    }

    #[test]
    fn test_from_decimal_saturates() {
        assert_eq!(Money::from_decimal(1e17), Money::MAX);
        assert_eq!(Money::from_decimal(-1e300), Money::MIN);
        assert_eq!(Money::from_decimal(f64::INFINITY), Money::MAX);
        assert_eq!(Money::from_decimal(f64::NAN), Money::zero());
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(Money::from_cents(1990).to_decimal(), 19.9);
        assert_eq!(Money::from_cents(-1).to_decimal(), -0.01);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let mut c = a;
        c += b;
        c -= Money::from_cents(1);
        assert_eq!(c.cents(), 1499);
    }

    #[test]
    fn test_arithmetic_saturates() {
        assert_eq!(Money::MAX.multiply_quantity(2), Money::MAX);
        assert_eq!(Money::MAX + Money::from_cents(1), Money::MAX);
        assert_eq!(Money::MIN - Money::from_cents(1), Money::MIN);
        assert_eq!(Money::MIN * 3, Money::MIN);
        assert_eq!(Money::MIN.abs(), Money::MAX);

        let mut total = Money::MAX;
        total += Money::MAX;
        assert_eq!(total, Money::MAX);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 5].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 355);
    }

    #[test]
    fn test_display_uses_storefront_convention() {
        assert_eq!(Money::from_cents(123456).to_string(), "R$\u{a0}1.234,56");
        assert_eq!(Money::zero().to_string(), "R$\u{a0}0,00");
    }
}
