//! # Currency Formatting
//!
//! Turns amounts into the strings the storefront displays next to products
//! and in the cart total.
//!
//! ## Convention
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  pt-BR / BRL (storefront default)                       │
//! │                                                                         │
//! │      -R$ 1.234.567,89                                                   │
//! │      │ │ │ │       │                                                    │
//! │      │ │ │ │       └── always two fraction digits                       │
//! │      │ │ │ └────────── ',' decimal separator                            │
//! │      │ │ └──────────── '.' groups of three                              │
//! │      │ └────────────── U+00A0 between symbol and digits                 │
//! │      └──────────────── sign before the symbol                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! Decimal amounts are rounded on the digits a person reads, not on the
//! binary value: `1.005` is written `1.005`, so it becomes `1,01` even
//! though `1.005 * 100.0` is `100.49999…`. Ties round away from zero and a
//! negative amount keeps its sign after rounding to zero (`-R$ 0,00`).

use crate::money::Money;

/// Number of fraction digits shown; matches the cent resolution of [`Money`].
const FRACTION_DIGITS: usize = 2;

/// A fixed locale/currency display convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyFormat {
    /// Currency symbol placed before the amount.
    pub symbol: &'static str,

    /// Text between the symbol and the digits.
    pub symbol_separator: &'static str,

    /// Separator between integer and fraction digits.
    pub decimal_separator: char,

    /// Separator between groups of three integer digits.
    pub group_separator: char,
}

impl CurrencyFormat {
    /// Brazilian real, pt-BR locale.
    pub const BRL: CurrencyFormat = CurrencyFormat {
        symbol: "R$",
        symbol_separator: "\u{a0}",
        decimal_separator: ',',
        group_separator: '.',
    };

    /// Formats a money value.
    ///
    /// ## Example
    /// ```rust
    /// use marketplace_core::{CurrencyFormat, Money};
    ///
    /// assert_eq!(CurrencyFormat::BRL.format(Money::from_cents(123456)), "R$\u{a0}1.234,56");
    /// ```
    pub fn format(&self, money: Money) -> String {
        let cents = money.cents().unsigned_abs();
        self.render(money.is_negative(), &(cents / 100).to_string(), cents % 100)
    }

    /// Formats a decimal amount in major units.
    ///
    /// Finite values of any magnitude keep every integer digit. `NaN` and
    /// infinities are rendered as words after the symbol.
    pub fn format_decimal(&self, amount: f64) -> String {
        if amount.is_nan() {
            return format!("{}{}NaN", self.symbol, self.symbol_separator);
        }
        if amount.is_infinite() {
            let sign = if amount < 0.0 { "-" } else { "" };
            return format!("{}{}{}∞", sign, self.symbol, self.symbol_separator);
        }

        let rounded = CentDigits::round(amount);
        self.render(rounded.negative, &rounded.whole, u64::from(rounded.cents))
    }

    fn render(&self, negative: bool, whole: &str, cents: u64) -> String {
        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(self.symbol);
        out.push_str(self.symbol_separator);
        out.push_str(&self.group(whole));
        out.push(self.decimal_separator);
        out.push_str(&format!("{:0width$}", cents, width = FRACTION_DIGITS));
        out
    }

    fn group(&self, digits: &str) -> String {
        let len = digits.len();
        let mut grouped = String::with_capacity(len + len / 3);

        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                grouped.push(self.group_separator);
            }
            grouped.push(ch);
        }
        grouped
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat::BRL
    }
}

// =============================================================================
// Decimal Rounding
// =============================================================================

/// A finite amount rounded to cents on its shortest decimal representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CentDigits {
    /// Sign bit of the input, so `-0.001` stays negative.
    pub negative: bool,

    /// Integer digits, without sign or grouping.
    pub whole: String,

    /// Fraction digits as a number, 0-99.
    pub cents: u8,
}

impl CentDigits {
    /// Rounds half away from zero to two fraction digits.
    ///
    /// `amount` must be finite; f64 `Display` never uses an exponent, so
    /// the digits are exactly the ones the value is written with.
    pub(crate) fn round(amount: f64) -> Self {
        let repr = amount.abs().to_string();
        let (whole, fraction) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

        let mut digits = fraction.bytes().map(|b| b - b'0');
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().is_some_and(|d| d >= 5);

        let mut cents = tenths * 10 + hundredths;
        let mut whole = whole.to_string();
        if round_up {
            if cents == 99 {
                cents = 0;
                whole = increment_digits(&whole);
            } else {
                cents += 1;
            }
        }

        CentDigits {
            negative: amount.is_sign_negative(),
            whole,
            cents,
        }
    }
}

/// Adds one to a string of decimal digits.
fn increment_digits(digits: &str) -> String {
    let mut chars: Vec<char> = digits.chars().collect();

    for ch in chars.iter_mut().rev() {
        if *ch == '9' {
            *ch = '0';
        } else {
            *ch = char::from(*ch as u8 + 1);
            return chars.into_iter().collect();
        }
    }

    chars.insert(0, '1');
    chars.into_iter().collect()
}

/// Formats an amount as Brazilian reais, the storefront's display currency.
///
/// ## Example
/// ```rust
/// use marketplace_core::format_value;
///
/// assert_eq!(format_value(10.0), "R$\u{a0}10,00");
/// assert_eq!(format_value(1000.0), "R$\u{a0}1.000,00");
/// ```
pub fn format_value(amount: f64) -> String {
    CurrencyFormat::BRL.format_decimal(amount)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_basic() {
        assert_eq!(format_value(10.0), "R$\u{a0}10,00");
        assert_eq!(format_value(0.0), "R$\u{a0}0,00");
        assert_eq!(format_value(0.5), "R$\u{a0}0,50");
        assert_eq!(format_value(19.9), "R$\u{a0}19,90");
    }

    #[test]
    fn test_format_value_grouping() {
        assert_eq!(format_value(1000.0), "R$\u{a0}1.000,00");
        assert_eq!(format_value(999.99), "R$\u{a0}999,99");
        assert_eq!(format_value(1234567.891), "R$\u{a0}1.234.567,89");
        assert_eq!(format_value(100000.0), "R$\u{a0}100.000,00");
    }

    #[test]
    fn test_format_value_negative() {
        assert_eq!(format_value(-10.0), "-R$\u{a0}10,00");
        assert_eq!(format_value(-1500.5), "-R$\u{a0}1.500,50");
    }

    #[test]
    fn test_format_value_rounds_to_cents() {
        assert_eq!(format_value(2.499), "R$\u{a0}2,50");
        assert_eq!(format_value(0.001), "R$\u{a0}0,00");
        assert_eq!(format_value(9.995), "R$\u{a0}10,00");
        assert_eq!(format_value(999.999), "R$\u{a0}1.000,00");
    }

    #[test]
    fn test_format_value_half_cents_round_on_written_digits() {
        assert_eq!(format_value(1.005), "R$\u{a0}1,01");
        assert_eq!(format_value(0.285), "R$\u{a0}0,29");
        assert_eq!(format_value(1.255), "R$\u{a0}1,26");
        assert_eq!(format_value(-1.005), "-R$\u{a0}1,01");
    }

    #[test]
    fn test_format_value_negative_rounding_to_zero_keeps_sign() {
        assert_eq!(format_value(-0.001), "-R$\u{a0}0,00");
        assert_eq!(format_value(-0.0), "-R$\u{a0}0,00");
    }

    #[test]
    fn test_format_value_beyond_cent_range() {
        assert_eq!(format_value(1e17), "R$\u{a0}100.000.000.000.000.000,00");
        assert_eq!(
            format_value(-2.5e20),
            "-R$\u{a0}250.000.000.000.000.000.000,00"
        );
    }

    #[test]
    fn test_format_value_non_finite() {
        assert_eq!(format_value(f64::NAN), "R$\u{a0}NaN");
        assert_eq!(format_value(f64::INFINITY), "R$\u{a0}∞");
        assert_eq!(format_value(f64::NEG_INFINITY), "-R$\u{a0}∞");
    }

    #[test]
    fn test_format_money_extremes() {
        let min = CurrencyFormat::BRL.format(Money::from_cents(i64::MIN));
        assert_eq!(min, "-R$\u{a0}92.233.720.368.547.758,08");
    }

    #[test]
    fn test_increment_digits_carries() {
        assert_eq!(increment_digits("0"), "1");
        assert_eq!(increment_digits("129"), "130");
        assert_eq!(increment_digits("999"), "1000");
    }
}
