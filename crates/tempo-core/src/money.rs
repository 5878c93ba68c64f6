//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  An invoice whose grand total differs from the sum of its lines by     │
//! │  a rounding error is a broken invoice.                                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    Discounts are rounded once per unit price, every subtotal and total │
//! │    after that is exact integer arithmetic.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tempo_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//!
//! let doubled = price.checked_multiply_quantity(2);
//! let total = price + Money::from_cents(500);
//! assert_eq!(doubled, Some(Money::from_cents(2198)));
//! assert_eq!(total.cents(), 1599);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents / centavos).
///
/// The storefront is currency-agnostic: one major unit is always 100 minor
/// units, and only [`format_currency`] decides how a value is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use tempo_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use tempo_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99);
    /// assert_eq!(price.cents(), 1099);
    ///
    /// let negative = Money::from_major_minor(-5, 50);
    /// assert_eq!(negative.cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole major units (pesos), truncated toward zero.
    #[inline]
    pub const fn whole_units(&self) -> i64 {
        self.0 / 100
    }

    /// Minor units past the last whole unit (always 0-99).
    #[inline]
    pub const fn fraction(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Multiplies money by a quantity, or `None` when the product does not
    /// fit in an `i64`.
    ///
    /// ## Example
    /// ```rust
    /// use tempo_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(9000);
    /// assert_eq!(unit_price.checked_multiply_quantity(3), Some(Money::from_cents(27000)));
    /// assert_eq!(Money::from_cents(i64::MAX / 2).checked_multiply_quantity(3), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Applies a whole-percent discount and returns the discounted amount.
    ///
    /// The discount amount is rounded half-up to the nearest minor unit:
    /// `discounted = amount - (amount × percent + 50) / 100`.
    ///
    /// ## Example
    /// ```rust
    /// use tempo_core::money::Money;
    ///
    /// let price = Money::from_cents(10000); // 100.00
    /// assert_eq!(price.apply_percentage_discount(10).cents(), 9000);
    /// assert_eq!(price.apply_percentage_discount(0).cents(), 10000);
    /// assert_eq!(price.apply_percentage_discount(100).cents(), 0);
    /// ```
    pub fn apply_percentage_discount(&self, percent: u32) -> Money {
        // i128 keeps large catalog prices from overflowing
        let discount_amount = (self.0 as i128 * percent as i128 + 50) / 100;
        Money::from_cents(self.0 - discount_amount as i64)
    }
}

// =============================================================================
// Currency Formatting
// =============================================================================

/// Formats money the way invoices print it: whole major units, `.` as the
/// thousands separator, no decimals.
///
/// Minor units are truncated, never rounded up.
///
/// ## Example
/// ```rust
/// use tempo_core::money::{format_currency, Money};
///
/// assert_eq!(format_currency(Money::from_major_minor(450_000, 0)), "$450.000");
/// assert_eq!(format_currency(Money::from_major_minor(1_234_567, 99)), "$1.234.567");
/// assert_eq!(format_currency(Money::from_cents(999)), "$9");
/// ```
pub fn format_currency(amount: Money) -> String {
    let whole = amount.whole_units();
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if whole < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display with two decimals. Invoices use [`format_currency`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.whole_units().abs(),
            self.fraction()
        )
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
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
