//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Splitting a $20.00 plate three ways with floats:                       │
//! │    20.0 / 3 = 6.666666666666667  (×3 = 20.000000000000004)  ❌          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + explicit remainder                       │
//! │    2000 cents / 3 = 666 r 2                                             │
//! │    → [667, 667, 666]  (sum = 2000 exactly)                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tabsplit_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let line_total = price.multiply_quantity(2); // $21.98
//! assert_eq!(line_total.cents(), 2198);
//!
//! let shares = Money::from_cents(2000).allocate_evenly(3);
//! assert_eq!(shares, vec![
//!     Money::from_cents(667),
//!     Money::from_cents(667),
//!     Money::from_cents(666),
//! ]);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

use crate::MAX_AMOUNT_CENTS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  BillItem.price ──► line_total (× quantity) ──► split ──► assignment    │
/// │                                                              │          │
/// │  Session.subtotal / tax / tip / total                        ▼          │
/// │                                                   Participant balance   │
/// │                                                                         │
/// │  Receipt JSON decimals are rounded into Money exactly once, at parse   │
/// │  time; every later step is integer arithmetic.                          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tabsplit_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount in major units, rounding to
    /// the nearest cent.
    ///
    /// Only for values that arrive as JSON numbers from the receipt parser.
    /// Returns `None` for non-finite input and for magnitudes beyond
    /// `MAX_AMOUNT_CENTS`.
    ///
    /// ## Example
    /// ```rust
    /// use tabsplit_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(12.99).map(|m| m.cents()), Some(1299));
    /// assert_eq!(Money::from_decimal(0.1 + 0.2).map(|m| m.cents()), Some(30));
    /// assert_eq!(Money::from_decimal(1e30), None);
    /// ```
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents.abs() > MAX_AMOUNT_CENTS as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
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

    /// Returns the absolute value, saturating at `i64::MAX`.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Multiplies money by a quantity, saturating instead of overflowing.
    ///
    /// ## Example
    /// ```rust
    /// use tabsplit_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1000); // $10.00
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 2000);
    /// ```
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        // i128 so the product is exact before clamping back into i64
        let product = self.0 as i128 * qty as i128;
        Money(product.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Splits the amount into `parts` shares that sum exactly to `self`.
    ///
    /// ## Remainder Handling
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  $20.00 among 3                                                     │
    /// │                                                                     │
    /// │  base = 2000 / 3 = 666      remainder = 2000 % 3 = 2               │
    /// │                                                                     │
    /// │  share[0] = 666 + 1 = 667                                           │
    /// │  share[1] = 666 + 1 = 667                                           │
    /// │  share[2] = 666                                                     │
    /// │                                                                     │
    /// │  The first `remainder` shares absorb one extra cent each.           │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// Returns an empty vector when `parts` is zero.
    pub fn allocate_evenly(&self, parts: usize) -> Vec<Money> {
        if parts == 0 {
            return Vec::new();
        }

        let n = parts as i64;
        let base = self.0.div_euclid(n);
        let remainder = self.0.rem_euclid(n);

        (0..n)
            .map(|i| Money(base + if i < remainder { 1 } else { 0 }))
            .collect()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// Receipt validation messages are built from this, so the format is part
/// of the API output: `$10.00`, `-$5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Arithmetic saturates at the i64 bounds.

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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
