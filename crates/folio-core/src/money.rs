//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  A bill total that is off by a cent fails audit reconciliation.     │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Cents                                        │
//! │    45.00 is stored as 4500; every derived amount (discount, tax)    │
//! │    is rounded half-up to a whole cent at a fixed point, so the      │
//! │    stored totals always satisfy                                     │
//! │        total == subtotal - discount + tax                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use folio_core::money::Money;
//! use folio_core::types::Percent;
//!
//! let price = Money::from_cents(1000);            // 10.00
//! let line = price * 5i64;                        // 50.00
//! let discount = line.percent_of(Percent::from_bps(1000)); // 10% = 5.00
//! assert_eq!((line - discount).cents(), 4500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::Percent;

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for reversals and deltas
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
///
/// Every monetary value in the system flows through this type: item
/// prices, line totals, discounts, tax, bill totals, revenue aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (e.g. whole rupees/dollars).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99, absolute).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Computes a percentage of this amount, rounded half-up to a cent.
    ///
    /// This is THE rounding point of the billing system: discount and tax
    /// amounts are derived with this function and stored, and all later
    /// arithmetic is exact integer addition on the stored cents.
    ///
    /// ## Implementation
    /// Integer math on basis points: `(cents * bps + 5000) / 10000`.
    /// The `+ 5000` term gives half-up rounding (5000/10000 = 0.5).
    /// i128 intermediates prevent overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use folio_core::money::Money;
    /// use folio_core::types::Percent;
    ///
    /// // 10.00 at 8.25% = 0.825 → rounds half-up to 0.83
    /// let amount = Money::from_cents(1000);
    /// assert_eq!(amount.percent_of(Percent::from_bps(825)).cents(), 83);
    /// ```
    pub fn percent_of(&self, rate: Percent) -> Money {
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10_000;
        Money::from_cents(cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// Saturates at the i64 bounds instead of panicking; inputs that
    /// passed `validation` (price and quantity caps) never get near
    /// them, so the saturation is unobservable on the billing path.
    ///
    /// ## Example
    /// ```rust
    /// use folio_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Saturating subtraction floored at zero.
    ///
    /// Used for reversal paths where an aggregate (e.g. an item's running
    /// revenue) must never go negative even if earlier data was adjusted.
    #[inline]
    pub const fn saturating_sub_floor_zero(&self, other: Money) -> Self {
        let v = self.0 - other.0;
        if v < 0 {
            Money(0)
        } else {
            Money(v)
        }
    }
}

/// Display shows money in a human-readable format.
///
/// For debugging and log lines. Receipt/PDF formatting happens at the
/// boundary, not here.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

/// Default money is zero.
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

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Summing a stream of line totals into a subtotal.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
