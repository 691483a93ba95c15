//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  A sale total built from floats drifts away from the sum of its        │
//! │  items after a few discounts.                                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Prices, item totals and sale totals are all i64 cents.              │
//! │    Discounts are basis points (1000 = 10%), rounded half-up once.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sales_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let doubled = price * 2;             // $21.98
//! assert_eq!(doubled.cents(), 2198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

use crate::MAX_DISCOUNT_BPS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// Product.price_cents ──► SaleItem.unit_price_cents (snapshot)
///                                   │
///                   × quantity − discount
///                                   ▼
///                         SaleItem.total_amount_cents
///                                   │
///                     Σ over non-cancelled items
///                                   ▼
///                           Sale.total_amount_cents
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies by an item quantity.
    ///
    /// ## Example
    /// ```rust
    /// use sales_core::money::Money;
    ///
    /// let unit = Money::from_cents(250);
    /// assert_eq!(unit.multiply_quantity(4).cents(), 1000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, quantity: i64) -> Self {
        Money(self.0 * quantity)
    }

    /// The discount amount for `bps` basis points, rounded half-up.
    ///
    /// ## Implementation
    /// `(amount * bps + 5000) / 10000` in i128, so large totals cannot
    /// overflow before the division.
    ///
    /// ## Example
    /// ```rust
    /// use sales_core::money::Money;
    ///
    /// // 10% of $0.05 is half a cent, which rounds up
    /// assert_eq!(Money::from_cents(5).discount_amount(1000).cents(), 1);
    /// ```
    pub fn discount_amount(&self, bps: u32) -> Self {
        let bps = bps.min(MAX_DISCOUNT_BPS);
        let discount = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money(discount as i64)
    }

    /// Applies a percentage discount expressed in basis points.
    ///
    /// ## Example
    /// ```rust
    /// use sales_core::money::Money;
    ///
    /// let gross = Money::from_cents(3297);
    /// // 10% off: 329.7 rounds to 330, leaving 2967
    /// assert_eq!(gross.apply_percentage_discount(1000).cents(), 2967);
    /// ```
    pub fn apply_percentage_discount(&self, bps: u32) -> Self {
        *self - self.discount_amount(bps)
    }
}

// =============================================================================
// Display Implementation
// =============================================================================

impl fmt::Display for Money {
    /// Formats money as "$X.XX".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

// =============================================================================
// Arithmetic Operations
// =============================================================================

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    #[inline]
    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    #[inline]
    fn mul(self, quantity: i64) -> Money {
        Money(self.0 * quantity)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
