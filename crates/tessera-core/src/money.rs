//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Pricing the same cart twice must give bit-identical totals, and a     │
//! │  balance must reach exactly zero after the last payment.               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every amount is an i64 of cents. Rates are basis points.            │
//! │    Rate products are summed in i128 and rounded ONCE, half-up.         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tessera_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let doubled = price.multiply_quantity(2); // $21.98
//! let total = price + Money::from_cents(500);
//! assert_eq!(total.cents(), 1599);
//! assert_eq!(doubled.cents(), 2198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::types::{Percent, TaxRate};

/// One whole rate expressed in basis points (100%).
pub(crate) const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences such as `tendered - total` are computed
///   before they are checked, so the type itself must allow negatives
/// - **Single field tuple struct**: serializes as a bare integer of cents
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  CatalogItem.price ──► CartLine.unit_price ──► line total               │
/// │                                                    │                    │
/// │          ResolvedDiscount / Coupon ──► discount ───┤                    │
/// │                                                    ▼                    │
/// │                          taxable ──► tax ──► PricingResult.total        │
/// │                                                    │                    │
/// │                          Order.total ◄─────────────┘                    │
/// │                              │                                          │
/// │                              └──► Payment.amount ──► amount_due         │
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
    /// use tessera_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns `self - other`, floored at zero.
    ///
    /// Used wherever the result is specified as "never negative"
    /// (taxable amount, amount due).
    ///
    /// ```rust
    /// use tessera_core::money::Money;
    ///
    /// let a = Money::from_cents(500);
    /// assert_eq!(a.saturating_sub_floor(Money::from_cents(800)), Money::zero());
    /// assert_eq!(a.saturating_sub_floor(Money::from_cents(200)).cents(), 300);
    /// ```
    #[inline]
    pub fn saturating_sub_floor(self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }

    /// Multiplies money by a quantity.
    ///
    /// Callers pass amounts already bounded by [`Money::checked_mul`];
    /// unvalidated input goes through the checked form.
    ///
    /// ```rust
    /// use tessera_core::money::Money;
    ///
    /// let line_total = Money::from_cents(299).multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897);
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `self + other`, or `None` if the sum does not fit in `i64` cents.
    ///
    /// ```rust
    /// use tessera_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1).checked_add(Money::from_cents(2)), Some(Money::from_cents(3)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    /// ```
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self × qty`, or `None` if the product does not fit in `i64` cents.
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Calculates tax on this amount, rounded half-up to the cent.
    ///
    /// ## Example
    /// ```rust
    /// use tessera_core::money::Money;
    /// use tessera_core::types::TaxRate;
    ///
    /// let taxable = Money::from_cents(18000); // $180.00
    /// let tax = taxable.calculate_tax(TaxRate::from_bps(825));
    /// assert_eq!(tax.cents(), 1485); // $14.85
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        round_bps_product(self.0 as i128 * rate.bps() as i128)
    }

    /// Returns `percent` of this amount, rounded half-up to the cent.
    ///
    /// ```rust
    /// use tessera_core::money::Money;
    /// use tessera_core::types::Percent;
    ///
    /// let subtotal = Money::from_cents(10000);
    /// assert_eq!(subtotal.percentage(Percent::from_bps(2000)).cents(), 2000);
    /// // $0.05 at 50% = 2.5 cents → 3 cents
    /// assert_eq!(Money::from_cents(5).percentage(Percent::from_bps(5000)).cents(), 3);
    /// ```
    pub fn percentage(&self, percent: Percent) -> Money {
        round_bps_product(self.0 as i128 * percent.bps() as i128)
    }

    /// Returns the raw `cents × bps` product without rounding.
    ///
    /// Summing raw products and rounding the sum once through
    /// [`round_bps_product`] avoids per-line rounding drift.
    #[inline]
    pub(crate) fn bps_product(&self, bps: u32) -> i128 {
        self.0 as i128 * bps as i128
    }
}

/// Converts a `cents × bps` product back into cents, rounding half-up
/// (half away from zero for negative products).
///
/// ```text
///   14_850_000 → 1485.0000 → 1485
///       25_000 →    2.5000 →    3
///       24_999 →    2.4999 →    2
/// ```
pub(crate) fn round_bps_product(product: i128) -> Money {
    let half = BPS_SCALE / 2;
    let rounded = if product >= 0 {
        (product + half) / BPS_SCALE
    } else {
        (product - half) / BPS_SCALE
    };
    Money::from_cents(rounded as i64)
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display for logs and error messages. Locale formatting belongs to the UI.
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

// =============================================================================
// Unit Tests
// =============================================================================
