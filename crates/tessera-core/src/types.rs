//! # Domain Types
//!
//! Rates, orders and payments shared by every engine component.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │    Percent      │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  bps (u32)      │   │  id             │       │
//! │  │  825 = 8.25%    │   │  2000 = 20%     │   │  total          │       │
//! │  └─────────────────┘   └─────────────────┘   │  amount_paid    │       │
//! │                                              │  status         │       │
//! │  ┌─────────────────┐   ┌─────────────────┐   └─────────────────┘       │
//! │  │  OrderStatus    │   │    Payment      │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  Pending        │   │  amount (> 0)   │                             │
//! │  │  PartiallyPaid  │   │  method         │                             │
//! │  │  Completed      │   │  timestamp      │                             │
//! │  │  Cancelled      │   └─────────────────┘                             │
//! │  │  Refunded       │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{validate_percent_bps, validate_tax_rate_bps, ValidationResult};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 825 bps = 8.25%, exact where `0.0825_f64` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from basis points, rejecting rates above 100%.
    pub fn try_from_bps(bps: u32) -> ValidationResult<Self> {
        validate_tax_rate_bps(bps)?;
        Ok(TaxRate(bps))
    }

    /// Creates a tax rate from a percentage (config and CLI input only).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Percent
// =============================================================================

/// A discount percentage in basis points, 0..=10000 (0% to 100%).
///
/// `from_bps` clamps to 100%; `try_from_bps` rejects instead. Records coming
/// from the discount-management collaborator go through `try_from_bps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    /// 100%.
    pub const FULL: Percent = Percent(10_000);

    /// Creates a percent from basis points, clamped to 100%.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > 10_000 {
            Percent(10_000)
        } else {
            Percent(bps)
        }
    }

    /// Creates a percent from basis points, rejecting values above 100%.
    pub fn try_from_bps(bps: u32) -> ValidationResult<Self> {
        validate_percent_bps(bps)?;
        Ok(Percent(bps))
    }

    /// Creates a percent from whole percentage points (20 → 20%).
    #[inline]
    pub const fn from_whole(points: u32) -> Self {
        Percent::from_bps(points.saturating_mul(100))
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Checks if this is 0%.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Settlement status of an order (sale or preorder).
///
/// ```text
///   Pending ──pay (< due)──► PartiallyPaid ──pay (< due)──► PartiallyPaid
///      │                          │
///      └──pay (= due)──┐          └──pay (= due)──┐
///                      ▼                          ▼
///                  Completed                  Completed
///
///   Cancelled, Refunded: set outside the engine, terminal, due frozen
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created, nothing paid yet.
    Pending,
    /// Some payments recorded, balance still due.
    PartiallyPaid,
    /// `amount_paid == total`.
    Completed,
    /// Cancelled by the order collaborator.
    Cancelled,
    /// Refunded by the order collaborator.
    Refunded,
}

impl OrderStatus {
    /// Returns true for statuses whose due balance is frozen.
    pub const fn is_closed(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Refunded)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::PartiallyPaid => "PARTIALLY_PAID",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Refunded => "REFUNDED",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    ExternalCard,
    /// Bank transfer or mobile wallet settled outside the till.
    Transfer,
}

// =============================================================================
// Order
// =============================================================================

/// Snapshot of an order as handed over by the order collaborator.
///
/// The engine never mutates an `Order`; settlement returns a new snapshot
/// (see [`Order::with_outcome`](crate::settlement)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Fixed at creation.
    pub total: Money,
    /// Monotonically non-decreasing.
    pub amount_paid: Money,
    pub status: OrderStatus,
}

impl Order {
    /// Creates a fresh order with nothing paid.
    pub fn new(id: impl Into<String>, total: Money) -> Self {
        Order {
            id: id.into(),
            total,
            amount_paid: Money::zero(),
            status: OrderStatus::Pending,
        }
    }

    /// `total - amount_paid`, never negative.
    #[inline]
    pub fn amount_due(&self) -> Money {
        self.total.saturating_sub_floor(self.amount_paid)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A recorded payment towards one order. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub amount: Money,
    pub method: PaymentMethod,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
