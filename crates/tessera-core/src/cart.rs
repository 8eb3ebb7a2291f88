//! # Cart Types
//!
//! Line items and cart-level coupons handed to the pricing calculator.
//!
//! ## Cart Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart                                                                   │
//! │  ├── lines: [CartLine]          ordered, one per item (or variant)      │
//! │  │     catalog_item_id, variant?, unit_price, quantity ≥ 1              │
//! │  └── coupon: Option<Coupon>     cart-wide override of line discounts    │
//! │        code, kind (PERCENT | FIXED | FREE_SHIPPING), min_purchase,      │
//! │        expiry                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A cart is either a live checkout cart or the output of a preorder
//! allocation; pricing does not distinguish the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::{CatalogItem, VariantKey};
use crate::money::Money;
use crate::types::Percent;

// =============================================================================
// Cart Line
// =============================================================================

/// One priced line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub catalog_item_id: String,

    /// Set when the line comes from a variant allocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub variant: Option<VariantKey>,

    /// Price frozen at the time the line was created.
    pub unit_price: Money,

    /// At least 1.
    pub quantity: i64,
}

impl CartLine {
    pub fn new(catalog_item_id: impl Into<String>, unit_price: Money, quantity: i64) -> Self {
        CartLine {
            catalog_item_id: catalog_item_id.into(),
            variant: None,
            unit_price,
            quantity,
        }
    }

    /// Creates a line priced from the catalog item.
    pub fn for_item(item: &CatalogItem, quantity: i64) -> Self {
        CartLine::new(item.id.clone(), item.price, quantity)
    }

    /// `unit_price × quantity`.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// The promotion a coupon grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponKind {
    /// Percentage of the subtotal.
    Percent(Percent),
    /// Fixed amount off, never more than the subtotal.
    Fixed(Money),
    /// Free shipping. Contributes nothing to the cart discount.
    FreeShipping,
}

/// A cart-level coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub kind: CouponKind,
    /// Subtotal required for the coupon to apply.
    #[serde(default)]
    pub min_purchase: Money,
    #[ts(as = "String")]
    pub expiry: DateTime<Utc>,
}

impl Coupon {
    pub fn new(code: impl Into<String>, kind: CouponKind, min_purchase: Money, expiry: DateTime<Utc>) -> Self {
        Coupon {
            code: code.into(),
            kind,
            min_purchase,
            expiry,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// An ordered sequence of lines plus an optional coupon.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub coupon: Option<Coupon>,
}

impl Cart {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Cart {
            lines,
            coupon: None,
        }
    }

    /// Builder: attaches a coupon.
    pub fn with_coupon(mut self, coupon: Coupon) -> Self {
        self.coupon = Some(coupon);
        self
    }

    /// Returns the number of lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_line_total() {
        let line = CartLine::new("tee-01", Money::from_cents(999), 2);
        assert_eq!(line.line_total().cents(), 1998);
    }

    #[test]
    fn test_line_for_item_freezes_price() {
        let mut item = CatalogItem::new("tee-01", Money::from_cents(2500));
        let line = CartLine::for_item(&item, 3);
        item.price = Money::from_cents(9999);

        assert_eq!(line.unit_price.cents(), 2500);
        assert_eq!(line.line_total().cents(), 7500);
    }

    #[test]
    fn test_cart_counts() {
        let cart = Cart::new(vec![
            CartLine::new("a", Money::from_cents(100), 2),
            CartLine::new("b", Money::from_cents(250), 3),
        ]);
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.total_quantity(), 5);
        assert!(!cart.is_empty());
        assert!(Cart::default().is_empty());
    }

    #[test]
    fn test_coupon_json_shape() {
        let coupon = Coupon::new(
            "SAVE20",
            CouponKind::Fixed(Money::from_cents(2000)),
            Money::from_cents(15000),
            Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap(),
        );
        let json = serde_json::to_value(&coupon).unwrap();
        assert_eq!(json["kind"]["type"], "FIXED");
        assert_eq!(json["kind"]["value"], 2000);
        assert_eq!(json["minPurchase"], 15000);

        let free: CouponKind = serde_json::from_str(r#"{"type":"FREE_SHIPPING"}"#).unwrap();
        assert_eq!(free, CouponKind::FreeShipping);
    }
}
