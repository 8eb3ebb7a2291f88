//! # Stock-Aware Allocation Validator
//!
//! Validates a preorder's requested quantities against finite per-variant
//! stock and turns them into cart lines.
//!
//! ## Validation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  allocate(item, variants, requested, select_all)                        │
//! │                                                                         │
//! │  1. Snapshot sanity    price ≥ 0, stock ≥ 0, unique variant keys        │
//! │  2. Requested set      select_all ⇒ every in-stock variant at qty 1,    │
//! │                        explicit entries override                        │
//! │  3. Empty set          EmptyOrder (something purchasable)               │
//! │                        SoldOut    (nothing purchasable)                 │
//! │  4. Unknown keys       UnknownVariant                                   │
//! │  5. Per variant        qty < 1     ⇒ InvalidQuantity                    │
//! │     (catalog order)    qty > stock ⇒ InsufficientStock                  │
//! │  6. Lines              one per variant, priced from the parent item     │
//! │  7. Total              must fit in i64 cents                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`clamp_to_stock`] is the advisory companion for quantity editors. It is
//! never applied inside [`allocate`], which always re-validates strictly.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartLine};
use crate::catalog::{CatalogItem, Variant, VariantKey};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{checked_lines_total, validate_price, validate_stock};

/// A validated preorder allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    /// One line per requested variant, in catalog order.
    pub lines: Vec<CartLine>,
    /// `Σ unit_price × quantity`.
    pub total: Money,
}

impl Allocation {
    /// The allocation as a coupon-less cart, ready for pricing.
    pub fn into_cart(self) -> Cart {
        Cart::new(self.lines)
    }
}

/// Resolves the concrete requested set.
///
/// With `select_all`, every variant with stock defaults to quantity 1 and
/// explicit entries in `requested` override the default. Unknown keys are
/// kept so that [`allocate`] can reject them.
pub fn requested_set(
    variants: &[Variant],
    requested: &BTreeMap<VariantKey, i64>,
    select_all: bool,
) -> BTreeMap<VariantKey, i64> {
    let mut set = BTreeMap::new();

    if select_all {
        for variant in variants.iter().filter(|v| v.is_purchasable()) {
            set.insert(variant.key(), 1);
        }
    }

    for (key, qty) in requested {
        set.insert(key.clone(), *qty);
    }

    set
}

/// Validates and allocates a preorder.
///
/// ## Example
/// ```rust
/// use std::collections::BTreeMap;
/// use tessera_core::allocation::allocate;
/// use tessera_core::catalog::{CatalogItem, Variant, VariantKey};
/// use tessera_core::money::Money;
///
/// let item = CatalogItem::new("hoodie", Money::from_cents(4500));
/// let variants = vec![Variant::new("M", "Black", 5), Variant::new("L", "Black", 2)];
///
/// let mut requested = BTreeMap::new();
/// requested.insert(VariantKey::new("M", "Black"), 2);
///
/// let allocation = allocate(&item, &variants, &requested, false).unwrap();
/// assert_eq!(allocation.total.cents(), 9000);
/// ```
pub fn allocate(
    item: &CatalogItem,
    variants: &[Variant],
    requested: &BTreeMap<VariantKey, i64>,
    select_all: bool,
) -> CoreResult<Allocation> {
    validate_snapshot(item, variants)?;

    let set = requested_set(variants, requested, select_all);

    if set.is_empty() {
        return Err(if variants.iter().any(Variant::is_purchasable) {
            CoreError::EmptyOrder {
                item_id: item.id.clone(),
            }
        } else {
            CoreError::SoldOut {
                item_id: item.id.clone(),
            }
        });
    }

    let known: BTreeSet<VariantKey> = variants.iter().map(Variant::key).collect();
    if let Some(unknown) = set.keys().find(|key| !known.contains(*key)) {
        return Err(CoreError::UnknownVariant {
            variant: unknown.clone(),
        });
    }

    let mut lines = Vec::with_capacity(set.len());
    for variant in variants {
        let key = variant.key();
        let Some(&quantity) = set.get(&key) else {
            continue;
        };

        if quantity < 1 {
            return Err(CoreError::InvalidQuantity {
                variant: key,
                quantity,
            });
        }
        if quantity > variant.stock_available {
            return Err(CoreError::InsufficientStock {
                variant: key,
                available: variant.stock_available,
                requested: quantity,
            });
        }

        lines.push(CartLine {
            catalog_item_id: item.id.clone(),
            variant: Some(key),
            unit_price: item.price,
            quantity,
        });
    }

    let total = checked_lines_total("total", lines.iter().map(|l| (l.unit_price, l.quantity)))?;
    Ok(Allocation { lines, total })
}

/// `max(1, min(qty, stock_available))`.
///
/// Advisory: a sold-out variant still clamps to 1, which [`allocate`] will
/// then reject.
#[inline]
pub fn clamp_to_stock(variant: &Variant, qty: i64) -> i64 {
    qty.min(variant.stock_available).max(1)
}

fn validate_snapshot(item: &CatalogItem, variants: &[Variant]) -> CoreResult<()> {
    validate_price("price", item.price)?;

    let mut seen = BTreeSet::new();
    for variant in variants {
        validate_stock(variant.stock_available)?;
        let key = variant.key();
        if !seen.insert(key.clone()) {
            return Err(ValidationError::Duplicate {
                field: "variant".to_string(),
                value: key.to_string(),
            }
            .into());
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
