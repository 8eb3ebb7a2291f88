//! # Catalog Snapshot Types
//!
//! Read-only shapes supplied by the catalog collaborator.
//!
//! ## Two Category Systems
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  An item can be listed in the online shop, stocked in inventory, or    │
//! │  both. Each system has its own category ids, so a category reference   │
//! │  carries its namespace:                                                │
//! │                                                                         │
//! │     CategoryRef { namespace: Online,    id: "summer-sale" }            │
//! │     CategoryRef { namespace: Inventory, id: "42"          }            │
//! │                                                                         │
//! │  Equality includes the namespace: online "42" ≠ inventory "42".         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Category Reference
// =============================================================================

/// Which category system a category id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CategoryNamespace {
    Online,
    Inventory,
}

/// A category id tagged with its namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryRef {
    pub namespace: CategoryNamespace,
    pub id: String,
}

impl CategoryRef {
    pub fn online(id: impl Into<String>) -> Self {
        CategoryRef {
            namespace: CategoryNamespace::Online,
            id: id.into(),
        }
    }

    pub fn inventory(id: impl Into<String>) -> Self {
        CategoryRef {
            namespace: CategoryNamespace::Inventory,
            id: id.into(),
        }
    }
}

impl fmt::Display for CategoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = match self.namespace {
            CategoryNamespace::Online => "online",
            CategoryNamespace::Inventory => "inventory",
        };
        write!(f, "{}:{}", ns, self.id)
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A sellable unit.
///
/// Immutable for the duration of a pricing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,

    /// Category in the online shop, if listed there.
    #[serde(default)]
    pub online_category_id: Option<String>,

    /// Category in the inventory system, if stocked there.
    #[serde(default)]
    pub inventory_category_id: Option<String>,

    /// Unit price, never negative.
    pub price: Money,
}

impl CatalogItem {
    /// Creates an uncategorized item.
    pub fn new(id: impl Into<String>, price: Money) -> Self {
        CatalogItem {
            id: id.into(),
            online_category_id: None,
            inventory_category_id: None,
            price,
        }
    }

    /// Builder: sets the online category.
    pub fn with_online_category(mut self, id: impl Into<String>) -> Self {
        self.online_category_id = Some(id.into());
        self
    }

    /// Builder: sets the inventory category.
    pub fn with_inventory_category(mut self, id: impl Into<String>) -> Self {
        self.inventory_category_id = Some(id.into());
        self
    }

    /// Every category this item belongs to, across both systems.
    pub fn categories(&self) -> impl Iterator<Item = CategoryRef> + '_ {
        let online = self.online_category_id.iter().cloned().map(CategoryRef::online);
        let inventory = self
            .inventory_category_id
            .iter()
            .cloned()
            .map(CategoryRef::inventory);
        online.chain(inventory)
    }

    /// Returns true if the item belongs to `category`.
    pub fn in_category(&self, category: &CategoryRef) -> bool {
        let own = match category.namespace {
            CategoryNamespace::Online => self.online_category_id.as_deref(),
            CategoryNamespace::Inventory => self.inventory_category_id.as_deref(),
        };
        own == Some(category.id.as_str())
    }
}

// =============================================================================
// Variant Key
// =============================================================================

/// Identifies a purchasable variant of an item by size and color.
///
/// ## Wire Format
/// Serialized as the string `"size|color"`, so a requested-quantity map is a
/// plain JSON object: `{ "M|Black": 2, "L|White": 1 }`.
///
/// Displayed as `M/Black` in messages. Exported to TypeScript as `string`
/// through `#[ts(as = "String")]` on the fields that carry it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariantKey {
    pub size: String,
    pub color: String,
}

impl VariantKey {
    /// Builds a key; surrounding whitespace on either part is dropped.
    pub fn new(size: impl AsRef<str>, color: impl AsRef<str>) -> Self {
        VariantKey {
            size: size.as_ref().trim().to_string(),
            color: color.as_ref().trim().to_string(),
        }
    }

    /// Returns the `size|color` wire form.
    pub fn as_key(&self) -> String {
        format!("{}|{}", self.size, self.color)
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.size, self.color)
    }
}

impl FromStr for VariantKey {
    type Err = ValidationError;

    /// Parses `size|color`. Both parts must be non-empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "variant key".to_string(),
            reason: format!("expected 'size|color', got '{}'", s),
        };

        let (size, color) = s.split_once('|').ok_or_else(invalid)?;
        let (size, color) = (size.trim(), color.trim());
        if size.is_empty() || color.is_empty() || color.contains('|') {
            return Err(invalid());
        }
        Ok(VariantKey::new(size, color))
    }
}

impl Serialize for VariantKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_key())
    }
}

impl<'de> Deserialize<'de> for VariantKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

// =============================================================================
// Variant
// =============================================================================

/// A purchasable variant with finite stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub size: String,
    pub color: String,

    /// Units available, never negative.
    pub stock_available: i64,

    /// Price shown by the catalog for this variant.
    ///
    /// Informational only: allocations are priced from the parent item.
    #[serde(default)]
    pub unit_price: Option<Money>,
}

impl Variant {
    pub fn new(size: impl Into<String>, color: impl Into<String>, stock_available: i64) -> Self {
        Variant {
            size: size.into(),
            color: color.into(),
            stock_available,
            unit_price: None,
        }
    }

    pub fn key(&self) -> VariantKey {
        VariantKey::new(&self.size, &self.color)
    }

    /// Has at least one unit in stock.
    #[inline]
    pub fn is_purchasable(&self) -> bool {
        self.stock_available > 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
