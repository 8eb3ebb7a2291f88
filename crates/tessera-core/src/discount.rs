//! # Discount Resolver
//!
//! Picks the single catalog discount that applies to an item.
//!
//! ## Resolution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    resolve(item, rules, now)                            │
//! │                                                                         │
//! │  1. Keep rules that are enabled AND start ≤ now ≤ end                   │
//! │  2. Keep rules whose target matches the item:                           │
//! │       Product(id)        → id == item.id                                │
//! │       Category(ref)      → item belongs to ref (either namespace)       │
//! │       Global             → always                                       │
//! │  3. Highest scope wins:  PRODUCT  >  CATEGORY  >  GLOBAL                │
//! │  4. Within a scope:      highest percent, then lowest id                │
//! │                                                                         │
//! │  Example: PRODUCT 20% and CATEGORY 50% both active → 20%                │
//! │  (a product rule is more specific, even when smaller)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ordering key is total, so the result does not depend on the order of
//! the input slice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use ts_rs::TS;

use crate::catalog::{CatalogItem, CategoryRef};
use crate::error::ValidationError;
use crate::types::Percent;
use crate::validation::{validate_reference, ValidationResult};

// =============================================================================
// Scope & Target
// =============================================================================

/// Breadth at which a discount rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountScope {
    Global,
    Category,
    Product,
}

impl DiscountScope {
    /// Higher wins.
    pub const fn priority(&self) -> u8 {
        match self {
            DiscountScope::Global => 0,
            DiscountScope::Category => 1,
            DiscountScope::Product => 2,
        }
    }
}

/// What a rule targets. The scope and its reference travel together, so a
/// rule cannot hold a reference its scope does not use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiscountTarget {
    Global,
    Category(CategoryRef),
    Product(String),
}

impl DiscountTarget {
    pub fn scope(&self) -> DiscountScope {
        match self {
            DiscountTarget::Global => DiscountScope::Global,
            DiscountTarget::Category(_) => DiscountScope::Category,
            DiscountTarget::Product(_) => DiscountScope::Product,
        }
    }

    /// Returns true if this target covers `item`.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        match self {
            DiscountTarget::Global => true,
            DiscountTarget::Category(category) => item.in_category(category),
            DiscountTarget::Product(product_id) => *product_id == item.id,
        }
    }
}

// =============================================================================
// Active Window
// =============================================================================

/// Inclusive time window during which a rule is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveWindow {
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

impl ActiveWindow {
    /// Creates a window, rejecting `starts_at > ends_at`.
    pub fn new(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> ValidationResult<Self> {
        if starts_at > ends_at {
            return Err(ValidationError::InvalidFormat {
                field: "active_window".to_string(),
                reason: format!("starts at {} after it ends at {}", starts_at, ends_at),
            });
        }
        Ok(ActiveWindow { starts_at, ends_at })
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.ends_at
    }

    /// Both ends inclusive.
    #[inline]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now <= self.ends_at
    }
}

// =============================================================================
// Discount Rule
// =============================================================================

/// A catalog discount rule, validated at construction.
///
/// Deserializes from (and serializes to) the flat [`DiscountRecord`] shape
/// used by the discount-management collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DiscountRecord", into = "DiscountRecord")]
pub struct DiscountRule {
    pub id: i64,
    pub target: DiscountTarget,
    pub percent: Percent,
    pub window: ActiveWindow,
    pub enabled: bool,
}

impl DiscountRule {
    pub fn new(
        id: i64,
        target: DiscountTarget,
        percent: Percent,
        window: ActiveWindow,
        enabled: bool,
    ) -> Self {
        DiscountRule {
            id,
            target,
            percent,
            window,
            enabled,
        }
    }

    #[inline]
    pub fn scope(&self) -> DiscountScope {
        self.target.scope()
    }

    /// Enabled and inside its window at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.enabled && self.window.contains(now)
    }
}

/// Flat wire shape of a discount rule.
///
/// ## Invariant (checked by `TryFrom`)
/// ```text
///   scope      category_ref   product_ref
///   ─────────  ────────────   ───────────
///   GLOBAL     absent         absent
///   CATEGORY   present        absent
///   PRODUCT    absent         present
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRecord {
    pub id: i64,
    pub scope: DiscountScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_ref: Option<CategoryRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_ref: Option<String>,
    pub percent_bps: u32,
    #[ts(as = "String")]
    pub starts_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub ends_at: DateTime<Utc>,
    pub enabled: bool,
}

impl TryFrom<DiscountRecord> for DiscountRule {
    type Error = ValidationError;

    fn try_from(record: DiscountRecord) -> Result<Self, Self::Error> {
        let target = match (record.scope, record.category_ref, record.product_ref) {
            (DiscountScope::Global, None, None) => DiscountTarget::Global,
            (DiscountScope::Category, Some(category), None) => {
                validate_reference("category_ref", &category.id)?;
                DiscountTarget::Category(category)
            }
            (DiscountScope::Product, None, Some(product)) => {
                validate_reference("product_ref", &product)?;
                DiscountTarget::Product(product)
            }
            (DiscountScope::Category, None, _) => {
                return Err(ValidationError::Required {
                    field: "category_ref".to_string(),
                })
            }
            (DiscountScope::Product, _, None) => {
                return Err(ValidationError::Required {
                    field: "product_ref".to_string(),
                })
            }
            (scope @ (DiscountScope::Global | DiscountScope::Product), Some(_), _) => {
                return Err(ValidationError::Conflicting {
                    field: "category_ref".to_string(),
                    reason: format!("scope is {:?}", scope),
                })
            }
            (scope, _, Some(_)) => {
                return Err(ValidationError::Conflicting {
                    field: "product_ref".to_string(),
                    reason: format!("scope is {:?}", scope),
                })
            }
        };

        Ok(DiscountRule {
            id: record.id,
            target,
            percent: Percent::try_from_bps(record.percent_bps)?,
            window: ActiveWindow::new(record.starts_at, record.ends_at)?,
            enabled: record.enabled,
        })
    }
}

impl From<DiscountRule> for DiscountRecord {
    fn from(rule: DiscountRule) -> Self {
        let scope = rule.scope();
        let (category_ref, product_ref) = match rule.target {
            DiscountTarget::Global => (None, None),
            DiscountTarget::Category(category) => (Some(category), None),
            DiscountTarget::Product(product) => (None, Some(product)),
        };
        DiscountRecord {
            id: rule.id,
            scope,
            category_ref,
            product_ref,
            percent_bps: rule.percent.bps(),
            starts_at: rule.window.starts_at(),
            ends_at: rule.window.ends_at(),
            enabled: rule.enabled,
        }
    }
}

// =============================================================================
// Resolved Discount
// =============================================================================

/// Outcome of resolution for one item. `rule_id` is `None` and `percent` is
/// zero when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDiscount {
    pub rule_id: Option<i64>,
    pub percent: Percent,
    pub scope: Option<DiscountScope>,
}

impl ResolvedDiscount {
    /// No discount.
    pub const NONE: ResolvedDiscount = ResolvedDiscount {
        rule_id: None,
        percent: Percent::zero(),
        scope: None,
    };

    pub fn from_rule(rule: &DiscountRule) -> Self {
        ResolvedDiscount {
            rule_id: Some(rule.id),
            percent: rule.percent,
            scope: Some(rule.scope()),
        }
    }

    pub fn is_none(&self) -> bool {
        self.rule_id.is_none()
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Returns the discount that applies to `item` at `now`.
///
/// Pure and order-independent with respect to `rules`.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use tessera_core::catalog::{CatalogItem, CategoryRef};
/// use tessera_core::discount::{resolve, ActiveWindow, DiscountRule, DiscountTarget};
/// use tessera_core::money::Money;
/// use tessera_core::types::Percent;
///
/// let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
/// let window = ActiveWindow::new(
///     Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap(),
/// ).unwrap();
///
/// let item = CatalogItem::new("tee-01", Money::from_cents(10000)).with_online_category("tops");
/// let rules = vec![
///     DiscountRule::new(1, DiscountTarget::Category(CategoryRef::online("tops")), Percent::from_whole(50), window, true),
///     DiscountRule::new(2, DiscountTarget::Product("tee-01".into()), Percent::from_whole(20), window, true),
/// ];
///
/// let resolved = resolve(&item, &rules, now);
/// assert_eq!(resolved.rule_id, Some(2));
/// assert_eq!(resolved.percent, Percent::from_whole(20));
/// ```
pub fn resolve(item: &CatalogItem, rules: &[DiscountRule], now: DateTime<Utc>) -> ResolvedDiscount {
    rules
        .iter()
        .filter(|rule| rule.is_active_at(now) && rule.target.matches(item))
        .max_by_key(|rule| (rule.scope().priority(), rule.percent, Reverse(rule.id)))
        .map(ResolvedDiscount::from_rule)
        .unwrap_or(ResolvedDiscount::NONE)
}

/// Resolves a discount for each item, in order.
pub fn resolve_all<'a, I>(items: I, rules: &[DiscountRule], now: DateTime<Utc>) -> Vec<ResolvedDiscount>
where
    I: IntoIterator<Item = &'a CatalogItem>,
{
    items
        .into_iter()
        .map(|item| resolve(item, rules, now))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
