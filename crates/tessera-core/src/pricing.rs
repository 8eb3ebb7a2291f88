//! # Cart Pricing Calculator
//!
//! Turns a cart, its resolved line discounts, an optional coupon and a tax
//! rate into monetary totals.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      price_cart(cart, discounts, rate, now)             │
//! │                                                                         │
//! │  subtotal  = Σ unit_price × quantity                                    │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  coupon valid? (now ≤ expiry AND subtotal ≥ min_purchase)               │
//! │      │                                                                  │
//! │      ├── yes ──► discount = coupon         (line discounts ignored)     │
//! │      │             PERCENT       subtotal × value                       │
//! │      │             FIXED         min(value, subtotal)                   │
//! │      │             FREE_SHIPPING 0                                      │
//! │      │                                                                  │
//! │      └── no / none ──► discount = Σ line_total × line percent           │
//! │                                                                         │
//! │  taxable   = max(subtotal − discount, 0)                                │
//! │  tax       = taxable × rate                                             │
//! │  total     = taxable + tax                                              │
//! │                                                                         │
//! │  Each derived field is rounded half-up ONCE, from the exact sum.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example: Subtotal $200, coupon SAVE20 (FIXED $20, min $150), tax 8.25%
//! ```text
//!   discount  = 20.00
//!   taxable   = 180.00
//!   tax       = 14.85
//!   total     = 194.85
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartLine, Coupon, CouponKind};
use crate::catalog::VariantKey;
use crate::discount::ResolvedDiscount;
use crate::error::{CoreError, CoreResult, CouponRejection, ValidationError};
use crate::money::{round_bps_product, Money};
use crate::types::{Percent, TaxRate};
use crate::validation::{
    checked_lines_total, validate_line_quantity, validate_percent_bps, validate_price, validate_sum_fits,
    validate_tax_rate_bps,
};

// =============================================================================
// Result Types
// =============================================================================

/// Per-line figures for receipts and cart displays.
///
/// `discount_amount` is rounded per line for display. The cart-level
/// `PricingResult::discount_amount` is rounded once over the exact sum, so
/// the two can differ by a cent on carts with many fractional discounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineBreakdown {
    pub catalog_item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub variant: Option<VariantKey>,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
    pub discount_rule_id: Option<i64>,
    pub discount_percent: Percent,
    pub discount_amount: Money,
}

/// Which discount source produced `discount_amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "source", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppliedDiscount {
    /// Nothing discounted.
    None,
    /// Per-line catalog rules.
    CatalogRules,
    /// A cart-wide coupon overrode the line rules.
    Coupon { code: String, kind: CouponKind },
}

/// What happened to the cart's coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponOutcome {
    Applied { code: String },
    Rejected { code: String, reason: CouponRejection },
}

/// Monetary totals of a cart. All amounts are non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub taxable_amount: Money,
    pub tax_rate: TaxRate,
    pub tax_amount: Money,
    pub total: Money,
    pub lines: Vec<LineBreakdown>,
    pub applied_discount: AppliedDiscount,
    /// `None` when the cart carried no coupon.
    pub coupon: Option<CouponOutcome>,
}

impl PricingResult {
    /// Settles this total with cash. See [`tender_cash`].
    pub fn tender_cash(&self, tendered: Money) -> CoreResult<CashTender> {
        tender_cash(self.total, tendered)
    }
}

/// Result of a successful cash tender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashTender {
    pub total: Money,
    pub tendered: Money,
    /// `tendered − total`, never negative.
    pub change: Money,
}

// =============================================================================
// Coupon Evaluation
// =============================================================================

/// Checks a coupon against the cart subtotal and the current time.
///
/// Expiry is checked first; `now == expiry` is still valid.
pub fn evaluate_coupon(coupon: &Coupon, subtotal: Money, now: DateTime<Utc>) -> Result<(), CouponRejection> {
    if now > coupon.expiry {
        return Err(CouponRejection::Expired {
            expiry: coupon.expiry,
            now,
        });
    }

    if subtotal < coupon.min_purchase {
        return Err(CouponRejection::BelowMinimum {
            min_purchase: coupon.min_purchase,
            subtotal,
        });
    }

    Ok(())
}

/// Discount granted by a valid coupon on `subtotal`.
pub fn coupon_discount(kind: CouponKind, subtotal: Money) -> Money {
    match kind {
        CouponKind::Percent(percent) => subtotal.percentage(percent),
        CouponKind::Fixed(value) => value.min(subtotal),
        CouponKind::FreeShipping => Money::zero(),
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Prices a cart.
///
/// `discounts` holds one resolved catalog discount per cart line, in line
/// order. A valid coupon replaces them for the whole cart; an invalid one is
/// reported in [`PricingResult::coupon`] and treated as absent.
///
/// ## Errors
/// Only corrupt input fails the call ([`CoreError::Validation`]): a negative
/// price, a quantity below 1, a rate above 100%, a `discounts` slice whose
/// length differs from the line count, or amounts whose subtotal or total
/// does not fit in `i64` cents.
pub fn price_cart(
    cart: &Cart,
    discounts: &[ResolvedDiscount],
    tax_rate: TaxRate,
    now: DateTime<Utc>,
) -> CoreResult<PricingResult> {
    let subtotal = validate_cart(cart, discounts, tax_rate)?;

    let (coupon_outcome, applied_coupon) = match &cart.coupon {
        None => (None, None),
        Some(coupon) => match evaluate_coupon(coupon, subtotal, now) {
            Ok(()) => (
                Some(CouponOutcome::Applied {
                    code: coupon.code.clone(),
                }),
                Some(coupon),
            ),
            Err(rejection) => (
                Some(CouponOutcome::Rejected {
                    code: coupon.code.clone(),
                    reason: rejection,
                }),
                None,
            ),
        },
    };

    let (discount_amount, lines, applied_discount) = match applied_coupon {
        Some(coupon) => {
            let lines = cart
                .lines
                .iter()
                .map(|line| breakdown(line, &ResolvedDiscount::NONE))
                .collect();
            let applied = AppliedDiscount::Coupon {
                code: coupon.code.clone(),
                kind: coupon.kind,
            };
            (coupon_discount(coupon.kind, subtotal), lines, applied)
        }
        None => {
            let raw: i128 = cart
                .lines
                .iter()
                .zip(discounts)
                .map(|(line, d)| line.line_total().bps_product(d.percent.bps()))
                .sum();
            let lines: Vec<LineBreakdown> = cart
                .lines
                .iter()
                .zip(discounts)
                .map(|(line, d)| breakdown(line, d))
                .collect();
            let applied = if discounts.iter().any(|d| !d.is_none()) {
                AppliedDiscount::CatalogRules
            } else {
                AppliedDiscount::None
            };
            (round_bps_product(raw), lines, applied)
        }
    };

    let taxable_amount = subtotal.saturating_sub_floor(discount_amount);
    let discount_amount = subtotal - taxable_amount;
    let tax_amount = taxable_amount.calculate_tax(tax_rate);
    let total = taxable_amount + tax_amount;

    Ok(PricingResult {
        subtotal,
        discount_amount,
        taxable_amount,
        tax_rate,
        tax_amount,
        total,
        lines,
        applied_discount,
        coupon: coupon_outcome,
    })
}

/// Cash tender: returns the change, or rejects when `tendered < total`.
///
/// A negative `total` or `tendered` is corrupt input.
///
/// ```rust
/// use tessera_core::money::Money;
/// use tessera_core::pricing::tender_cash;
///
/// let ok = tender_cash(Money::from_cents(19485), Money::from_cents(20000)).unwrap();
/// assert_eq!(ok.change.cents(), 515);
///
/// assert!(tender_cash(Money::from_cents(19485), Money::from_cents(5000)).is_err());
/// ```
pub fn tender_cash(total: Money, tendered: Money) -> CoreResult<CashTender> {
    validate_price("total", total)?;
    validate_price("tendered", tendered)?;

    if tendered < total {
        return Err(CoreError::InsufficientTender { total, tendered });
    }

    Ok(CashTender {
        total,
        tendered,
        change: tendered - total,
    })
}

fn breakdown(line: &CartLine, discount: &ResolvedDiscount) -> LineBreakdown {
    let line_total = line.line_total();
    LineBreakdown {
        catalog_item_id: line.catalog_item_id.clone(),
        variant: line.variant.clone(),
        quantity: line.quantity,
        unit_price: line.unit_price,
        line_total,
        discount_rule_id: discount.rule_id,
        discount_percent: discount.percent,
        discount_amount: line_total.percentage(discount.percent),
    }
}

/// Returns the checked subtotal.
fn validate_cart(cart: &Cart, discounts: &[ResolvedDiscount], tax_rate: TaxRate) -> CoreResult<Money> {
    validate_tax_rate_bps(tax_rate.bps())?;

    if discounts.len() != cart.lines.len() {
        return Err(ValidationError::LengthMismatch {
            field: "discounts".to_string(),
            expected: cart.lines.len(),
            actual: discounts.len(),
        }
        .into());
    }

    for line in &cart.lines {
        validate_price("unit_price", line.unit_price)?;
        validate_line_quantity(line.quantity)?;
    }

    if let Some(coupon) = &cart.coupon {
        validate_price("min_purchase", coupon.min_purchase)?;
        match coupon.kind {
            CouponKind::Fixed(value) => validate_price("coupon value", value)?,
            CouponKind::Percent(percent) => validate_percent_bps(percent.bps())?,
            CouponKind::FreeShipping => {}
        }
    }

    // taxable ≤ subtotal, so the total is bounded by subtotal plus its tax.
    let subtotal = checked_lines_total("subtotal", cart.lines.iter().map(|l| (l.unit_price, l.quantity)))?;
    validate_sum_fits("total", subtotal, subtotal.calculate_tax(tax_rate))?;

    Ok(subtotal)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn percent_off(rule_id: i64, whole: u32) -> ResolvedDiscount {
        ResolvedDiscount {
            rule_id: Some(rule_id),
            percent: Percent::from_whole(whole),
            scope: None,
        }
    }

    fn save20() -> Coupon {
        Coupon::new(
            "SAVE20",
            CouponKind::Fixed(Money::from_cents(2000)),
            Money::from_cents(15000),
            now() + Duration::days(7),
        )
    }

    fn two_hundred_dollar_cart() -> Cart {
        Cart::new(vec![
            CartLine::new("tee-01", Money::from_cents(5000), 2),
            CartLine::new("mug-02", Money::from_cents(10000), 1),
        ])
    }

    #[test]
    fn test_fixed_coupon_with_tax() {
        let cart = two_hundred_dollar_cart().with_coupon(save20());
        let discounts = [ResolvedDiscount::NONE; 2];

        let result = price_cart(&cart, &discounts, TaxRate::from_bps(825), now()).unwrap();

        assert_eq!(result.subtotal.cents(), 20000);
        assert_eq!(result.discount_amount.cents(), 2000);
        assert_eq!(result.taxable_amount.cents(), 18000);
        assert_eq!(result.tax_amount.cents(), 1485);
        assert_eq!(result.total.cents(), 19485);
        assert_eq!(
            result.coupon,
            Some(CouponOutcome::Applied {
                code: "SAVE20".into()
            })
        );
    }

    #[test]
    fn test_coupon_overrides_line_discounts() {
        let cart = two_hundred_dollar_cart().with_coupon(save20());
        let discounts = [percent_off(1, 50), percent_off(2, 50)];

        let result = price_cart(&cart, &discounts, TaxRate::zero(), now()).unwrap();

        assert_eq!(result.discount_amount.cents(), 2000);
        assert!(result.lines.iter().all(|l| l.discount_amount.is_zero()));
        assert!(matches!(result.applied_discount, AppliedDiscount::Coupon { .. }));
    }

    #[test]
    fn test_expired_coupon_is_treated_as_absent() {
        let mut coupon = save20();
        coupon.expiry = now() - Duration::seconds(1);
        let cart = two_hundred_dollar_cart().with_coupon(coupon);
        let discounts = [percent_off(1, 10), ResolvedDiscount::NONE];

        let result = price_cart(&cart, &discounts, TaxRate::zero(), now()).unwrap();

        // 10% of the $100 tee line only
        assert_eq!(result.discount_amount.cents(), 1000);
        assert_eq!(result.applied_discount, AppliedDiscount::CatalogRules);
        assert!(matches!(
            result.coupon,
            Some(CouponOutcome::Rejected {
                reason: CouponRejection::Expired { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_coupon_valid_at_exact_expiry() {
        let mut coupon = save20();
        coupon.expiry = now();
        assert!(evaluate_coupon(&coupon, Money::from_cents(20000), now()).is_ok());
    }

    #[test]
    fn test_coupon_below_minimum_purchase() {
        let cart = Cart::new(vec![CartLine::new("tee-01", Money::from_cents(9000), 1)])
            .with_coupon(save20());

        let result = price_cart(&cart, &[ResolvedDiscount::NONE], TaxRate::zero(), now()).unwrap();

        assert!(result.discount_amount.is_zero());
        assert_eq!(result.total.cents(), 9000);
        assert_eq!(result.applied_discount, AppliedDiscount::None);
        assert_eq!(
            result.coupon,
            Some(CouponOutcome::Rejected {
                code: "SAVE20".into(),
                reason: CouponRejection::BelowMinimum {
                    min_purchase: Money::from_cents(15000),
                    subtotal: Money::from_cents(9000),
                },
            })
        );
    }

    #[test]
    fn test_percent_coupon() {
        let coupon = Coupon::new(
            "TENOFF",
            CouponKind::Percent(Percent::from_whole(10)),
            Money::zero(),
            now(),
        );
        let cart = two_hundred_dollar_cart().with_coupon(coupon);

        let result = price_cart(&cart, &[ResolvedDiscount::NONE; 2], TaxRate::zero(), now()).unwrap();
        assert_eq!(result.discount_amount.cents(), 2000);
        assert_eq!(result.total.cents(), 18000);
    }

    #[test]
    fn test_fixed_coupon_never_goes_negative() {
        let coupon = Coupon::new(
            "BIG",
            CouponKind::Fixed(Money::from_cents(50000)),
            Money::zero(),
            now(),
        );
        let cart = Cart::new(vec![CartLine::new("tee-01", Money::from_cents(1200), 1)]).with_coupon(coupon);

        let result = price_cart(&cart, &[ResolvedDiscount::NONE], TaxRate::from_bps(825), now()).unwrap();
        assert_eq!(result.discount_amount.cents(), 1200);
        assert!(result.taxable_amount.is_zero());
        assert!(result.tax_amount.is_zero());
        assert!(result.total.is_zero());
    }

    #[test]
    fn test_free_shipping_coupon_is_applied_without_discount() {
        let coupon = Coupon::new("SHIPFREE", CouponKind::FreeShipping, Money::zero(), now());
        let cart = two_hundred_dollar_cart().with_coupon(coupon);
        let discounts = [percent_off(1, 50), ResolvedDiscount::NONE];

        let result = price_cart(&cart, &discounts, TaxRate::zero(), now()).unwrap();
        assert!(result.discount_amount.is_zero());
        assert_eq!(result.total.cents(), 20000);
        assert!(matches!(
            result.applied_discount,
            AppliedDiscount::Coupon {
                kind: CouponKind::FreeShipping,
                ..
            }
        ));
    }

    #[test]
    fn test_no_discount_total_is_subtotal_plus_tax() {
        let cart = two_hundred_dollar_cart();
        let result = price_cart(&cart, &[ResolvedDiscount::NONE; 2], TaxRate::from_bps(1000), now()).unwrap();

        assert!(result.discount_amount.is_zero());
        assert_eq!(result.tax_amount.cents(), 2000);
        assert_eq!(result.total.cents(), 22000);
        assert_eq!(result.coupon, None);
    }

    #[test]
    fn test_line_discounts_round_once_over_the_sum() {
        // Three 5-cent lines at 50%: each line is 2.5 cents.
        // Per-line display rounds to 3 each, the cart rounds 7.5 → 8 once.
        let cart = Cart::new(vec![
            CartLine::new("a", Money::from_cents(5), 1),
            CartLine::new("b", Money::from_cents(5), 1),
            CartLine::new("c", Money::from_cents(5), 1),
        ]);
        let discounts = [percent_off(1, 50), percent_off(1, 50), percent_off(1, 50)];

        let result = price_cart(&cart, &discounts, TaxRate::zero(), now()).unwrap();
        assert_eq!(result.discount_amount.cents(), 8);
        assert!(result.lines.iter().all(|l| l.discount_amount.cents() == 3));
        assert_eq!(result.total.cents(), 7);
    }

    #[test]
    fn test_pricing_is_deterministic() {
        let cart = two_hundred_dollar_cart().with_coupon(save20());
        let discounts = [percent_off(1, 15), percent_off(2, 5)];

        let first = price_cart(&cart, &discounts, TaxRate::from_bps(825), now()).unwrap();
        let second = price_cart(&cart, &discounts, TaxRate::from_bps(825), now()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_corrupt_input_is_rejected() {
        let cart = two_hundred_dollar_cart();

        let err = price_cart(&cart, &[ResolvedDiscount::NONE], TaxRate::zero(), now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::LengthMismatch { expected: 2, actual: 1, .. })
        ));

        let negative = Cart::new(vec![CartLine::new("a", Money::from_cents(-1), 1)]);
        let err = price_cart(&negative, &[ResolvedDiscount::NONE], TaxRate::zero(), now()).unwrap_err();
        assert!(err.is_corrupt_input());

        let zero_qty = Cart::new(vec![CartLine::new("a", Money::from_cents(100), 0)]);
        assert!(price_cart(&zero_qty, &[ResolvedDiscount::NONE], TaxRate::zero(), now()).is_err());

        assert!(price_cart(&cart, &[ResolvedDiscount::NONE; 2], TaxRate::from_bps(10_001), now()).is_err());
    }

    #[test]
    fn test_overflowing_line_is_rejected() {
        let cart = Cart::new(vec![CartLine::new("a", Money::from_cents(i64::MAX / 2), 3)]);

        let err = price_cart(&cart, &[ResolvedDiscount::NONE], TaxRate::zero(), now()).unwrap_err();
        assert_eq!(
            err,
            CoreError::Validation(ValidationError::Overflow {
                field: "line_total".into()
            })
        );
    }

    #[test]
    fn test_overflowing_subtotal_is_rejected() {
        let cart = Cart::new(vec![
            CartLine::new("a", Money::from_cents(i64::MAX / 2), 1),
            CartLine::new("b", Money::from_cents(i64::MAX / 2), 1),
            CartLine::new("c", Money::from_cents(2), 1),
        ]);

        let err = price_cart(&cart, &[ResolvedDiscount::NONE; 3], TaxRate::zero(), now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Overflow { ref field }) if field == "subtotal"
        ));
    }

    #[test]
    fn test_total_with_tax_must_fit() {
        let cart = Cart::new(vec![CartLine::new("a", Money::from_cents(i64::MAX - 10), 1)]);

        let err = price_cart(&cart, &[ResolvedDiscount::NONE], TaxRate::from_bps(825), now()).unwrap_err();
        assert!(err.is_corrupt_input());
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Overflow { ref field }) if field == "total"
        ));

        // Untaxed, the same line fits exactly.
        let result = price_cart(&cart, &[ResolvedDiscount::NONE], TaxRate::zero(), now()).unwrap();
        assert_eq!(result.total.cents(), i64::MAX - 10);
    }

    #[test]
    fn test_empty_cart_prices_to_zero() {
        let result = price_cart(&Cart::default(), &[], TaxRate::from_bps(825), now()).unwrap();
        assert!(result.total.is_zero());
        assert!(result.lines.is_empty());
    }

    #[test]
    fn test_tender_cash() {
        let tender = tender_cash(Money::from_cents(19485), Money::from_cents(19485)).unwrap();
        assert!(tender.change.is_zero());

        let err = tender_cash(Money::from_cents(19485), Money::from_cents(5000)).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientTender {
                total: Money::from_cents(19485),
                tendered: Money::from_cents(5000),
            }
        );
    }

    #[test]
    fn test_tender_cash_rejects_negative_amounts() {
        let err = tender_cash(Money::from_cents(-100), Money::from_cents(-50)).unwrap_err();
        assert!(err.is_corrupt_input());
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, actual: -100, .. }) if field == "total"
        ));

        let err = tender_cash(Money::from_cents(100), Money::from_cents(-1)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "tendered"
        ));

        let tender = tender_cash(Money::zero(), Money::zero()).unwrap();
        assert!(tender.change.is_zero());
    }
}
