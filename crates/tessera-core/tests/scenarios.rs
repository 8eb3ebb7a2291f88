//! End-to-end checkout scenarios across resolver, pricing, allocation and
//! settlement.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tessera_core::allocation::allocate;
use tessera_core::cart::{Cart, CartLine, Coupon, CouponKind};
use tessera_core::catalog::{CatalogItem, CategoryRef, Variant, VariantKey};
use tessera_core::discount::{resolve, resolve_all, ActiveWindow, DiscountRule, DiscountTarget};
use tessera_core::error::CoreError;
use tessera_core::money::Money;
use tessera_core::pricing::{price_cart, tender_cash};
use tessera_core::settlement::apply_payment;
use tessera_core::types::{Order, OrderStatus, Percent, TaxRate};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

fn window() -> ActiveWindow {
    ActiveWindow::new(now() - Duration::days(1), now() + Duration::days(1)).unwrap()
}

#[test]
fn test_product_discount_beats_larger_category_discount() {
    let item = CatalogItem::new("tee-01", Money::from_cents(10000)).with_online_category("tops");
    let rules = vec![
        DiscountRule::new(
            1,
            DiscountTarget::Category(CategoryRef::online("tops")),
            Percent::from_whole(50),
            window(),
            true,
        ),
        DiscountRule::new(
            2,
            DiscountTarget::Product("tee-01".into()),
            Percent::from_whole(20),
            window(),
            true,
        ),
    ];

    let resolved = resolve(&item, &rules, now());
    assert_eq!(resolved.rule_id, Some(2));
    assert_eq!(resolved.percent, Percent::from_whole(20));
}

#[test]
fn test_fixed_coupon_checkout_then_short_cash_tender() {
    let items = [
        CatalogItem::new("tee-01", Money::from_cents(5000)),
        CatalogItem::new("mug-02", Money::from_cents(10000)),
    ];
    let cart = Cart::new(vec![
        CartLine::for_item(&items[0], 2),
        CartLine::for_item(&items[1], 1),
    ])
    .with_coupon(Coupon::new(
        "SAVE20",
        CouponKind::Fixed(Money::from_cents(2000)),
        Money::from_cents(15000),
        now() + Duration::days(30),
    ));
    let discounts = resolve_all(&items, &[], now());

    let result = price_cart(&cart, &discounts, TaxRate::from_bps(825), now()).unwrap();
    assert_eq!(result.subtotal.cents(), 20000);
    assert_eq!(result.discount_amount.cents(), 2000);
    assert_eq!(result.taxable_amount.cents(), 18000);
    assert_eq!(result.tax_amount.cents(), 1485);
    assert_eq!(result.total.cents(), 19485);

    let err = tender_cash(result.total, Money::from_cents(5000)).unwrap_err();
    assert_eq!(
        err,
        CoreError::InsufficientTender {
            total: Money::from_cents(19485),
            tendered: Money::from_cents(5000),
        }
    );

    let tender = result.tender_cash(Money::from_cents(20000)).unwrap();
    assert_eq!(tender.change.cents(), 515);
}

#[test]
fn test_preorder_over_stock_is_rejected() {
    let item = CatalogItem::new("hoodie", Money::from_cents(4500));
    let variants = vec![Variant::new("M", "Black", 5)];
    let mut requested = BTreeMap::new();
    requested.insert(VariantKey::new("M", "Black"), 7);

    let err = allocate(&item, &variants, &requested, false).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot order more than available stock (5) for variant M/Black: requested 7"
    );
    assert_eq!(
        err,
        CoreError::InsufficientStock {
            variant: VariantKey::new("M", "Black"),
            available: 5,
            requested: 7,
        }
    );
}

#[test]
fn test_partial_payments_settle_the_order() {
    let order = Order::new("ORD-1", Money::from_cents(30000));

    let first = apply_payment(&order, Money::from_cents(12000)).unwrap();
    assert_eq!(first.new_amount_paid.cents(), 12000);
    assert_eq!(first.new_status, OrderStatus::PartiallyPaid);
    let order = order.with_outcome(&first);

    let second = apply_payment(&order, Money::from_cents(18000)).unwrap();
    assert_eq!(second.new_amount_paid.cents(), 30000);
    assert_eq!(second.new_status, OrderStatus::Completed);
    let order = order.with_outcome(&second);

    let err = apply_payment(&order, Money::from_cents(1)).unwrap_err();
    assert!(matches!(err, CoreError::Overpayment { .. }));
    assert_eq!(order.amount_paid.cents(), 30000);
}

#[test]
fn test_preorder_allocation_feeds_pricing() {
    let item = CatalogItem::new("hoodie", Money::from_cents(4500)).with_inventory_category("7");
    let variants = vec![Variant::new("M", "Black", 5), Variant::new("L", "Black", 2)];
    let rules = vec![DiscountRule::new(
        9,
        DiscountTarget::Category(CategoryRef::inventory("7")),
        Percent::from_whole(10),
        window(),
        true,
    )];

    let allocation = allocate(&item, &variants, &BTreeMap::new(), true).unwrap();
    assert_eq!(allocation.total.cents(), 9000);

    let resolved = resolve(&item, &rules, now());
    let cart = allocation.into_cart();
    let discounts = vec![resolved; cart.line_count()];

    let result = price_cart(&cart, &discounts, TaxRate::zero(), now()).unwrap();
    assert_eq!(result.discount_amount.cents(), 900);
    assert_eq!(result.total.cents(), 8100);
}
