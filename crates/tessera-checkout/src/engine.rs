//! # Checkout Engine
//!
//! The operations a checkout, preorder or balance screen invokes. Each one
//! reads `now` from the injected [`Clock`], calls into `tessera-core`, logs
//! the outcome and maps rejections to [`ApiError`].
//!
//! ## Operation Map
//! ```text
//! ┌──────────────────────┬────────────────────────────────────────────────┐
//! │ Operation            │ Core call                                      │
//! ├──────────────────────┼────────────────────────────────────────────────┤
//! │ resolve_discount     │ discount::resolve                              │
//! │ quote                │ discount::resolve (per line) + price_cart      │
//! │ tender_cash          │ pricing::tender_cash                           │
//! │ quote_preorder       │ allocation::allocate + resolve + price_cart    │
//! │ clamp_quantity       │ allocation::clamp_to_stock                     │
//! │ record_payment       │ settlement::apply_payment                      │
//! │ pay_full             │ settlement::pay_full_amount                    │
//! └──────────────────────┴────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tessera_core::allocation::{allocate, clamp_to_stock, Allocation};
use tessera_core::cart::{Cart, CartLine, Coupon};
use tessera_core::catalog::{CatalogItem, Variant, VariantKey};
use tessera_core::discount::{resolve, DiscountRule, ResolvedDiscount};
use tessera_core::pricing::{price_cart, tender_cash, CashTender, CouponOutcome, PricingResult};
use tessera_core::settlement::{apply_payment, pay_full_amount, SettlementOutcome};
use tessera_core::{CoreError, Money, Order};
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::CheckoutConfig;
use crate::error::ApiError;

// =============================================================================
// Requests & Results
// =============================================================================

/// One catalog item and the quantity being bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLine {
    pub item: CatalogItem,
    pub quantity: i64,
}

/// A live cart to price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub lines: Vec<QuoteLine>,
    /// Discount rules snapshot.
    #[serde(default)]
    pub rules: Vec<DiscountRule>,
    #[serde(default)]
    pub coupon: Option<Coupon>,
}

/// A preorder to allocate and price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreorderRequest {
    pub item: CatalogItem,
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub requested: BTreeMap<VariantKey, i64>,
    #[serde(default)]
    pub select_all: bool,
    #[serde(default)]
    pub rules: Vec<DiscountRule>,
    #[serde(default)]
    pub coupon: Option<Coupon>,
}

/// A validated preorder and its price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreorderQuote {
    pub allocation: Allocation,
    pub pricing: PricingResult,
}

// =============================================================================
// Engine
// =============================================================================

/// Checkout operations bound to a configuration and a clock.
#[derive(Debug, Clone)]
pub struct CheckoutEngine<C: Clock = SystemClock> {
    config: CheckoutConfig,
    clock: C,
}

impl CheckoutEngine<SystemClock> {
    /// Creates an engine reading wall-clock time.
    pub fn new(config: CheckoutConfig) -> Self {
        CheckoutEngine::with_clock(config, SystemClock)
    }
}

impl<C: Clock> CheckoutEngine<C> {
    /// Creates an engine with an explicit clock.
    pub fn with_clock(config: CheckoutConfig, clock: C) -> Self {
        CheckoutEngine { config, clock }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Resolves the discount for one item at the current time.
    pub fn resolve_discount(&self, item: &CatalogItem, rules: &[DiscountRule]) -> ResolvedDiscount {
        let resolved = resolve(item, rules, self.clock.now());
        debug!(
            item_id = %item.id,
            rule_id = ?resolved.rule_id,
            percent = %resolved.percent,
            "Discount resolved"
        );
        resolved
    }

    /// Prices a live cart at the configured tax rate.
    pub fn quote(&self, request: &QuoteRequest) -> Result<PricingResult, ApiError> {
        debug!(lines = request.lines.len(), rules = request.rules.len(), "Quoting cart");

        let now = self.clock.now();
        let discounts: Vec<ResolvedDiscount> = request
            .lines
            .iter()
            .map(|line| resolve(&line.item, &request.rules, now))
            .collect();
        let lines = request
            .lines
            .iter()
            .map(|line| CartLine::for_item(&line.item, line.quantity))
            .collect();
        let cart = Cart {
            lines,
            coupon: request.coupon.clone(),
        };

        self.price(&cart, &discounts)
    }

    /// Computes change for a cash payment.
    pub fn tender_cash(&self, total: Money, tendered: Money) -> Result<CashTender, ApiError> {
        debug!(total = total.cents(), tendered = tendered.cents(), "Cash tender");

        let tender = tender_cash(total, tendered).map_err(|e| self.reject("tender_cash", e))?;
        info!(change = tender.change.cents(), "Cash tender accepted");
        Ok(tender)
    }

    /// Allocates a preorder against stock and prices the result.
    pub fn quote_preorder(&self, request: &PreorderRequest) -> Result<PreorderQuote, ApiError> {
        debug!(
            item_id = %request.item.id,
            variants = request.variants.len(),
            requested = request.requested.len(),
            select_all = request.select_all,
            "Quoting preorder"
        );

        let allocation = allocate(&request.item, &request.variants, &request.requested, request.select_all)
            .map_err(|e| self.reject("quote_preorder", e))?;
        info!(
            item_id = %request.item.id,
            lines = allocation.lines.len(),
            total = allocation.total.cents(),
            "Preorder allocated"
        );

        let resolved = resolve(&request.item, &request.rules, self.clock.now());
        let discounts = vec![resolved; allocation.lines.len()];
        let mut cart = allocation.clone().into_cart();
        cart.coupon = request.coupon.clone();
        let pricing = self.price(&cart, &discounts)?;

        Ok(PreorderQuote { allocation, pricing })
    }

    /// Advisory clamp for quantity editors.
    pub fn clamp_quantity(&self, variant: &Variant, quantity: i64) -> i64 {
        let clamped = clamp_to_stock(variant, quantity);
        if clamped != quantity {
            debug!(
                variant = %variant.key(),
                requested = quantity,
                clamped,
                "Quantity clamped to stock"
            );
        }
        clamped
    }

    /// Records a payment against an order snapshot.
    pub fn record_payment(&self, order: &Order, amount: Money) -> Result<SettlementOutcome, ApiError> {
        debug!(order_id = %order.id, amount = amount.cents(), "Recording payment");

        let outcome = apply_payment(order, amount).map_err(|e| self.reject("record_payment", e))?;
        self.log_settlement(order, &outcome);
        Ok(outcome)
    }

    /// Pays exactly the amount due.
    pub fn pay_full(&self, order: &Order) -> Result<SettlementOutcome, ApiError> {
        debug!(order_id = %order.id, amount_due = order.amount_due().cents(), "Paying full balance");

        let outcome = pay_full_amount(order).map_err(|e| self.reject("pay_full", e))?;
        self.log_settlement(order, &outcome);
        Ok(outcome)
    }

    fn price(&self, cart: &Cart, discounts: &[ResolvedDiscount]) -> Result<PricingResult, ApiError> {
        let result = price_cart(cart, discounts, self.config.tax_rate(), self.clock.now())
            .map_err(|e| self.reject("quote", e))?;

        if let Some(CouponOutcome::Rejected { code, reason }) = &result.coupon {
            warn!(coupon = %code, reason = %reason, "Coupon rejected, pricing without it");
        }
        info!(
            store = %self.config.store.name,
            subtotal = result.subtotal.cents(),
            discount = result.discount_amount.cents(),
            tax = result.tax_amount.cents(),
            total = result.total.cents(),
            "Cart priced"
        );
        Ok(result)
    }

    fn log_settlement(&self, order: &Order, outcome: &SettlementOutcome) {
        info!(
            order_id = %order.id,
            amount_paid = outcome.new_amount_paid.cents(),
            amount_due = outcome.amount_due.cents(),
            status = %outcome.new_status,
            "Payment recorded"
        );
    }

    fn reject(&self, operation: &str, err: CoreError) -> ApiError {
        if err.is_corrupt_input() {
            error!(operation, error = %err, "Operation failed on corrupt input");
        } else {
            warn!(operation, error = %err, "Operation rejected");
        }
        ApiError::from_core(err, &self.config)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
