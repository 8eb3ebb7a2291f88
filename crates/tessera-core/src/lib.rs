//! # tessera-core: Order Pricing & Settlement Engine
//!
//! This crate is the **heart** of Tessera POS. It holds the rules every
//! checkout, preorder and balance screen depends on, as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tessera POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Presentation (screens, forms, dialogs)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON requests                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               tessera-checkout (hosting layer)                  │   │
//! │  │     config, clock, logging, ApiError, request dispatch          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tessera-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   catalog + rules ──► discount ──► pricing ──► settlement      │   │
//! │  │                                      ▲                          │   │
//! │  │                  variants ──► allocation (preorders)            │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO LOGGING • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`discount`] - Discount Resolver (PRODUCT > CATEGORY > GLOBAL)
//! - [`pricing`] - Cart Pricing Calculator and cash tender
//! - [`allocation`] - Stock-aware preorder allocation
//! - [`settlement`] - Balance settlement state machine
//! - [`catalog`], [`cart`], [`types`] - Snapshot and result types
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validators
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, bit for bit
//! 2. **Injected Time**: `now` is always a parameter
//! 3. **Integer Money**: cents in `i64`, rates in basis points
//! 4. **Explicit Errors**: every rejection is a typed [`CoreError`] variant
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use tessera_core::cart::{Cart, CartLine};
//! use tessera_core::discount::ResolvedDiscount;
//! use tessera_core::money::Money;
//! use tessera_core::pricing::price_cart;
//! use tessera_core::types::TaxRate;
//!
//! let cart = Cart::new(vec![CartLine::new("tee-01", Money::from_cents(1099), 1)]);
//! let result = price_cart(&cart, &[ResolvedDiscount::NONE], TaxRate::from_bps(825), Utc::now()).unwrap();
//!
//! // Tax on $10.99 at 8.25% = $0.91 (rounded half-up)
//! assert_eq!(result.tax_amount.cents(), 91);
//! assert_eq!(result.total.cents(), 1190);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod cart;
pub mod catalog;
pub mod discount;
pub mod error;
pub mod money;
pub mod pricing;
pub mod settlement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tessera_core::Money` instead of
// `use tessera_core::money::Money`

pub use allocation::{allocate, clamp_to_stock, Allocation};
pub use cart::{Cart, CartLine, Coupon, CouponKind};
pub use catalog::{CatalogItem, CategoryRef, Variant, VariantKey};
pub use discount::{resolve, DiscountRule, DiscountScope, ResolvedDiscount};
pub use error::{CoreError, CoreResult, CouponRejection, ValidationError};
pub use money::Money;
pub use pricing::{price_cart, tender_cash, CashTender, PricingResult};
pub use settlement::{apply_payment, pay_full_amount, SettlementOutcome};
pub use types::*;
