//! # Error Types
//!
//! Domain-specific error types for tessera-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tessera-core errors (this file)                                       │
//! │  ├── CoreError        - Business rejections (tender, stock, payment)   │
//! │  ├── ValidationError  - Corrupt or malformed input from collaborators  │
//! │  └── CouponRejection  - Why a coupon was ignored (not a failure)       │
//! │                                                                         │
//! │  tessera-checkout errors (separate crate)                              │
//! │  └── ApiError         - What the presentation layer sees (serialized)  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → UI message             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Every rejection is a typed variant, never a String or a panic
//! 2. Each variant carries the field, the limit and the actual value so the
//!    UI can render a precise message
//! 3. Rejections are recoverable: the caller re-prompts and calls again

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use crate::catalog::VariantKey;
use crate::money::Money;
use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business rejections raised by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Cash tendered is below the total.
    ///
    /// ## User Workflow
    /// ```text
    /// Total $194.85, customer hands over $50.00
    ///      │
    ///      ▼
    /// InsufficientTender { total: 19485, tendered: 5000 }
    ///      │
    ///      ▼
    /// UI re-prompts: "Tendered $50.00 is less than total $194.85"
    /// ```
    #[error("Tendered {tendered} is less than total {total}")]
    InsufficientTender { total: Money, tendered: Money },

    /// Requested variant does not exist for the item.
    #[error("Unknown variant {variant}")]
    UnknownVariant { variant: VariantKey },

    /// Requested quantity is below 1.
    #[error("Invalid quantity {quantity} for variant {variant}")]
    InvalidQuantity { variant: VariantKey, quantity: i64 },

    /// Requested quantity exceeds the variant's stock.
    #[error("Cannot order more than available stock ({available}) for variant {variant}: requested {requested}")]
    InsufficientStock {
        variant: VariantKey,
        available: i64,
        requested: i64,
    },

    /// Nothing was requested although the item has purchasable variants.
    #[error("No variants selected for item {item_id}")]
    EmptyOrder { item_id: String },

    /// Nothing was requested and no variant of the item has stock.
    #[error("Item {item_id} has no variant in stock")]
    SoldOut { item_id: String },

    /// Payment amount is zero or negative.
    #[error("Payment amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Money },

    /// Payment exceeds what is still owed.
    #[error("Payment {amount} exceeds amount due {amount_due}")]
    Overpayment { amount: Money, amount_due: Money },

    /// Order is cancelled or refunded; its balance is frozen.
    #[error("Order {order_id} is {status}, cannot record payment")]
    OrderClosed { order_id: String, status: OrderStatus },

    /// Input from a collaborator violates a data-model invariant.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true when the input itself is corrupt (upstream data problem),
    /// as opposed to a business rejection the user can correct.
    pub fn is_corrupt_input(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a snapshot handed to the engine breaks an invariant of
/// the data model (negative price, percent above 100%, rule with both a
/// category and a product reference, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    /// A sum or product of amounts does not fit in `i64` cents.
    #[error("{field} exceeds the largest representable amount")]
    Overflow { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Field must not be set in this context.
    #[error("{field} must not be set when {reason}")]
    Conflicting { field: String, reason: String },

    /// Two parallel collections differ in length.
    #[error("{field} has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// Duplicate value.
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Coupon Rejection
// =============================================================================

/// Why a coupon was not applied.
///
/// Not a failure of the pricing call: checkout proceeds without the coupon
/// and the reason is reported in the pricing result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, TS)]
#[ts(export)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponRejection {
    /// `now` is after the coupon's expiry.
    #[error("Coupon expired at {expiry}")]
    Expired {
        #[ts(as = "String")]
        expiry: DateTime<Utc>,
        #[ts(as = "String")]
        now: DateTime<Utc>,
    },

    /// Subtotal is below the coupon's minimum purchase.
    #[error("Coupon requires a minimum purchase of {min_purchase}, subtotal is {subtotal}")]
    #[serde(rename_all = "camelCase")]
    BelowMinimum { min_purchase: Money, subtotal: Money },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
