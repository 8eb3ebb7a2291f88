//! # API Error Type
//!
//! Unified error type returned to the presentation layer.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tessera POS                            │
//! │                                                                         │
//! │  Presentation                  Hosting layer                            │
//! │  ────────────                  ─────────────                            │
//! │                                                                         │
//! │  {"op": "record_payment", ...}                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Malformed JSON? ──── serde_json::Error ──────────┐              │  │
//! │  │         │                                         │              │  │
//! │  │         ▼                                         ▼              │  │
//! │  │  Business rejection? ── CoreError::Overpayment ── ApiError ─────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ───────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  {                                                                      │
//! │    "code": "OVERPAYMENT",                                               │
//! │    "message": "Payment $0.01 exceeds amount due $0.00",                 │
//! │    "detail": { "field": "amount", "limit": 0, "actual": 1 }             │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tessera_core::{CoreError, Money, ValidationError};
use thiserror::Error;

use crate::config::CheckoutConfig;

/// API error returned from every engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Structured detail for precise UI messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ErrorDetail>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Cash tendered below the total
    InsufficientTender,

    /// Requested variant not in the catalog snapshot
    UnknownVariant,

    /// Requested quantity below 1
    InvalidQuantity,

    /// Requested quantity above stock
    InsufficientStock,

    /// Nothing requested although something is purchasable
    EmptyOrder,

    /// Nothing requested and nothing purchasable
    SoldOut,

    /// Payment of zero or less
    NonPositiveAmount,

    /// Payment above the amount due
    Overpayment,

    /// Payment against a cancelled or refunded order
    OrderClosed,

    /// Snapshot data breaks a data-model invariant (upstream corruption)
    InvalidInput,

    /// Request envelope could not be parsed
    InvalidRequest,

    /// Internal error
    Internal,
}

/// Field, limit and actual value behind a rejection.
///
/// Money limits and values are in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub field: String,

    /// Variant the rejection refers to, as `size/color`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<i64>,
}

impl ErrorDetail {
    pub fn new(field: impl Into<String>) -> Self {
        ErrorDetail {
            field: field.into(),
            variant: None,
            limit: None,
            actual: None,
        }
    }

    pub fn with_variant(mut self, variant: impl ToString) -> Self {
        self.variant = Some(variant.to_string());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_actual(mut self, actual: i64) -> Self {
        self.actual = Some(actual);
        self
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            detail: None,
        }
    }

    /// Attaches structured detail.
    pub fn with_detail(mut self, detail: ErrorDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidRequest, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Converts a core rejection, rendering amounts in the store currency.
    pub fn from_core(err: CoreError, config: &CheckoutConfig) -> Self {
        let money = |m: Money| config.format_currency(m);

        match err {
            CoreError::InsufficientTender { total, tendered } => ApiError::new(
                ErrorCode::InsufficientTender,
                format!("Tendered {} is less than total {}", money(tendered), money(total)),
            )
            .with_detail(
                ErrorDetail::new("tendered")
                    .with_limit(total.cents())
                    .with_actual(tendered.cents()),
            ),
            CoreError::UnknownVariant { variant } => ApiError::new(
                ErrorCode::UnknownVariant,
                format!("Variant {} does not exist", variant),
            )
            .with_detail(ErrorDetail::new("variant").with_variant(&variant)),
            CoreError::InvalidQuantity { variant, quantity } => ApiError::new(
                ErrorCode::InvalidQuantity,
                format!("Quantity for variant {} must be at least 1, got {}", variant, quantity),
            )
            .with_detail(
                ErrorDetail::new("quantity")
                    .with_variant(&variant)
                    .with_limit(1)
                    .with_actual(quantity),
            ),
            CoreError::InsufficientStock {
                variant,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Cannot order more than available stock ({}) for variant {}",
                    available, variant
                ),
            )
            .with_detail(
                ErrorDetail::new("quantity")
                    .with_variant(&variant)
                    .with_limit(available)
                    .with_actual(requested),
            ),
            CoreError::EmptyOrder { item_id } => ApiError::new(
                ErrorCode::EmptyOrder,
                format!("Select at least one variant of {}", item_id),
            )
            .with_detail(ErrorDetail::new("requested").with_limit(1).with_actual(0)),
            CoreError::SoldOut { item_id } => ApiError::new(
                ErrorCode::SoldOut,
                format!("{} is sold out", item_id),
            )
            .with_detail(ErrorDetail::new("stockAvailable").with_actual(0)),
            CoreError::NonPositiveAmount { amount } => ApiError::new(
                ErrorCode::NonPositiveAmount,
                format!("Payment amount must be positive, got {}", money(amount)),
            )
            .with_detail(ErrorDetail::new("amount").with_limit(1).with_actual(amount.cents())),
            CoreError::Overpayment { amount, amount_due } => ApiError::new(
                ErrorCode::Overpayment,
                format!("Payment {} exceeds amount due {}", money(amount), money(amount_due)),
            )
            .with_detail(
                ErrorDetail::new("amount")
                    .with_limit(amount_due.cents())
                    .with_actual(amount.cents()),
            ),
            CoreError::OrderClosed { order_id, status } => ApiError::new(
                ErrorCode::OrderClosed,
                format!("Order {} is {} and cannot take payments", order_id, status),
            )
            .with_detail(ErrorDetail::new("status")),
            CoreError::Validation(e) => {
                let detail = validation_detail(&e);
                ApiError::new(ErrorCode::InvalidInput, e.to_string()).with_detail(detail)
            }
        }
    }
}

fn validation_detail(err: &ValidationError) -> ErrorDetail {
    match err {
        ValidationError::OutOfRange {
            field,
            min,
            max,
            actual,
        } => {
            let limit = if actual < min { *min } else { *max };
            ErrorDetail::new(field.as_str()).with_limit(limit).with_actual(*actual)
        }
        ValidationError::LengthMismatch {
            field,
            expected,
            actual,
        } => ErrorDetail::new(field.as_str())
            .with_limit(*expected as i64)
            .with_actual(*actual as i64),
        ValidationError::Required { field }
        | ValidationError::Overflow { field }
        | ValidationError::InvalidFormat { field, .. }
        | ValidationError::Conflicting { field, .. }
        | ValidationError::Duplicate { field, .. } => ErrorDetail::new(field.as_str()),
    }
}

/// Converts core errors using the default currency formatting.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::from_core(err, &CheckoutConfig::default())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::invalid_request(format!("Malformed request: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Config Error
// =============================================================================

/// Errors raised while loading `checkout.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid checkout configuration: {0}")]
    Invalid(String),
}
