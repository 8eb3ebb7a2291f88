//! # Validation Module
//!
//! Input validation for snapshots handed to the engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation layer                                           │
//! │  ├── Basic format checks, immediate feedback                           │
//! │  └── clamp_to_stock() for quantity editors (advisory only)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: tessera-checkout                                             │
//! │  └── Deserialization (types, variant keys, discount records)           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: tessera-core (THIS MODULE + each component)                  │
//! │  ├── Data-model invariants (prices ≥ 0, rates ≤ 100%)                  │
//! │  └── Business rules (stock, tender, overpayment)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tessera_core::money::Money;
//! use tessera_core::validation::{validate_price, validate_line_quantity};
//!
//! assert!(validate_price("price", Money::from_cents(1099)).is_ok());
//! assert!(validate_line_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Money Validators
// =============================================================================

/// Validates that a price (or any amount that must not go negative) is ≥ 0.
///
/// Zero is allowed (free items).
///
/// ```rust
/// use tessera_core::money::Money;
/// use tessera_core::validation::validate_price;
///
/// assert!(validate_price("price", Money::from_cents(0)).is_ok());
/// assert!(validate_price("price", Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
            actual: amount.cents(),
        });
    }

    Ok(())
}

/// Sums `unit_price × quantity` over `lines`.
///
/// Rejects a line product that does not fit in `i64` cents as
/// `line_total`, and a sum that does not fit as `field`.
///
/// ```rust
/// use tessera_core::money::Money;
/// use tessera_core::validation::checked_lines_total;
///
/// let lines = [(Money::from_cents(4500), 2), (Money::from_cents(100), 1)];
/// assert_eq!(checked_lines_total("total", lines).unwrap().cents(), 9100);
///
/// let huge = [(Money::from_cents(i64::MAX / 2), 3)];
/// assert!(checked_lines_total("total", huge).is_err());
/// ```
pub fn checked_lines_total<I>(field: &str, lines: I) -> ValidationResult<Money>
where
    I: IntoIterator<Item = (Money, i64)>,
{
    lines.into_iter().try_fold(Money::zero(), |acc, (unit_price, quantity)| {
        let line_total = unit_price
            .checked_mul(quantity)
            .ok_or_else(|| overflow("line_total"))?;
        acc.checked_add(line_total).ok_or_else(|| overflow(field))
    })
}

/// Validates that `amount + addend` fits in `i64` cents.
pub fn validate_sum_fits(field: &str, amount: Money, addend: Money) -> ValidationResult<()> {
    amount.checked_add(addend).map(|_| ()).ok_or_else(|| overflow(field))
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::Overflow {
        field: field.to_string(),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity on a cart line (must be ≥ 1).
pub fn validate_line_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::MAX,
            actual: qty,
        });
    }

    Ok(())
}

/// Validates a variant's stock level (must be ≥ 0).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock_available".to_string(),
            min: 0,
            max: i64::MAX,
            actual: stock,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    validate_bps("tax_rate", bps)
}

/// Validates a discount percentage in basis points (0% to 100%).
pub fn validate_percent_bps(bps: u32) -> ValidationResult<()> {
    validate_bps("percent", bps)
}

fn validate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10_000,
            actual: i64::from(bps),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates an identifier or reference (non-empty after trimming).
pub fn validate_reference(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_price() {
        assert!(validate_price("price", Money::zero()).is_ok());
        assert!(validate_price("price", Money::from_cents(1099)).is_ok());

        let err = validate_price("price", Money::from_cents(-100)).unwrap_err();
        assert_eq!(err.to_string(), "price must be between 0 and 9223372036854775807, got -100");
    }

    #[test]
    fn test_checked_lines_total_reports_overflowing_field() {
        let near_max = Money::from_cents(i64::MAX - 10);

        let err = checked_lines_total("subtotal", [(Money::from_cents(i64::MAX / 2), 3)]).unwrap_err();
        assert_eq!(err, ValidationError::Overflow { field: "line_total".into() });

        let err = checked_lines_total("subtotal", [(near_max, 1), (Money::from_cents(11), 1)]).unwrap_err();
        assert_eq!(err, ValidationError::Overflow { field: "subtotal".into() });
        assert_eq!(err.to_string(), "subtotal exceeds the largest representable amount");

        assert_eq!(checked_lines_total("subtotal", [(near_max, 1)]).unwrap(), near_max);
        assert!(checked_lines_total("subtotal", Vec::<(Money, i64)>::new()).unwrap().is_zero());
    }

    #[test]
    fn test_validate_sum_fits() {
        let near_max = Money::from_cents(i64::MAX - 10);
        assert!(validate_sum_fits("total", near_max, Money::from_cents(10)).is_ok());
        assert!(validate_sum_fits("total", near_max, Money::from_cents(11)).is_err());
    }

    #[test]
    fn test_validate_line_quantity() {
        assert!(validate_line_quantity(1).is_ok());
        assert!(validate_line_quantity(5000).is_ok());
        assert!(validate_line_quantity(0).is_err());
        assert!(validate_line_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn test_validate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(825).is_ok());
        assert!(validate_tax_rate_bps(10_000).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
        assert!(validate_percent_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_reference() {
        assert!(validate_reference("product_ref", "tee-01").is_ok());
        assert!(validate_reference("product_ref", "   ").is_err());
    }
}
