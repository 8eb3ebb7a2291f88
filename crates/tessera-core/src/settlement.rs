//! # Balance Settlement Tracker
//!
//! Pure transition function driving an order's outstanding balance to zero.
//!
//! ## Transition Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_payment(order, amount)                                           │
//! │                                                                         │
//! │  order CANCELLED / REFUNDED        ──► OrderClosed                      │
//! │  amount ≤ 0                        ──► NonPositiveAmount                │
//! │  amount > total − amount_paid      ──► Overpayment                      │
//! │                                                                         │
//! │  new_amount_paid = amount_paid + amount                                 │
//! │  new_status      = COMPLETED       if new_amount_paid == total          │
//! │                    PARTIALLY_PAID  otherwise                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persisting the outcome is the caller's job. Writes against one order must
//! be serialized by the persistence layer, and every call must be made with
//! a fresh snapshot.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Order, OrderStatus, Payment};
use crate::validation::{validate_price, validate_reference};

/// Result of a successful payment transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettlementOutcome {
    pub new_amount_paid: Money,
    pub new_status: OrderStatus,
    /// `total − new_amount_paid`.
    pub amount_due: Money,
}

/// Validates `amount` against the order and computes the next state.
///
/// On rejection the order is left exactly as it was: nothing is mutated,
/// there is nothing to roll back.
///
/// ```rust
/// use tessera_core::money::Money;
/// use tessera_core::settlement::apply_payment;
/// use tessera_core::types::{Order, OrderStatus};
///
/// let order = Order::new("ORD-1", Money::from_cents(30000));
/// let outcome = apply_payment(&order, Money::from_cents(12000)).unwrap();
///
/// assert_eq!(outcome.new_status, OrderStatus::PartiallyPaid);
/// assert_eq!(outcome.amount_due.cents(), 18000);
/// ```
pub fn apply_payment(order: &Order, amount: Money) -> CoreResult<SettlementOutcome> {
    validate_order(order)?;

    if order.status.is_closed() {
        return Err(CoreError::OrderClosed {
            order_id: order.id.clone(),
            status: order.status,
        });
    }

    if !amount.is_positive() {
        return Err(CoreError::NonPositiveAmount { amount });
    }

    let amount_due = order.amount_due();
    if amount > amount_due {
        return Err(CoreError::Overpayment { amount, amount_due });
    }

    let new_amount_paid = order.amount_paid + amount;
    let new_status = if new_amount_paid == order.total {
        OrderStatus::Completed
    } else {
        OrderStatus::PartiallyPaid
    };

    Ok(SettlementOutcome {
        new_amount_paid,
        new_status,
        amount_due: order.total - new_amount_paid,
    })
}

/// "Pay Full": pays exactly the amount due, never more.
///
/// A fully paid order has nothing due and is rejected with
/// [`CoreError::NonPositiveAmount`].
pub fn pay_full_amount(order: &Order) -> CoreResult<SettlementOutcome> {
    apply_payment(order, order.amount_due())
}

/// Folds a payment history onto an order, stopping at the first rejection.
pub fn replay_payments(order: &Order, payments: &[Payment]) -> CoreResult<Order> {
    payments.iter().try_fold(order.clone(), |current, payment| {
        let outcome = apply_payment(&current, payment.amount)?;
        Ok(current.with_outcome(&outcome))
    })
}

impl Order {
    /// The order snapshot after a successful transition.
    pub fn with_outcome(&self, outcome: &SettlementOutcome) -> Order {
        Order {
            id: self.id.clone(),
            total: self.total,
            amount_paid: outcome.new_amount_paid,
            status: outcome.new_status,
        }
    }
}

fn validate_order(order: &Order) -> CoreResult<()> {
    validate_reference("order id", &order.id)?;
    validate_price("total", order.total)?;
    validate_price("amount_paid", order.amount_paid)?;

    if order.amount_paid > order.total {
        return Err(ValidationError::OutOfRange {
            field: "amount_paid".to_string(),
            min: 0,
            max: order.total.cents(),
            actual: order.amount_paid.cents(),
        }
        .into());
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::{TimeZone, Utc};

    fn order_300() -> Order {
        Order::new("ORD-1001", Money::from_cents(30000))
    }

    fn payment(cents: i64) -> Payment {
        Payment {
            amount: Money::from_cents(cents),
            method: PaymentMethod::Cash,
            timestamp: Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_partial_then_full_payment() {
        let order = order_300();

        let first = apply_payment(&order, Money::from_cents(12000)).unwrap();
        assert_eq!(first.new_amount_paid.cents(), 12000);
        assert_eq!(first.new_status, OrderStatus::PartiallyPaid);

        let order = order.with_outcome(&first);
        let second = apply_payment(&order, Money::from_cents(18000)).unwrap();
        assert_eq!(second.new_amount_paid.cents(), 30000);
        assert_eq!(second.new_status, OrderStatus::Completed);
        assert!(second.amount_due.is_zero());

        let order = order.with_outcome(&second);
        let err = apply_payment(&order, Money::from_cents(1)).unwrap_err();
        assert_eq!(
            err,
            CoreError::Overpayment {
                amount: Money::from_cents(1),
                amount_due: Money::zero(),
            }
        );
    }

    #[test]
    fn test_non_positive_amount() {
        let order = order_300();
        assert!(matches!(
            apply_payment(&order, Money::zero()),
            Err(CoreError::NonPositiveAmount { .. })
        ));
        assert!(matches!(
            apply_payment(&order, Money::from_cents(-500)),
            Err(CoreError::NonPositiveAmount { .. })
        ));
    }

    #[test]
    fn test_overpayment_leaves_order_unchanged() {
        let order = order_300();
        let before = order.clone();

        assert!(apply_payment(&order, Money::from_cents(30001)).is_err());
        assert_eq!(order, before);
    }

    #[test]
    fn test_closed_orders_reject_payments() {
        for status in [OrderStatus::Cancelled, OrderStatus::Refunded] {
            let mut order = order_300();
            order.status = status;

            let err = apply_payment(&order, Money::from_cents(100)).unwrap_err();
            assert_eq!(
                err,
                CoreError::OrderClosed {
                    order_id: "ORD-1001".into(),
                    status,
                }
            );
        }
    }

    #[test]
    fn test_pay_full_amount() {
        let mut order = order_300();
        order.amount_paid = Money::from_cents(12000);
        order.status = OrderStatus::PartiallyPaid;

        let outcome = pay_full_amount(&order).unwrap();
        assert_eq!(outcome.new_amount_paid.cents(), 30000);
        assert_eq!(outcome.new_status, OrderStatus::Completed);

        let done = order.with_outcome(&outcome);
        assert!(matches!(
            pay_full_amount(&done),
            Err(CoreError::NonPositiveAmount { .. })
        ));
    }

    #[test]
    fn test_zero_total_order_cannot_take_payment() {
        let order = Order::new("ORD-FREE", Money::zero());
        assert!(pay_full_amount(&order).is_err());
    }

    #[test]
    fn test_replay_payments() {
        let order = replay_payments(&order_300(), &[payment(10000), payment(5000), payment(15000)]).unwrap();
        assert_eq!(order.amount_paid.cents(), 30000);
        assert_eq!(order.status, OrderStatus::Completed);

        let err = replay_payments(&order_300(), &[payment(20000), payment(20000)]).unwrap_err();
        assert!(matches!(err, CoreError::Overpayment { .. }));
    }

    #[test]
    fn test_corrupt_order_is_rejected() {
        let mut order = order_300();
        order.amount_paid = Money::from_cents(40000);
        assert!(apply_payment(&order, Money::from_cents(1)).unwrap_err().is_corrupt_input());

        let negative = Order::new("ORD-1", Money::from_cents(-1));
        assert!(apply_payment(&negative, Money::from_cents(1)).unwrap_err().is_corrupt_input());

        let unnamed = Order::new(" ", Money::from_cents(100));
        assert!(apply_payment(&unnamed, Money::from_cents(1)).unwrap_err().is_corrupt_input());
    }
}
