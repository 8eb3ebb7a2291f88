//! # Request Envelope
//!
//! JSON in, JSON out. A request names its operation in `op`; the response
//! echoes `op` and carries the operation's result.
//!
//! ```text
//!   {"op": "tender_cash", "total": 19485, "tendered": 20000}
//!        │
//!        ▼
//!   {"op": "tender_cash", "result": {"total": 19485, "tendered": 20000, "change": 515}}
//! ```
//!
//! Money is always integer cents.

use serde::{Deserialize, Serialize};
use tessera_core::catalog::{CatalogItem, Variant};
use tessera_core::discount::{DiscountRule, ResolvedDiscount};
use tessera_core::pricing::{CashTender, PricingResult};
use tessera_core::settlement::SettlementOutcome;
use tessera_core::{Money, Order};

use crate::clock::Clock;
use crate::engine::{CheckoutEngine, PreorderQuote, PreorderRequest, QuoteRequest};
use crate::error::ApiError;

/// An operation request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EngineRequest {
    ResolveDiscount {
        item: CatalogItem,
        #[serde(default)]
        rules: Vec<DiscountRule>,
    },
    Quote(QuoteRequest),
    TenderCash {
        total: Money,
        tendered: Money,
    },
    QuotePreorder(PreorderRequest),
    ClampQuantity {
        variant: Variant,
        quantity: i64,
    },
    RecordPayment {
        order: Order,
        amount: Money,
    },
    PayFull {
        order: Order,
    },
}

/// The result of a successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "result", rename_all = "snake_case")]
pub enum EngineResponse {
    ResolveDiscount(ResolvedDiscount),
    Quote(PricingResult),
    TenderCash(CashTender),
    QuotePreorder(PreorderQuote),
    ClampQuantity(i64),
    RecordPayment(SettlementOutcome),
    PayFull(SettlementOutcome),
}

/// Runs one request against the engine.
pub fn dispatch<C: Clock>(engine: &CheckoutEngine<C>, request: EngineRequest) -> Result<EngineResponse, ApiError> {
    match request {
        EngineRequest::ResolveDiscount { item, rules } => {
            Ok(EngineResponse::ResolveDiscount(engine.resolve_discount(&item, &rules)))
        }
        EngineRequest::Quote(quote) => engine.quote(&quote).map(EngineResponse::Quote),
        EngineRequest::TenderCash { total, tendered } => {
            engine.tender_cash(total, tendered).map(EngineResponse::TenderCash)
        }
        EngineRequest::QuotePreorder(preorder) => engine
            .quote_preorder(&preorder)
            .map(EngineResponse::QuotePreorder),
        EngineRequest::ClampQuantity { variant, quantity } => {
            Ok(EngineResponse::ClampQuantity(engine.clamp_quantity(&variant, quantity)))
        }
        EngineRequest::RecordPayment { order, amount } => engine
            .record_payment(&order, amount)
            .map(EngineResponse::RecordPayment),
        EngineRequest::PayFull { order } => engine.pay_full(&order).map(EngineResponse::PayFull),
    }
}

/// Parses a JSON request, dispatches it and serializes the response.
pub fn handle_json<C: Clock>(engine: &CheckoutEngine<C>, input: &str) -> Result<String, ApiError> {
    let request: EngineRequest = serde_json::from_str(input)?;
    let response = dispatch(engine, request)?;
    serde_json::to_string_pretty(&response)
        .map_err(|e| ApiError::internal(format!("Failed to serialize response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::CheckoutConfig;
    use crate::error::ErrorCode;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn engine() -> CheckoutEngine<FixedClock> {
        CheckoutEngine::with_clock(
            CheckoutConfig::default(),
            FixedClock::new(Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()),
        )
    }

    fn run(request: serde_json::Value) -> Result<serde_json::Value, ApiError> {
        let output = handle_json(&engine(), &request.to_string())?;
        Ok(serde_json::from_str(&output).unwrap())
    }

    #[test]
    fn test_quote_with_coupon() {
        let response = run(json!({
            "op": "quote",
            "lines": [
                { "item": { "id": "tee-01", "price": 5000 }, "quantity": 2 },
                { "item": { "id": "mug-02", "price": 10000 }, "quantity": 1 }
            ],
            "coupon": {
                "code": "SAVE20",
                "kind": { "type": "FIXED", "value": 2000 },
                "minPurchase": 15000,
                "expiry": "2026-12-31T00:00:00Z"
            }
        }))
        .unwrap();

        assert_eq!(response["op"], "quote");
        let result = &response["result"];
        assert_eq!(result["subtotal"], 20000);
        assert_eq!(result["discountAmount"], 2000);
        assert_eq!(result["taxAmount"], 1485);
        assert_eq!(result["total"], 19485);
        assert_eq!(result["coupon"]["status"], "APPLIED");
    }

    #[test]
    fn test_tender_cash() {
        let response = run(json!({ "op": "tender_cash", "total": 19485, "tendered": 20000 })).unwrap();
        assert_eq!(response["result"]["change"], 515);

        let err = run(json!({ "op": "tender_cash", "total": 19485, "tendered": 5000 })).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientTender);
    }

    #[test]
    fn test_quote_preorder_over_stock() {
        let err = run(json!({
            "op": "quote_preorder",
            "item": { "id": "hoodie", "price": 4500 },
            "variants": [ { "size": "M", "color": "Black", "stockAvailable": 5 } ],
            "requested": { "M|Black": 7 }
        }))
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        let detail = err.detail.unwrap();
        assert_eq!(detail.variant.as_deref(), Some("M/Black"));
        assert_eq!(detail.limit, Some(5));
        assert_eq!(detail.actual, Some(7));
    }

    #[test]
    fn test_record_payment_and_pay_full() {
        let response = run(json!({
            "op": "record_payment",
            "order": { "id": "ORD-1", "total": 30000, "amountPaid": 0, "status": "PENDING" },
            "amount": 12000
        }))
        .unwrap();
        assert_eq!(response["result"]["newAmountPaid"], 12000);
        assert_eq!(response["result"]["newStatus"], "PARTIALLY_PAID");

        let response = run(json!({
            "op": "pay_full",
            "order": { "id": "ORD-1", "total": 30000, "amountPaid": 12000, "status": "PARTIALLY_PAID" }
        }))
        .unwrap();
        assert_eq!(response["result"]["newStatus"], "COMPLETED");
        assert_eq!(response["result"]["amountDue"], 0);
    }

    #[test]
    fn test_clamp_and_resolve() {
        let response = run(json!({
            "op": "clamp_quantity",
            "variant": { "size": "M", "color": "Black", "stockAvailable": 5 },
            "quantity": 9
        }))
        .unwrap();
        assert_eq!(response["result"], 5);

        let response = run(json!({
            "op": "resolve_discount",
            "item": { "id": "tee-01", "price": 10000 },
            "rules": [{
                "id": 7,
                "scope": "PRODUCT",
                "productRef": "tee-01",
                "percentBps": 2000,
                "startsAt": "2026-01-01T00:00:00Z",
                "endsAt": "2026-12-31T00:00:00Z",
                "enabled": true
            }]
        }))
        .unwrap();
        assert_eq!(response["result"]["ruleId"], 7);
    }

    #[test]
    fn test_extreme_amounts_are_invalid_input() {
        let err = run(json!({
            "op": "quote",
            "lines": [ { "item": { "id": "tee-01", "price": 4611686018427387903_i64 }, "quantity": 3 } ]
        }))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(err.detail.unwrap().field, "line_total");

        let err = run(json!({ "op": "tender_cash", "total": -100, "tendered": -50 })).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(err.detail.unwrap().field, "total");
    }

    #[test]
    fn test_malformed_requests() {
        let err = handle_json(&engine(), "not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);

        let err = run(json!({ "op": "refund_everything" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);

        // A product rule that also names a category is rejected at parse time.
        let err = run(json!({
            "op": "resolve_discount",
            "item": { "id": "tee-01", "price": 10000 },
            "rules": [{
                "id": 7,
                "scope": "PRODUCT",
                "productRef": "tee-01",
                "categoryRef": { "namespace": "online", "id": "tops" },
                "percentBps": 2000,
                "startsAt": "2026-01-01T00:00:00Z",
                "endsAt": "2026-12-31T00:00:00Z",
                "enabled": true
            }]
        }))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }
}
