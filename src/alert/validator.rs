//! Alert payload validation
//!
//! Turns an untyped JSON body into an [`Alert`], rejecting payloads with
//! missing required fields or fields of the wrong type. Numeric fields
//! accept both JSON numbers and numeric strings, since alert templates
//! commonly quote placeholders.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use super::types::{Alert, SizeRequest, LEGACY_EXCHANGE};
use crate::common::errors::{RelayError, Result};
use crate::common::types::{Direction, OrderMode, Side};

/// Validate a raw alert payload
///
/// `expected_passphrase` is checked against the alert's `passphrase`
/// field when configured.
pub fn validate_alert(payload: &Value, expected_passphrase: Option<&str>) -> Result<Alert> {
    let body = payload
        .as_object()
        .ok_or_else(|| invalid("payload must be a JSON object"))?;

    let exchange = optional_string(body, "exchange")?
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| LEGACY_EXCHANGE.to_string());

    let strategy = required_string(body, "strategy")?;
    let market = required_string(body, "market")?;
    if market.trim().is_empty() {
        return Err(invalid("market must not be empty"));
    }

    let order = match required_string(body, "order")?.to_lowercase().as_str() {
        "buy" => Side::Buy,
        "sell" => Side::Sell,
        other => return Err(invalid(format!("order must be buy or sell, got {}", other))),
    };

    let price = optional_decimal(body, "price")?.ok_or_else(|| invalid("price is required"))?;
    if price <= Decimal::ZERO {
        return Err(invalid("price must be positive"));
    }

    let size = resolve_size_request(body)?;

    let reverse = match body.get("reverse") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(invalid("reverse must be a boolean")),
    };

    let passphrase = optional_string(body, "passphrase")?;
    if let Some(expected) = expected_passphrase {
        if passphrase.as_deref() != Some(expected) {
            return Err(invalid("passphrase does not match"));
        }
    }

    let slippage_percentage = optional_decimal(body, "slippagePercentage")?.unwrap_or_default();
    if slippage_percentage < Decimal::ZERO {
        return Err(invalid("slippagePercentage must not be negative"));
    }
    if slippage_percentage >= Decimal::ONE_HUNDRED {
        return Err(invalid("slippagePercentage must be below 100"));
    }
    // the buy-side limit price is price * (100 + slippage) / 100
    if price
        .checked_mul(Decimal::ONE_HUNDRED + slippage_percentage)
        .is_none()
    {
        return Err(invalid("price is out of range"));
    }

    let order_mode = match optional_string(body, "orderMode")?.as_deref() {
        None | Some("") => OrderMode::Standard,
        Some(mode) if mode.eq_ignore_ascii_case("full") => OrderMode::Full,
        Some(other) => return Err(invalid(format!("unknown orderMode {}", other))),
    };

    let direction = match optional_string(body, "direction")?.map(|d| d.to_lowercase()) {
        None => None,
        Some(d) if d.is_empty() || d == "flat" => None,
        Some(d) if d == "long" => Some(Direction::Long),
        Some(d) if d == "short" => Some(Direction::Short),
        Some(other) => return Err(invalid(format!("unknown direction {}", other))),
    };

    Ok(Alert {
        exchange,
        strategy,
        market,
        size,
        order,
        price,
        reverse,
        passphrase,
        slippage_percentage,
        order_mode,
        new_position_size: optional_decimal(body, "newPositionSize")?,
        direction,
        min_profit: optional_decimal(body, "minProfit")?,
    })
}

/// `size`, then `sizeUsd`, then `sizeByLeverage`; the first positive one wins
fn resolve_size_request(body: &Map<String, Value>) -> Result<SizeRequest> {
    let candidates: [(&str, fn(Decimal) -> SizeRequest); 3] = [
        ("size", SizeRequest::Absolute),
        ("sizeUsd", SizeRequest::Usd),
        ("sizeByLeverage", SizeRequest::Leverage),
    ];

    for (field, build) in candidates {
        if let Some(value) = optional_decimal(body, field)? {
            if value > Decimal::ZERO {
                return Ok(build(value));
            }
        }
    }

    Err(invalid("one of size, sizeUsd or sizeByLeverage must be positive"))
}

fn invalid(message: impl Into<String>) -> RelayError {
    RelayError::InvalidAlert(message.into())
}

fn required_string(body: &Map<String, Value>, field: &str) -> Result<String> {
    optional_string(body, field)?.ok_or_else(|| invalid(format!("{} is required", field)))
}

fn optional_string(body: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(format!("{} must be a string", field))),
    }
}

fn optional_decimal(body: &Map<String, Value>, field: &str) -> Result<Option<Decimal>> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => parse_decimal(&n.to_string())
            .map(Some)
            .ok_or_else(|| invalid(format!("{} is not a valid number", field))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_decimal(s.trim())
            .map(Some)
            .ok_or_else(|| invalid(format!("{} must be numeric", field))),
        Some(_) => Err(invalid(format!("{} must be a number", field))),
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
