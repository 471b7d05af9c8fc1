//! Alert to order-parameter resolution

use rust_decimal::Decimal;

use super::types::SizingInput;
use crate::alert::types::{Alert, SizeRequest};
use crate::common::errors::{RelayError, Result};

/// Turn the alert's size request into a base-unit size
///
/// `equity` is only consulted for leverage-based sizing. A `reverse`
/// alert doubles the size so one order closes and re-opens the other way.
pub fn resolve_order_size(alert: &Alert, equity: Option<Decimal>) -> Result<Decimal> {
    let size = match alert.size {
        SizeRequest::Absolute(size) => Some(size),
        SizeRequest::Usd(notional) => notional.checked_div(alert.price),
        SizeRequest::Leverage(fraction) => {
            let equity = equity.ok_or_else(|| {
                RelayError::Internal("account equity required for sizeByLeverage".to_string())
            })?;
            equity
                .checked_mul(fraction)
                .and_then(|notional| notional.checked_div(alert.price))
        }
    };

    let size = if alert.reverse {
        size.and_then(|size| size.checked_mul(Decimal::TWO))
    } else {
        size
    };
    size.map(|size| size.normalize())
        .ok_or_else(|| RelayError::InvalidAlert("order size is out of range".to_string()))
}

/// Assemble the engine input for an alert
pub fn sizing_input(alert: &Alert, market: String, size: Decimal) -> SizingInput {
    SizingInput {
        market,
        side: alert.order,
        size,
        price: alert.price,
        slippage_percentage: alert.slippage_percentage,
        order_mode: alert.order_mode,
        new_position_size: alert.new_position_size,
        direction: alert.direction,
        min_profit: alert.min_profit,
    }
}
