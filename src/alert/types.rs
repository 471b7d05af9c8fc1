use rust_decimal::Decimal;
use serde::Serialize;

use crate::common::types::{Direction, OrderMode, Side};

/// Exchange assumed when an alert does not name one
pub const LEGACY_EXCHANGE: &str = "dydxv3";

/// How the alert expresses its order size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SizeRequest {
    /// Size in contracts/base units
    Absolute(Decimal),
    /// Notional in USD, divided by the reference price
    Usd(Decimal),
    /// Fraction of account equity
    Leverage(Decimal),
}

/// Validated trading alert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    /// Exchange identifier as sent (lowercased)
    pub exchange: String,
    pub strategy: String,
    pub market: String,
    pub size: SizeRequest,
    pub order: Side,
    /// Reference price the alert fired at
    pub price: Decimal,
    /// Double the size to flip an existing position
    pub reverse: bool,
    pub passphrase: Option<String>,
    /// Slippage tolerance in percent
    pub slippage_percentage: Decimal,
    pub order_mode: OrderMode,
    /// Target size after this order; zero means flatten
    pub new_position_size: Option<Decimal>,
    pub direction: Option<Direction>,
    /// Per-alert override of the minimum profit gate, in percent
    pub min_profit: Option<Decimal>,
}

impl Alert {
    /// True when the alert asks to end flat
    pub fn targets_flat(&self) -> bool {
        self.new_position_size == Some(Decimal::ZERO)
    }
}
