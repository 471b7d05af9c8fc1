//! Trait definitions for exchange adapters and position lookups

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::errors::Result;
use super::types::{Exchange, OrderFill, OrderRequest, PlacedOrder, Position};

/// Capability every exchange adapter provides to the relay
///
/// Adapters translate normalized order instructions into their
/// exchange's wire protocol. They hold no position state of their own;
/// the relay caches what `open_positions` returns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// Which exchange this adapter talks to
    fn exchange(&self) -> Exchange;

    /// Convert an alert market symbol into the exchange's naming
    ///
    /// Default replaces underscores with dashes (`BTC_USD` -> `BTC-USD`).
    fn normalize_market(&self, market: &str) -> String {
        market.replace('_', "-")
    }

    /// Whether the account is reachable and able to trade
    async fn is_account_ready(&self) -> Result<bool>;

    /// Account equity in quote currency, used for leverage-based sizing
    async fn account_equity(&self) -> Result<Decimal>;

    /// Currently open positions, one per market
    async fn open_positions(&self) -> Result<Vec<Position>>;

    /// Submit a limit order
    async fn place_order(&self, order: &OrderRequest) -> Result<PlacedOrder>;

    /// Query fill status of a submitted order
    async fn order_status(&self, order: &PlacedOrder) -> Result<OrderFill>;

    /// Cancel a submitted order
    async fn cancel_order(&self, order: &PlacedOrder) -> Result<()>;
}

/// Read-only lookup over an exchange's open positions
pub trait PositionView {
    /// The open position for a market, if any
    fn position(&self, market: &str) -> Option<&Position>;

    /// Absolute size of the position in a market (zero when flat)
    fn magnitude(&self, market: &str) -> Decimal {
        self.position(market)
            .map(|p| p.size.abs())
            .unwrap_or(Decimal::ZERO)
    }
}

impl PositionView for [Position] {
    fn position(&self, market: &str) -> Option<&Position> {
        // a zero-size entry is a closed position
        self.iter()
            .find(|p| p.market == market && !p.size.is_zero())
    }
}

impl PositionView for Vec<Position> {
    fn position(&self, market: &str) -> Option<&Position> {
        self.as_slice().position(market)
    }
}
