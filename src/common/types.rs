//! Unified types shared by the engine and all exchange adapters

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::errors::RelayError;

/// Supported exchange identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Dydxv4,
    Hyperliquid,
    Bybit,
    Bitget,
    Bingx,
    Kraken,
    Nexo,
    Aster,
    Lighter,
}

impl Exchange {
    /// Every supported exchange, in readiness-report order
    pub const ALL: [Exchange; 9] = [
        Exchange::Dydxv4,
        Exchange::Hyperliquid,
        Exchange::Bybit,
        Exchange::Bitget,
        Exchange::Bingx,
        Exchange::Kraken,
        Exchange::Nexo,
        Exchange::Aster,
        Exchange::Lighter,
    ];

    /// Identifier used in alert payloads and config keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Dydxv4 => "dydxv4",
            Exchange::Hyperliquid => "hyperliquid",
            Exchange::Bybit => "bybit",
            Exchange::Bitget => "bitget",
            Exchange::Bingx => "bingx",
            Exchange::Kraken => "kraken",
            Exchange::Nexo => "nexo",
            Exchange::Aster => "aster",
            Exchange::Lighter => "lighter",
        }
    }

    /// Key used in the `/accounts` readiness report
    pub fn account_label(&self) -> &'static str {
        match self {
            Exchange::Dydxv4 => "dYdX_v4",
            Exchange::Hyperliquid => "HyperLiquid",
            Exchange::Bybit => "Bybit",
            Exchange::Bitget => "Bitget",
            Exchange::Bingx => "Bingx",
            Exchange::Kraken => "Kraken",
            Exchange::Nexo => "Nexo",
            Exchange::Aster => "Aster",
            Exchange::Lighter => "Lighter",
        }
    }

    /// Name used for the exported positions file
    pub fn export_name(&self) -> &'static str {
        match self {
            Exchange::Dydxv4 => "Dydxv4",
            Exchange::Hyperliquid => "Hyperliquid",
            Exchange::Bybit => "Bybit",
            Exchange::Bitget => "Bitget",
            Exchange::Bingx => "Bingx",
            Exchange::Kraken => "Kraken",
            Exchange::Nexo => "Nexo",
            Exchange::Aster => "Aster",
            Exchange::Lighter => "Lighter",
        }
    }

    /// Prefix of the legacy flat environment variables (`<PREFIX>_API_KEY`, ...)
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Exchange::Dydxv4 => "DYDX_V4",
            Exchange::Hyperliquid => "HYPERLIQUID",
            Exchange::Bybit => "BYBIT",
            Exchange::Bitget => "BITGET",
            Exchange::Bingx => "BINGX",
            Exchange::Kraken => "KRAKEN_FUTURES",
            Exchange::Nexo => "NEXO",
            Exchange::Aster => "ASTER",
            Exchange::Lighter => "LIGHTER",
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Exchange::ALL
            .into_iter()
            .find(|exchange| exchange.as_str() == wanted)
            .ok_or(RelayError::UnsupportedExchange(wanted))
    }
}

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side that reduces a position of the given side
    pub fn closing(position: PositionSide) -> Self {
        match position {
            PositionSide::Long => Side::Sell,
            PositionSide::Short => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Position direction an alert opens, reduces or closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// Sizing mode requested by the alert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    /// Use the requested size
    #[default]
    #[serde(rename = "")]
    Standard,
    /// Use the entire existing position
    Full,
}

/// Which order sides an exchange accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    #[default]
    #[serde(alias = "")]
    Both,
    #[serde(alias = "onlySell", alias = "only_sell")]
    OnlySell,
}

impl FromStr for TradingMode {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "both" => Ok(TradingMode::Both),
            "onlysell" | "only_sell" => Ok(TradingMode::OnlySell),
            other => Err(RelayError::Configuration(format!(
                "unknown trading mode: {}",
                other
            ))),
        }
    }
}

/// Side of an open position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Long => write!(f, "long"),
            PositionSide::Short => write!(f, "short"),
        }
    }
}

/// Exchange-specific position fields kept only for export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionDetails {
    pub status: Option<String>,
    pub max_size: Option<String>,
    pub exit_price: Option<String>,
    pub created_at: Option<String>,
    pub created_at_height: Option<String>,
    pub closed_at: Option<String>,
    pub sum_open: Option<String>,
    pub sum_close: Option<String>,
    pub net_funding: Option<String>,
    pub subaccount_number: Option<u32>,
}

/// Open position, normalized by the adapter to side + magnitude
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Market/symbol as the exchange names it
    pub market: String,
    pub side: PositionSide,
    /// Absolute position size
    pub size: Decimal,
    /// Average entry price
    pub entry_price: Decimal,
    #[serde(default)]
    pub details: PositionDetails,
}

impl Position {
    pub fn new(
        market: impl Into<String>,
        side: PositionSide,
        size: Decimal,
        entry_price: Decimal,
    ) -> Self {
        Self {
            market: market.into(),
            side,
            size: size.abs(),
            entry_price,
            details: PositionDetails::default(),
        }
    }

    /// Build from a signed amount (positive = long)
    pub fn from_signed(market: impl Into<String>, amount: Decimal, entry_price: Decimal) -> Self {
        let side = if amount.is_sign_negative() {
            PositionSide::Short
        } else {
            PositionSide::Long
        };
        Self::new(market, side, amount, entry_price)
    }

    /// Size with the sign of the position side
    pub fn signed_size(&self) -> Decimal {
        match self.side {
            PositionSide::Long => self.size,
            PositionSide::Short => -self.size,
        }
    }
}

/// Order ready to be sent to an exchange
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub market: String,
    pub side: Side,
    /// Positive magnitude; adapters sign it if their protocol needs it
    pub size: Decimal,
    pub limit_price: Decimal,
    pub client_order_id: String,
    /// Alert direction, used for hedge-mode position sides
    pub direction: Option<Direction>,
}

/// Exchange acknowledgement of a submitted order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: String,
    pub client_order_id: String,
    pub market: String,
}

/// Order state as reported by an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Expired,
    Other,
}

impl OrderState {
    /// Parse exchange status strings (`FILLED`, `closed`, ...)
    pub fn parse(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "new" | "open" => OrderState::New,
            "partially_filled" => OrderState::PartiallyFilled,
            "filled" | "closed" => OrderState::Filled,
            "canceled" | "cancelled" => OrderState::Canceled,
            "expired" => OrderState::Expired,
            _ => OrderState::Other,
        }
    }
}

/// Fill status of a submitted order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFill {
    pub state: OrderState,
    pub filled_quantity: Decimal,
    pub quantity: Decimal,
}

impl OrderFill {
    pub fn is_filled(&self) -> bool {
        self.state == OrderState::Filled
            || (self.quantity > Decimal::ZERO && self.filled_quantity >= self.quantity)
    }
}
