use rust_decimal::Decimal;

use crate::common::types::{Direction, OrderMode, Side, TradingMode};

/// Everything the sizing engine needs to know about one alert
#[derive(Debug, Clone, PartialEq)]
pub struct SizingInput {
    /// Market in the exchange's naming
    pub market: String,
    pub side: Side,
    /// Requested size after size-mode resolution and reverse doubling
    pub size: Decimal,
    /// Reference price from the alert
    pub price: Decimal,
    pub slippage_percentage: Decimal,
    pub order_mode: OrderMode,
    pub new_position_size: Option<Decimal>,
    pub direction: Option<Direction>,
    pub min_profit: Option<Decimal>,
}

impl SizingInput {
    /// Flatten requested, either explicitly or through a zero target
    pub fn wants_flatten(&self) -> bool {
        self.order_mode == OrderMode::Full || self.targets_flat()
    }

    pub fn targets_flat(&self) -> bool {
        self.new_position_size == Some(Decimal::ZERO)
    }

    /// Sell against a long or buy against a short
    pub fn is_closing_direction(&self) -> bool {
        matches!(
            (self.side, self.direction),
            (Side::Sell, Some(Direction::Long)) | (Side::Buy, Some(Direction::Short))
        )
    }
}

/// Exchange-level settings that shape every sizing decision
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizingPolicy {
    pub trading_mode: TradingMode,
    /// Used when the alert carries no `minProfit`; `None` disables the gate
    pub default_min_profit: Option<Decimal>,
}

/// Which size rule produced an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingBranch {
    /// Reducing or closing an existing directional position
    Closing,
    /// Flattening without a closing direction
    Flatten,
    /// Plain open/increase with the requested size
    Requested,
}

/// Finalized order parameters
#[derive(Debug, Clone, PartialEq)]
pub struct OrderInstruction {
    pub side: Side,
    /// Always a positive magnitude
    pub size: Decimal,
    /// Slippage-adjusted limit price
    pub limit_price: Decimal,
    pub reference_price: Decimal,
    pub slippage_percentage: Decimal,
    pub branch: SizingBranch,
}

/// Why an alert produced no order
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Buy alert on an exchange configured to only sell
    SellOnlyMode,
    /// Closing alert without a position to close
    PositionNotExists,
    /// Closing alert before the minimum profit is reached
    ProfitNotReached {
        profit: Decimal,
        threshold: Decimal,
        direction: Direction,
    },
    /// Zero target size and nothing open
    NothingToFlatten,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::SellOnlyMode => write!(f, "exchange accepts sell orders only"),
            SkipReason::PositionNotExists => write!(f, "position not exists"),
            SkipReason::ProfitNotReached {
                profit,
                threshold,
                direction,
            } => write!(
                f,
                "profit level not reached: current profit {}, threshold {}, direction {}",
                profit.round_dp(4),
                threshold,
                direction
            ),
            SkipReason::NothingToFlatten => {
                write!(f, "new position size is 0 and no current position")
            }
        }
    }
}

/// Outcome of the sizing engine
#[derive(Debug, Clone, PartialEq)]
pub enum SizingVerdict {
    Proceed(OrderInstruction),
    Skip(SkipReason),
}

impl SizingVerdict {
    pub fn instruction(&self) -> Option<&OrderInstruction> {
        match self {
            SizingVerdict::Proceed(instruction) => Some(instruction),
            SizingVerdict::Skip(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            SizingVerdict::Proceed(_) => None,
            SizingVerdict::Skip(reason) => Some(reason),
        }
    }
}
