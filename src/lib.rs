//! Signal Relay Library
//!
//! Receives trading alerts over HTTP and turns each one into at most one
//! limit order on a derivatives exchange. Orders are sized against a
//! periodically refreshed position cache, serialized per exchange, and
//! cancelled when they stay unfilled past a grace period.

pub mod alert;
pub mod common;
pub mod config;
pub mod engine;
pub mod exchange;
pub mod execution;
pub mod positions;
pub mod server;

// Re-export commonly used types
pub use alert::{validate_alert, Alert, DedupeGuard, SizeRequest};
pub use common::errors::{RelayError, Result};
pub use common::traits::{ExchangeAdapter, PositionView};
pub use common::types::{
    Direction, Exchange, OrderFill, OrderMode, OrderRequest, OrderState, PlacedOrder, Position,
    PositionSide, Side, TradingMode,
};
pub use config::types::AppConfig;
pub use engine::{size_order, OrderInstruction, SizingInput, SizingPolicy, SizingVerdict, SkipReason};
pub use exchange::{ExchangeRegistry, FuturesRestClient};
pub use execution::{AlertOutcome, AlertRouter, FillOutcome, FillSupervisor};
pub use positions::{PositionBook, PositionExporter, PositionPoller};
pub use server::RelayServer;
