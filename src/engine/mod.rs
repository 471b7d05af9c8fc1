//! Order sizing engine
//!
//! # Architecture
//!
//! ```text
//! Alert ──► params::resolve_order_size ──► params::sizing_input
//!                                                │
//!            positions snapshot (PositionView) ──┤
//!                                                ▼
//!                                      sizing::size_order
//!                                                │
//!                          ┌─────────────────────┴───────────┐
//!                          ▼                                 ▼
//!                Proceed(OrderInstruction)            Skip(SkipReason)
//! ```
//!
//! Everything here is synchronous and free of I/O. Exchange adapters only
//! see the resulting [`OrderInstruction`].

mod params;
mod sizing;
mod types;

pub use params::{resolve_order_size, sizing_input};
pub use sizing::{directional_profit, limit_price, profit_percent, size_order};
pub use types::{
    OrderInstruction, SizingBranch, SizingInput, SizingPolicy, SizingVerdict, SkipReason,
};
