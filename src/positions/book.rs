//! In-memory position cache with one order lock per exchange

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, warn};

use crate::common::types::{Exchange, Position, Side};

#[derive(Default)]
struct ExchangeSlot {
    positions: RwLock<Arc<Vec<Position>>>,
    refreshed_at: RwLock<Option<DateTime<Utc>>>,
    order_lock: Mutex<()>,
}

/// Latest known open positions of every exchange
///
/// The poller replaces an exchange's list wholesale; readers get an
/// immutable snapshot that stays valid while they size an order. The
/// order lock serializes read → decide → submit → [`apply_order`] per
/// exchange, so the next alert sizes against the post-order exposure.
///
/// [`apply_order`]: PositionBook::apply_order
pub struct PositionBook {
    slots: [ExchangeSlot; Exchange::ALL.len()],
}

impl PositionBook {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| ExchangeSlot::default()),
        }
    }

    fn slot(&self, exchange: Exchange) -> &ExchangeSlot {
        &self.slots[exchange as usize]
    }

    /// Read-only view of the cached positions
    pub async fn snapshot(&self, exchange: Exchange) -> Arc<Vec<Position>> {
        self.slot(exchange).positions.read().await.clone()
    }

    /// When the exchange's positions were last replaced
    pub async fn refreshed_at(&self, exchange: Exchange) -> Option<DateTime<Utc>> {
        *self.slot(exchange).refreshed_at.read().await
    }

    /// Swap in a freshly fetched position list
    pub(crate) async fn replace(&self, exchange: Exchange, positions: Vec<Position>) {
        let slot = self.slot(exchange);
        *slot.positions.write().await = Arc::new(positions);
        *slot.refreshed_at.write().await = Some(Utc::now());
    }

    /// Fold a submitted order into the cached position of its market
    ///
    /// Called with the order lock held. The entry price is kept unless the
    /// order flips the side; the next poll overwrites the whole list anyway.
    pub(crate) async fn apply_order(
        &self,
        exchange: Exchange,
        market: &str,
        side: Side,
        size: Decimal,
        price: Decimal,
    ) {
        let delta = match side {
            Side::Buy => size,
            Side::Sell => -size,
        };
        if delta.is_zero() {
            return;
        }

        let mut current = self.slot(exchange).positions.write().await;
        let mut positions = current.as_ref().clone();

        match positions
            .iter()
            .position(|p| p.market == market && !p.size.is_zero())
        {
            Some(index) => {
                let held = positions[index].signed_size();
                let Some(updated) = held.checked_add(delta) else {
                    warn!("{} {} position overflowed, cache left as is", exchange, market);
                    return;
                };
                if updated.is_zero() {
                    positions.remove(index);
                } else {
                    let flipped = updated.is_sign_negative() != held.is_sign_negative();
                    let previous = &positions[index];
                    let entry_price = if flipped { price } else { previous.entry_price };
                    let moved = Position {
                        details: previous.details.clone(),
                        ..Position::from_signed(market, updated, entry_price)
                    };
                    positions[index] = moved;
                }
            }
            None => positions.push(Position::from_signed(market, delta, price)),
        }

        debug!("{} {} cached position moved by {}", exchange, market, delta);
        *current = Arc::new(positions);
    }

    /// Hold from reading positions until the submitted order is applied
    pub async fn lock_orders(&self, exchange: Exchange) -> MutexGuard<'_, ()> {
        self.slot(exchange).order_lock.lock().await
    }
}

impl Default for PositionBook {
    fn default() -> Self {
        Self::new()
    }
}
