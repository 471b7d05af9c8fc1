//! Cancels orders that are still open after the fill wait time

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::common::traits::ExchangeAdapter;
use crate::common::types::PlacedOrder;

/// How a supervised order ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// Filled within the wait time, nothing to do
    Filled,
    /// Not filled, cancellation was requested once
    Cancelled,
    /// Status query failed, order left untouched
    Unknown,
    /// Relay shut down before the wait time elapsed
    Abandoned,
}

/// Spawns one fill check per placed order
#[derive(Debug, Clone)]
pub struct FillSupervisor {
    shutdown: CancellationToken,
}

impl FillSupervisor {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self { shutdown }
    }

    /// Check the order after `wait`, cancelling it if not filled
    pub fn watch(
        &self,
        adapter: Arc<dyn ExchangeAdapter>,
        order: PlacedOrder,
        wait: Duration,
    ) -> JoinHandle<FillOutcome> {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move { supervise(adapter.as_ref(), &order, wait, &shutdown).await })
    }
}

/// Wait, query once and cancel at most once
pub async fn supervise(
    adapter: &dyn ExchangeAdapter,
    order: &PlacedOrder,
    wait: Duration,
    shutdown: &CancellationToken,
) -> FillOutcome {
    let exchange = adapter.exchange();

    tokio::select! {
        _ = tokio::time::sleep(wait) => {}
        _ = shutdown.cancelled() => {
            info!(
                "Shutdown before fill check of {} order {}",
                exchange, order.order_id
            );
            return FillOutcome::Abandoned;
        }
    }

    let fill = match adapter.order_status(order).await {
        Ok(fill) => fill,
        Err(e) => {
            warn!(
                "Could not query {} order {} on {}: {}",
                exchange, order.order_id, order.market, e
            );
            return FillOutcome::Unknown;
        }
    };

    if fill.is_filled() {
        info!("{} order {} filled", exchange, order.order_id);
        return FillOutcome::Filled;
    }

    match adapter.cancel_order(order).await {
        Ok(()) => info!(
            "{} order {} not filled within {:?} ({} of {}), cancelled",
            exchange, order.order_id, wait, fill.filled_quantity, fill.quantity
        ),
        Err(e) => warn!(
            "Failed to cancel {} order {}: {}",
            exchange, order.order_id, e
        ),
    }
    FillOutcome::Cancelled
}
