//! Periodic position refresh for every registered exchange

use chrono::Utc;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::book::PositionBook;
use super::exporter::PositionExporter;
use crate::common::errors::Result;
use crate::common::traits::ExchangeAdapter;
use crate::common::types::Exchange;
use crate::exchange::ExchangeRegistry;

/// Result of refreshing one exchange
#[derive(Debug)]
pub struct RefreshReport {
    pub exchange: Exchange,
    /// Number of open positions cached, or the failure
    pub outcome: Result<usize>,
}

/// Pulls open positions from each adapter into the [`PositionBook`]
pub struct PositionPoller {
    registry: Arc<ExchangeRegistry>,
    book: Arc<PositionBook>,
    exporter: PositionExporter,
    interval: Duration,
}

impl PositionPoller {
    pub fn new(
        registry: Arc<ExchangeRegistry>,
        book: Arc<PositionBook>,
        exporter: PositionExporter,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            book,
            exporter,
            interval,
        }
    }

    /// Refresh all exchanges concurrently
    ///
    /// One exchange failing leaves its previous cache in place and does
    /// not affect the others.
    pub async fn refresh_all(&self) -> Vec<RefreshReport> {
        let refreshes = self.registry.adapters().map(|adapter| async move {
            let exchange = adapter.exchange();
            let outcome = self.refresh(adapter.as_ref()).await;
            if let Err(e) = &outcome {
                warn!(
                    "{} is not working. Time: {}. Error: {}",
                    exchange,
                    Utc::now().to_rfc3339(),
                    e
                );
            }
            RefreshReport { exchange, outcome }
        });

        join_all(refreshes).await
    }

    #[instrument(skip_all, fields(exchange = %adapter.exchange()))]
    async fn refresh(&self, adapter: &dyn ExchangeAdapter) -> Result<usize> {
        let exchange = adapter.exchange();
        let positions = adapter.open_positions().await?;
        let count = positions.len();
        let rows = positions.clone();
        self.book.replace(exchange, positions).await;

        // csv and std::fs block; keep them off the runtime threads
        let exporter = self.exporter.clone();
        match tokio::task::spawn_blocking(move || exporter.export(exchange, &rows)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("Failed to export {} positions: {}", exchange, e),
            Err(e) => warn!("{} position export task failed: {}", exchange, e),
        }

        debug!("Cached {} open positions", count);
        Ok(count)
    }

    /// Refresh on every interval tick until shutdown
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            "Position poller started: {} exchanges every {:?}",
            self.registry.len(),
            self.interval
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh_all().await;
                }
                _ = shutdown.cancelled() => {
                    info!("Position poller stopped");
                    break;
                }
            }
        }
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
