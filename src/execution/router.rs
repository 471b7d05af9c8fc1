//! Alert routing: validate, dedupe, size under the exchange lock, submit

use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::supervisor::FillSupervisor;
use crate::alert::{validate_alert, Alert, DedupeGuard, SizeRequest};
use crate::common::errors::{RelayError, Result};
use crate::common::traits::ExchangeAdapter;
use crate::common::types::{Exchange, OrderRequest, PlacedOrder};
use crate::config::types::AppConfig;
use crate::engine::{
    resolve_order_size, size_order, sizing_input, OrderInstruction, SizingPolicy, SizingVerdict,
    SkipReason,
};
use crate::exchange::ExchangeRegistry;
use crate::positions::PositionBook;

/// What happened to one inbound alert
#[derive(Debug)]
pub enum AlertOutcome {
    /// Order accepted by the exchange, fill check scheduled
    Placed {
        exchange: Exchange,
        order: PlacedOrder,
        instruction: OrderInstruction,
    },
    /// Sizing engine decided not to trade
    Skipped {
        exchange: Exchange,
        reason: SkipReason,
    },
    /// Same payload seen within the dedupe window
    Duplicate,
    /// Payload failed validation
    Invalid(String),
    /// Exchange identifier not supported
    UnsupportedExchange(String),
    /// Adapter or network failure
    Failed {
        exchange: Exchange,
        error: RelayError,
    },
}

impl AlertOutcome {
    /// Response body returned to the alert sender
    pub fn message(&self) -> String {
        match self {
            AlertOutcome::Placed { .. } | AlertOutcome::Skipped { .. } => "OK".to_string(),
            AlertOutcome::Duplicate => "Duplicate alert ignored".to_string(),
            AlertOutcome::Invalid(_) => "Error. alert message is not valid".to_string(),
            AlertOutcome::UnsupportedExchange(name) => {
                format!("Error. Exchange: {} is not supported", name)
            }
            AlertOutcome::Failed { .. } => "error".to_string(),
        }
    }
}

/// Turns alerts into at most one order each
pub struct AlertRouter {
    config: Arc<AppConfig>,
    dedupe: DedupeGuard,
    registry: Arc<ExchangeRegistry>,
    book: Arc<PositionBook>,
    supervisor: FillSupervisor,
}

impl AlertRouter {
    pub fn new(
        config: Arc<AppConfig>,
        registry: Arc<ExchangeRegistry>,
        book: Arc<PositionBook>,
        supervisor: FillSupervisor,
    ) -> Self {
        let dedupe = DedupeGuard::new(config.settings.dedupe_ttl());
        Self {
            config,
            dedupe,
            registry,
            book,
            supervisor,
        }
    }

    pub fn registry(&self) -> &Arc<ExchangeRegistry> {
        &self.registry
    }

    /// Process one raw alert body
    #[instrument(skip_all)]
    pub async fn handle(&self, payload: Value) -> AlertOutcome {
        let alert = match validate_alert(&payload, self.config.settings.passphrase.as_deref()) {
            Ok(alert) => alert,
            Err(e) => {
                warn!("Rejected alert: {}", e);
                return AlertOutcome::Invalid(e.to_string());
            }
        };

        if !self.dedupe.should_process(&payload).await {
            info!(
                "Duplicate alert ignored: {} {} {}",
                alert.strategy, alert.market, alert.order
            );
            return AlertOutcome::Duplicate;
        }

        let exchange = match alert.exchange.parse::<Exchange>() {
            Ok(exchange) => exchange,
            Err(_) => {
                warn!("Exchange: {} is not supported", alert.exchange);
                return AlertOutcome::UnsupportedExchange(alert.exchange.clone());
            }
        };

        let Some(adapter) = self.registry.get(exchange) else {
            warn!("{} has no credentials configured, alert dropped", exchange);
            return AlertOutcome::Failed {
                exchange,
                error: RelayError::MissingCredentials(exchange),
            };
        };

        match self.execute(&alert, adapter).await {
            Ok(outcome) => outcome,
            Err(e @ RelayError::InvalidAlert(_)) => {
                warn!("Rejected alert: {}", e);
                AlertOutcome::Invalid(e.to_string())
            }
            Err(e) => {
                error!(
                    "{} order for {} failed at {}: {}",
                    exchange,
                    alert.market,
                    chrono::Utc::now().to_rfc3339(),
                    e
                );
                AlertOutcome::Failed { exchange, error: e }
            }
        }
    }

    async fn execute(
        &self,
        alert: &Alert,
        adapter: Arc<dyn ExchangeAdapter>,
    ) -> Result<AlertOutcome> {
        let exchange = adapter.exchange();
        let market = adapter.normalize_market(&alert.market);

        let equity = match alert.size {
            SizeRequest::Leverage(_) => Some(adapter.account_equity().await?),
            _ => None,
        };
        let size = resolve_order_size(alert, equity)?;
        let input = sizing_input(alert, market, size);
        let policy = SizingPolicy {
            trading_mode: self.config.exchange(exchange).mode,
            default_min_profit: self.config.settings.minimum_profit_percent,
        };

        let guard = self.book.lock_orders(exchange).await;
        let positions = self.book.snapshot(exchange).await;

        let instruction = match size_order(&input, positions.as_slice(), &policy) {
            SizingVerdict::Proceed(instruction) => instruction,
            SizingVerdict::Skip(reason) => {
                info!("{} {} skipped: {}", exchange, input.market, reason);
                return Ok(AlertOutcome::Skipped { exchange, reason });
            }
        };

        let request = OrderRequest {
            market: input.market.clone(),
            side: instruction.side,
            size: instruction.size,
            limit_price: instruction.limit_price,
            client_order_id: Uuid::new_v4().simple().to_string(),
            direction: alert.direction,
        };
        let order = adapter.place_order(&request).await?;
        self.book
            .apply_order(
                exchange,
                &request.market,
                request.side,
                request.size,
                request.limit_price,
            )
            .await;
        drop(guard);

        info!(
            "{} {} {} {} @ {} placed (order {}, strategy {})",
            exchange,
            request.side,
            request.size,
            request.market,
            request.limit_price,
            order.order_id,
            alert.strategy
        );

        self.supervisor.watch(
            adapter,
            order.clone(),
            self.config.fill_wait_time(exchange),
        );

        Ok(AlertOutcome::Placed {
            exchange,
            order,
            instruction,
        })
    }
}
