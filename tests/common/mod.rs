//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use signal_relay::common::types::{
    Exchange, OrderFill, OrderRequest, OrderState, PlacedOrder, Position,
};
use signal_relay::{
    AlertRouter, AppConfig, ExchangeAdapter, ExchangeRegistry, FillSupervisor, PositionBook,
    PositionExporter, PositionPoller, RelayError, Result,
};

/// In-memory exchange that records every call
pub struct FakeExchange {
    exchange: Exchange,
    ready: bool,
    fail_orders: bool,
    equity: Decimal,
    fill: OrderFill,
    pub positions: Mutex<Vec<Position>>,
    pub placed: Mutex<Vec<OrderRequest>>,
    pub status_queries: Mutex<usize>,
    pub cancelled: Mutex<Vec<PlacedOrder>>,
}

impl FakeExchange {
    pub fn new(exchange: Exchange) -> Self {
        Self {
            exchange,
            ready: true,
            fail_orders: false,
            equity: dec!(10000),
            fill: OrderFill {
                state: OrderState::New,
                filled_quantity: Decimal::ZERO,
                quantity: Decimal::ONE,
            },
            positions: Mutex::new(Vec::new()),
            placed: Mutex::new(Vec::new()),
            status_queries: Mutex::new(0),
            cancelled: Mutex::new(Vec::new()),
        }
    }

    pub fn with_positions(self, positions: Vec<Position>) -> Self {
        *self.positions.lock().unwrap() = positions;
        self
    }

    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn failing_orders(mut self) -> Self {
        self.fail_orders = true;
        self
    }

    pub fn filled(mut self) -> Self {
        self.fill.state = OrderState::Filled;
        self.fill.filled_quantity = self.fill.quantity;
        self
    }

    pub fn placed_count(&self) -> usize {
        self.placed.lock().unwrap().len()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancelled.lock().unwrap().len()
    }
}

#[async_trait]
impl ExchangeAdapter for FakeExchange {
    fn exchange(&self) -> Exchange {
        self.exchange
    }

    async fn is_account_ready(&self) -> Result<bool> {
        if self.ready {
            Ok(true)
        } else {
            Err(RelayError::exchange(self.exchange, "account unreachable"))
        }
    }

    async fn account_equity(&self) -> Result<Decimal> {
        Ok(self.equity)
    }

    async fn open_positions(&self) -> Result<Vec<Position>> {
        Ok(self.positions.lock().unwrap().clone())
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<PlacedOrder> {
        if self.fail_orders {
            return Err(RelayError::exchange(self.exchange, "Margin is insufficient."));
        }
        let mut placed = self.placed.lock().unwrap();
        placed.push(order.clone());
        Ok(PlacedOrder {
            order_id: placed.len().to_string(),
            client_order_id: order.client_order_id.clone(),
            market: order.market.clone(),
        })
    }

    async fn order_status(&self, _order: &PlacedOrder) -> Result<OrderFill> {
        *self.status_queries.lock().unwrap() += 1;
        Ok(self.fill.clone())
    }

    async fn cancel_order(&self, order: &PlacedOrder) -> Result<()> {
        self.cancelled.lock().unwrap().push(order.clone());
        Ok(())
    }
}

/// Fully wired relay around fake exchanges
pub struct TestRelay {
    pub router: Arc<AlertRouter>,
    pub poller: PositionPoller,
    pub book: Arc<PositionBook>,
    pub shutdown: CancellationToken,
    pub export_dir: tempfile::TempDir,
}

pub fn relay(config: AppConfig, exchanges: Vec<Arc<FakeExchange>>) -> TestRelay {
    let mut registry = ExchangeRegistry::new();
    for exchange in exchanges {
        registry.register(exchange);
    }
    let registry = Arc::new(registry);
    let config = Arc::new(config);
    let book = Arc::new(PositionBook::new());
    let shutdown = CancellationToken::new();
    let export_dir = tempfile::tempdir().unwrap();

    let poller = PositionPoller::new(
        registry.clone(),
        book.clone(),
        PositionExporter::new(export_dir.path()),
        config.settings.poll_interval(),
    );
    let router = Arc::new(AlertRouter::new(
        config,
        registry,
        book.clone(),
        FillSupervisor::new(shutdown.clone()),
    ));

    TestRelay {
        router,
        poller,
        book,
        shutdown,
        export_dir,
    }
}

/// Alert body with the fields every test needs
pub fn alert(exchange: &str, extra: Value) -> Value {
    let mut payload = json!({
        "exchange": exchange,
        "strategy": "ema-cross",
        "market": "BTC_USD",
        "order": "buy",
        "price": 100,
        "size": 1
    });
    for (key, value) in extra.as_object().unwrap() {
        payload[key] = value.clone();
    }
    payload
}

/// Sample futures REST payloads
pub mod fapi {
    pub const BALANCE: &str = r#"[
        {"accountAlias":"SgsR","asset":"BNB","balance":"0.10","crossWalletBalance":"0.10","crossUnPnl":"0","availableBalance":"0.10"},
        {"accountAlias":"SgsR","asset":"USDT","balance":"1200.50","crossWalletBalance":"1200.50","crossUnPnl":"-200.50","availableBalance":"900"}
    ]"#;

    pub const POSITION_RISK: &str = r#"[
        {"symbol":"BTCUSDT","positionAmt":"0.250","entryPrice":"60000.0","markPrice":"61000","unRealizedProfit":"250","positionSide":"BOTH","updateTime":1700000000000},
        {"symbol":"ETHUSDT","positionAmt":"-1.5","entryPrice":"3000","markPrice":"2950","unRealizedProfit":"75","positionSide":"BOTH","updateTime":1700000000001},
        {"symbol":"SOLUSDT","positionAmt":"0.000","entryPrice":"0.0","markPrice":"150","unRealizedProfit":"0","positionSide":"BOTH","updateTime":0}
    ]"#;

    pub const NEW_ORDER: &str = r#"{"orderId":22542179,"symbol":"BTCUSDT","status":"NEW","clientOrderId":"abc123","price":"60600","origQty":"0.25","executedQty":"0"}"#;

    pub const PARTIAL_ORDER: &str = r#"{"orderId":22542179,"symbol":"BTCUSDT","status":"PARTIALLY_FILLED","clientOrderId":"abc123","price":"60600","origQty":"0.25","executedQty":"0.1"}"#;

    pub const ERROR: &str = r#"{"code":-2019,"msg":"Margin is insufficient."}"#;
}
