//! Adapter for exchanges speaking the Binance-compatible futures REST API

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument};
use url::form_urlencoded;

use super::auth::{signed_query, API_KEY_HEADER};
use super::messages::{ApiErrorResponse, BalanceEntry, OrderResponse, PositionRisk};
use crate::common::errors::{RelayError, Result};
use crate::common::traits::ExchangeAdapter;
use crate::common::types::{
    Direction, Exchange, OrderFill, OrderRequest, OrderState, PlacedOrder, Position,
    PositionDetails,
};
use crate::config::types::ApiCredentials;

const QUOTE_ASSET: &str = "USDT";
const DEFAULT_RECV_WINDOW: u64 = 5000;

/// Signed REST client for `/fapi` style futures endpoints
#[derive(Debug, Clone)]
pub struct FuturesRestClient {
    exchange: Exchange,
    client: Client,
    base_url: String,
    credentials: ApiCredentials,
    recv_window: u64,
}

impl FuturesRestClient {
    pub fn new(exchange: Exchange, base_url: &str, credentials: ApiCredentials) -> Result<Self> {
        Self::with_timeout(exchange, base_url, credentials, Duration::from_secs(10))
    }

    pub fn with_timeout(
        exchange: Exchange,
        base_url: &str,
        credentials: ApiCredentials,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Internal(e.to_string()))?;

        Ok(Self {
            exchange,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            recv_window: DEFAULT_RECV_WINDOW,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        let signed = signed_query(
            &self.credentials.api_secret,
            &query,
            chrono::Utc::now().timestamp_millis(),
            self.recv_window,
        )?;

        let request = if method == Method::POST {
            let url = format!("{}{}", self.base_url, path);
            debug!("{} {}", method, url);
            self.client
                .post(&url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(signed)
        } else {
            let url = format!("{}{}?{}", self.base_url, path, signed);
            debug!("{} {}{}", method, self.base_url, path);
            self.client.request(method, &url)
        };

        let response = request
            .header(API_KEY_HEADER, &self.credentials.api_key)
            .send()
            .await?;
        self.read(response).await
    }

    async fn read<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(RelayError::exchange(
                    self.exchange,
                    format!("{} (code {})", error.msg, error.code),
                ));
            }
            return Err(RelayError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn balances(&self) -> Result<Vec<BalanceEntry>> {
        self.signed(Method::GET, "/fapi/v2/balance", &[]).await
    }

    fn order_params(order: &PlacedOrder) -> Vec<(&'static str, String)> {
        vec![
            ("symbol", order.market.clone()),
            ("orderId", order.order_id.clone()),
        ]
    }
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| RelayError::InvalidResponse(format!("Invalid {} '{}': {}", field, value, e)))
}

fn position_side(direction: Direction) -> &'static str {
    match direction {
        Direction::Long => "LONG",
        Direction::Short => "SHORT",
    }
}

#[async_trait]
impl ExchangeAdapter for FuturesRestClient {
    fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// Symbols are concatenated uppercase (`btc_usdt` -> `BTCUSDT`)
    fn normalize_market(&self, market: &str) -> String {
        market
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | '/'))
            .collect::<String>()
            .to_uppercase()
    }

    #[instrument(skip(self), fields(exchange = %self.exchange))]
    async fn is_account_ready(&self) -> Result<bool> {
        self.balances().await.map(|_| true)
    }

    #[instrument(skip(self), fields(exchange = %self.exchange))]
    async fn account_equity(&self) -> Result<Decimal> {
        let balances = self.balances().await?;
        let entry = balances
            .iter()
            .find(|b| b.asset == QUOTE_ASSET)
            .ok_or_else(|| {
                RelayError::InvalidResponse(format!("No {} balance returned", QUOTE_ASSET))
            })?;

        let balance = parse_decimal("balance", &entry.balance)?;
        let unrealized = match &entry.cross_un_pnl {
            Some(pnl) => parse_decimal("crossUnPnl", pnl)?,
            None => Decimal::ZERO,
        };
        Ok(balance + unrealized)
    }

    #[instrument(skip(self), fields(exchange = %self.exchange))]
    async fn open_positions(&self) -> Result<Vec<Position>> {
        let risks: Vec<PositionRisk> = self
            .signed(Method::GET, "/fapi/v2/positionRisk", &[])
            .await?;

        let mut positions = Vec::new();
        for risk in risks {
            let amount = parse_decimal("positionAmt", &risk.position_amt)?;
            if amount.is_zero() {
                continue;
            }
            let entry_price = parse_decimal("entryPrice", &risk.entry_price)?;

            let mut position = Position::from_signed(risk.symbol, amount, entry_price);
            position.details = PositionDetails {
                status: Some("OPEN".to_string()),
                created_at: risk.update_time.map(|t| t.to_string()),
                ..Default::default()
            };
            positions.push(position);
        }

        Ok(positions)
    }

    #[instrument(skip(self, order), fields(exchange = %self.exchange, market = %order.market))]
    async fn place_order(&self, order: &OrderRequest) -> Result<PlacedOrder> {
        let mut params = vec![
            ("symbol", order.market.clone()),
            ("side", order.side.to_string()),
            ("type", "LIMIT".to_string()),
            ("timeInForce", "GTC".to_string()),
            ("quantity", order.size.normalize().to_string()),
            ("price", order.limit_price.normalize().to_string()),
            ("newClientOrderId", order.client_order_id.clone()),
        ];
        if let Some(direction) = order.direction {
            params.push(("positionSide", position_side(direction).to_string()));
        }

        let response: OrderResponse = self.signed(Method::POST, "/fapi/v1/order", &params).await?;
        debug!("Order {} accepted with status {}", response.order_id, response.status);

        Ok(PlacedOrder {
            order_id: response.order_id,
            client_order_id: order.client_order_id.clone(),
            market: response.symbol,
        })
    }

    #[instrument(skip(self), fields(exchange = %self.exchange))]
    async fn order_status(&self, order: &PlacedOrder) -> Result<OrderFill> {
        let response: OrderResponse = self
            .signed(Method::GET, "/fapi/v1/order", &Self::order_params(order))
            .await?;

        Ok(OrderFill {
            state: OrderState::parse(&response.status),
            filled_quantity: parse_decimal("executedQty", &response.executed_qty)?,
            quantity: parse_decimal("origQty", &response.orig_qty)?,
        })
    }

    #[instrument(skip(self), fields(exchange = %self.exchange))]
    async fn cancel_order(&self, order: &PlacedOrder) -> Result<()> {
        let _: OrderResponse = self
            .signed(Method::DELETE, "/fapi/v1/order", &Self::order_params(order))
            .await?;
        Ok(())
    }
}
