//! Wire types of the futures REST dialect
//!
//! Numeric fields arrive as strings and are parsed by the client.

use serde::{Deserialize, Deserializer, Serialize};

/// Entry of `GET /fapi/v2/balance`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEntry {
    pub asset: String,
    pub balance: String,
    #[serde(default)]
    pub cross_un_pnl: Option<String>,
    #[serde(default)]
    pub available_balance: Option<String>,
}

/// Entry of `GET /fapi/v2/positionRisk`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRisk {
    pub symbol: String,
    /// Signed; negative for shorts
    pub position_amt: String,
    pub entry_price: String,
    #[serde(default)]
    pub mark_price: Option<String>,
    #[serde(default, rename = "unRealizedProfit")]
    pub unrealized_profit: Option<String>,
    #[serde(default)]
    pub position_side: Option<String>,
    #[serde(default)]
    pub update_time: Option<i64>,
}

/// Order as returned by place/query/cancel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub order_id: String,
    pub symbol: String,
    pub status: String,
    #[serde(default)]
    pub client_order_id: String,
    #[serde(default)]
    pub price: Option<String>,
    pub orig_qty: String,
    pub executed_qty: String,
}

/// Error body, e.g. `{"code":-2019,"msg":"Margin is insufficient."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i64,
    pub msg: String,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
