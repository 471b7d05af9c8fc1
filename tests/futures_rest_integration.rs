//! Tests for the futures REST adapter against a local mock server

mod common;

use rust_decimal_macros::dec;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::fapi;
use signal_relay::common::types::{
    Direction, Exchange, OrderRequest, OrderState, PlacedOrder, PositionSide, Side,
};
use signal_relay::config::ApiCredentials;
use signal_relay::{ExchangeAdapter, FuturesRestClient, RelayError};

fn client(server: &MockServer) -> FuturesRestClient {
    FuturesRestClient::new(
        Exchange::Aster,
        &server.uri(),
        ApiCredentials::new("test_key".to_string(), "test_secret".to_string()),
    )
    .unwrap()
}

fn json(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/json")
}

fn placed() -> PlacedOrder {
    PlacedOrder {
        order_id: "22542179".to_string(),
        client_order_id: "abc123".to_string(),
        market: "BTCUSDT".to_string(),
    }
}

#[tokio::test]
async fn test_open_positions_skips_flat_symbols() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v2/positionRisk"))
        .and(header("X-MBX-APIKEY", "test_key"))
        .respond_with(json(fapi::POSITION_RISK))
        .expect(1)
        .mount(&server)
        .await;

    let positions = client(&server).open_positions().await.unwrap();

    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0].market, "BTCUSDT");
    assert_eq!(positions[0].side, PositionSide::Long);
    assert_eq!(positions[0].size, dec!(0.25));
    assert_eq!(positions[0].entry_price, dec!(60000));
    assert_eq!(positions[1].side, PositionSide::Short);
    assert_eq!(positions[1].size, dec!(1.5));
}

#[tokio::test]
async fn test_requests_are_signed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v2/balance"))
        .respond_with(json(fapi::BALANCE))
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(client.is_account_ready().await.unwrap());

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(query.contains("timestamp="));
    assert!(query.contains("recvWindow=5000"));
    let (payload, signature) = query.rsplit_once("&signature=").unwrap();
    assert_eq!(
        signature,
        signal_relay::exchange::auth::sign_query("test_secret", payload).unwrap()
    );
}

#[tokio::test]
async fn test_account_equity_includes_unrealized_pnl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v2/balance"))
        .respond_with(json(fapi::BALANCE))
        .mount(&server)
        .await;

    assert_eq!(client(&server).account_equity().await.unwrap(), dec!(1000));
}

#[tokio::test]
async fn test_place_order_posts_signed_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/order"))
        .and(header("X-MBX-APIKEY", "test_key"))
        .respond_with(json(fapi::NEW_ORDER))
        .expect(1)
        .mount(&server)
        .await;

    let order = OrderRequest {
        market: "BTCUSDT".to_string(),
        side: Side::Sell,
        size: dec!(0.250),
        limit_price: dec!(60600.00),
        client_order_id: "abc123".to_string(),
        direction: Some(Direction::Long),
    };
    let placed = client(&server).place_order(&order).await.unwrap();

    assert_eq!(placed.order_id, "22542179");
    assert_eq!(placed.client_order_id, "abc123");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.starts_with(
        "symbol=BTCUSDT&side=SELL&type=LIMIT&timeInForce=GTC&quantity=0.25&price=60600&newClientOrderId=abc123&positionSide=LONG&timestamp="
    ));
    assert!(body.contains("&signature="));
}

#[tokio::test]
async fn test_order_status_reports_partial_fill() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/order"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("orderId", "22542179"))
        .respond_with(json(fapi::PARTIAL_ORDER))
        .mount(&server)
        .await;

    let fill = client(&server).order_status(&placed()).await.unwrap();

    assert_eq!(fill.state, OrderState::PartiallyFilled);
    assert_eq!(fill.filled_quantity, dec!(0.1));
    assert!(!fill.is_filled());
}

#[tokio::test]
async fn test_cancel_order_uses_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/fapi/v1/order"))
        .and(query_param("orderId", "22542179"))
        .respond_with(json(fapi::NEW_ORDER))
        .expect(1)
        .mount(&server)
        .await;

    tokio_test::assert_ok!(client(&server).cancel_order(&placed()).await);
}

#[tokio::test]
async fn test_exchange_error_body_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/order"))
        .respond_with(ResponseTemplate::new(400).set_body_raw(fapi::ERROR, "application/json"))
        .mount(&server)
        .await;

    let order = OrderRequest {
        market: "BTCUSDT".to_string(),
        side: Side::Buy,
        size: dec!(1),
        limit_price: dec!(1),
        client_order_id: "x".to_string(),
        direction: None,
    };
    let err = client(&server).place_order(&order).await.unwrap_err();

    match err {
        RelayError::Exchange { exchange, message } => {
            assert_eq!(exchange, Exchange::Aster);
            assert!(message.contains("Margin is insufficient."));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unstructured_error_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v2/positionRisk"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = tokio_test::assert_err!(client(&server).open_positions().await);
    assert!(matches!(err, RelayError::InvalidResponse(msg) if msg.contains("503")));
}
