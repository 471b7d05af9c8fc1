//! HTTP front door: alert ingress, liveness and account readiness

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use futures_util::future::join_all;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::common::errors::Result;
use crate::execution::{AlertOutcome, AlertRouter};

pub struct RelayServer {
    router: Arc<AlertRouter>,
}

impl RelayServer {
    pub fn new(router: Arc<AlertRouter>) -> Self {
        Self { router }
    }

    pub fn app(&self) -> Router {
        Router::new()
            .route("/", get(health).post(receive_alert))
            .route("/accounts", get(accounts))
            .layer(TraceLayer::new_for_http())
            .with_state(self.router.clone())
    }

    /// Serve until `shutdown` is cancelled
    ///
    /// # Errors
    /// Returns an error if accepting connections fails
    pub async fn serve(self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        info!("Relay listening on {}", listener.local_addr()?);

        axum::serve(listener, self.app())
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("Relay server stopped");
        Ok(())
    }
}

async fn health() -> &'static str {
    "OK"
}

fn status_for(outcome: &AlertOutcome) -> StatusCode {
    match outcome {
        AlertOutcome::Placed { .. } | AlertOutcome::Skipped { .. } | AlertOutcome::Duplicate => {
            StatusCode::OK
        }
        AlertOutcome::Invalid(_) | AlertOutcome::UnsupportedExchange(_) => StatusCode::BAD_REQUEST,
        AlertOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
    }
}

async fn receive_alert(
    State(router): State<Arc<AlertRouter>>,
    body: Bytes,
) -> (StatusCode, String) {
    let outcome = match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => router.handle(payload).await,
        Err(e) => {
            warn!("Alert body is not JSON: {}", e);
            AlertOutcome::Invalid(e.to_string())
        }
    };

    (status_for(&outcome), outcome.message())
}

/// Readiness of every registered account, keyed by display label
async fn accounts(State(router): State<Arc<AlertRouter>>) -> Json<Value> {
    let checks = router.registry().adapters().map(|adapter| async move {
        let exchange = adapter.exchange();
        let ready = match adapter.is_account_ready().await {
            Ok(ready) => ready,
            Err(e) => {
                warn!("{} readiness check failed: {}", exchange, e);
                false
            }
        };
        (exchange.account_label().to_string(), Value::Bool(ready))
    });

    let report: Map<String, Value> = join_all(checks).await.into_iter().collect();
    Json(Value::Object(report))
}
