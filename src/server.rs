//! HTTP read endpoint
//!
//! `GET /api/market-data?timeframe=<label>` and `GET /health`.

use crate::cache::CacheStore;
use crate::data::sources::QuoteProvider;
use crate::error::Result;
use crate::service::{MarketDataService, ServiceResponse};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

/// Query string of the market data endpoint
#[derive(Debug, Default, Deserialize)]
pub struct MarketDataQuery {
    pub timeframe: Option<String>,
}

impl IntoResponse for ServiceResponse {
    fn into_response(self) -> Response {
        match self {
            ServiceResponse::Served { payload, .. } => (StatusCode::OK, Json(payload)).into_response(),
            ServiceResponse::Failed { error } => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": error }))).into_response()
            }
        }
    }
}

/// Build the router around a shared service
pub fn router<S, P>(service: Arc<MarketDataService<S, P>>) -> Router
where
    S: CacheStore + 'static,
    P: QuoteProvider + 'static,
{
    Router::new()
        .route("/api/market-data", get(market_data::<S, P>))
        .route("/health", get(health))
        .with_state(service)
}

pub async fn market_data<S, P>(
    State(service): State<Arc<MarketDataService<S, P>>>,
    Query(query): Query<MarketDataQuery>,
) -> ServiceResponse
where
    S: CacheStore + 'static,
    P: QuoteProvider + 'static,
{
    service.respond(query.timeframe.as_deref()).await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Serve until Ctrl+C
pub async fn serve<S, P>(service: Arc<MarketDataService<S, P>>, addr: SocketAddr) -> Result<()>
where
    S: CacheStore + 'static,
    P: QuoteProvider + 'static,
{
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("market-pulse listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received, stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCacheStore;
    use crate::service::ServiceOptions;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_market_data_demo_response() {
        let service = Arc::new(MarketDataService::demo(
            InMemoryCacheStore::new(),
            ServiceOptions::default(),
        ));

        let response = market_data(
            State(service),
            Query(MarketDataQuery {
                timeframe: Some("4H".to_string()),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["timeframe"], "4H");
        assert_eq!(body["isDemo"], true);
        assert_eq!(body["pairs"].as_array().unwrap().len(), 28);
    }

    #[tokio::test]
    async fn test_failed_response_shape() {
        let response = ServiceResponse::Failed {
            error: "Provider error: 503".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "error": "Provider error: 503" }));
    }

    #[test]
    fn test_router_builds() {
        let service = Arc::new(MarketDataService::demo(
            InMemoryCacheStore::new(),
            ServiceOptions::default(),
        ));
        let _router = router(service);
    }
}
