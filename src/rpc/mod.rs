pub mod handlers;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::account::{Authenticator, TokenIssuer};
use crate::card::CardService;
use crate::error::OrbitError;

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub issuer: Arc<TokenIssuer>,
    pub cards: Arc<CardService>,
    pub version: String,
}

impl AppState {
    pub fn new(authenticator: Arc<Authenticator>, cards: Arc<CardService>, version: &str) -> Self {
        Self {
            issuer: authenticator.issuer().clone(),
            authenticator,
            cards,
            version: version.to_string(),
        }
    }
}

/// All API routes, with CORS and request tracing applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/login", post(handlers::login))
        .route(
            "/api/cards",
            get(handlers::list_cards).post(handlers::create_card),
        )
        .route("/api/cards/:identifier", get(handlers::get_card))
        .route("/api/dashboard-stats", get(handlers::dashboard_stats))
        .route("/api/sla", get(handlers::sla_metrics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct RpcServer {
    state: AppState,
    bind_addr: String,
}

impl RpcServer {
    pub fn new(state: AppState, bind_addr: String) -> Self {
        Self { state, bind_addr }
    }

    pub async fn start(self) -> Result<(), OrbitError> {
        let app = router(self.state);

        let listener = tokio::net::TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| OrbitError::Internal(format!("failed to bind {}: {}", self.bind_addr, e)))?;

        tracing::info!("HTTP server listening on {}", self.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| OrbitError::Internal(format!("server failed: {}", e)))
    }
}
