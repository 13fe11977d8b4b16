//! HTTP server exposing the session event channel

pub mod websocket;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::session::{PeerHub, SessionContext};
use crate::{Config, Result};

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Session-independent inputs shared by every connection
    pub ctx: Arc<SessionContext>,
}

/// Event channel server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Build the server from loaded configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let hub = Arc::new(PeerHub::new());
        let ctx = Arc::new(SessionContext::from_config(config, hub));
        Self {
            state: Arc::new(ApiState { ctx }),
            port: config.server.port,
        }
    }

    /// Build the router with CORS and request tracing
    fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/health", get(health))
            .merge(websocket::router(Arc::clone(&self.state)))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run.
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind event channel: {e}")))?;

        tracing::info!(port = self.port, "event channel listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Channel(format!("server error: {e}")))?;

        Ok(())
    }

    /// Run the server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}

/// Liveness probe
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
