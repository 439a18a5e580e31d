//! Transport server
//!
//! Routes:
//!
//! - `GET /` health check
//! - `GET /ws/crawl` WebSocket; each connection runs exactly one crawl session

mod ws;

use crate::config::ServerConfig;
use crate::crawler::{build_http_client, SessionOptions};
use crate::SkeinError;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use reqwest::Client;
use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared by every connection; sessions share nothing else
#[derive(Clone)]
pub struct AppState {
    client: Client,
    options: SessionOptions,
}

impl AppState {
    pub fn new(client: Client, options: SessionOptions) -> Self {
        Self { client, options }
    }

    /// Builds the HTTP client and session limits from the process configuration
    pub fn from_config(config: &ServerConfig) -> Result<Self, SkeinError> {
        let client = build_http_client(&config.user_agent, &config.crawler)?;
        Ok(Self::new(client, SessionOptions::from(&config.crawler)))
    }
}

/// Build the axum router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/ws/crawl", get(crawl_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> Json<Value> {
    Json(json!({"status": "ok", "message": "Skein crawler ready"}))
}

async fn crawl_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws::handle_socket(socket, state))
}

/// Binds the configured address
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, SkeinError> {
    let addr: SocketAddr = config.server.bind.parse().map_err(|e| {
        crate::ConfigError::Validation(format!("bind address '{}': {}", config.server.bind, e))
    })?;
    Ok(TcpListener::bind(addr).await?)
}

/// Serves the router on `listener` until `shutdown` resolves
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> Result<(), SkeinError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!("Skein listening on {}", local_addr);
    info!("  WebSocket: ws://{}/ws/crawl", local_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Binds, serves and stops on Ctrl+C
pub async fn run_server(config: &ServerConfig) -> Result<(), SkeinError> {
    let state = AppState::from_config(config)?;
    let listener = bind(config).await?;
    serve_with_shutdown(listener, state, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    })
    .await
}
