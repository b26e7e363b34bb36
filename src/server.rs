//! HTTP ingest for hand landmark frames.
//!
//! This module provides an HTTP server that:
//! - Accepts one hand frame per request via POST /frames
//! - Runs it through a shared `GestureEngine`
//! - Returns the gestures that surfaced for that frame
//!
//! # Architecture
//!
//! ```text
//! Hand tracker ──→ POST /frames ──→ GestureEngine ──→ { gestures: [...] }
//!                                        ↑
//!                  POST /reset ──────────┘
//! ```

use crate::core::engine::{EngineConfig, GestureEngine};
use crate::core::gesture::GestureNotification;
use crate::source::types::{HandFrame, HandIdentity};
use crate::stats::{create_shared_stats, SharedSessionStats, StatsSnapshot};
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

/// Server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Thresholds for the shared engine
    pub engine: EngineConfig,
}

impl ServerConfig {
    pub fn new(port: u16, engine: EngineConfig) -> Self {
        Self { port, engine }
    }
}

/// Shared server state
pub struct ServerState {
    engine: Mutex<GestureEngine>,
    stats: SharedSessionStats,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> Self {
        let stats = create_shared_stats();
        Self {
            engine: Mutex::new(GestureEngine::new(config.engine.clone()).with_stats(stats.clone())),
            stats,
        }
    }
}

/// Response from the frames endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramesResponse {
    pub gestures: Vec<GestureNotification>,
}

/// Body of a reset request; no hand means every hand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub hand: Option<HandIdentity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub status: String,
    /// Hands still tracked after the reset
    pub tracked_hands: usize,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /frames
///
/// Classifies one frame. Malformed frames are rejected without touching any
/// hand's state.
async fn frames(
    State(state): State<Arc<ServerState>>,
    Json(frame): Json<HandFrame>,
) -> Result<Json<FramesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut engine = state.engine.lock().await;
    let gestures = engine.process_frame(&frame).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
                code: "INVALID_FRAME".to_string(),
            }),
        )
    })?;

    Ok(Json(FramesResponse { gestures }))
}

/// POST /reset
async fn reset(
    State(state): State<Arc<ServerState>>,
    body: Option<Json<ResetRequest>>,
) -> Json<ResetResponse> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let mut engine = state.engine.lock().await;
    match request.hand {
        Some(hand) => {
            engine.reset(&hand);
        }
        None => engine.reset_all(),
    }

    Json(ResetResponse {
        status: "ok".to_string(),
        tracked_hands: engine.tracked_hands(),
    })
}

/// GET /stats
async fn stats(State(state): State<Arc<ServerState>>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}

/// Build the router around a shared state.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/frames", post(frames))
        .route("/reset", post(reset))
        .route("/stats", get(stats))
        .layer(
            CorsLayer::new()
                .allow_origin([
                    HeaderValue::from_static("http://localhost"),
                    HeaderValue::from_static("http://127.0.0.1"),
                ])
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let state = Arc::new(ServerState::new(&config));
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Gesture server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
