//! HTTP route definitions

use axum::{
    extract::State,
    http::Method,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::app::AppState;
use crate::util::time::uptime_secs;
use crate::world::WorldSnapshot;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // The game client is served from anywhere, so CORS is wide open
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/world-data", get(world_data_handler))
        .route("/ws", get(ws_handler))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(&static_dir))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    connections: usize,
    players: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        connections: state.hub.connection_count(),
        players: state.registry.player_count(),
    })
}

// ============================================================================
// World data endpoint
// ============================================================================

async fn world_data_handler(State(state): State<AppState>) -> Json<WorldSnapshot> {
    Json(state.world.as_ref().clone())
}
