//! HTTP API surface

pub mod orders;

use axum::{Json, Router, extract::State, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::core::ServerState;

/// Build the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .merge(orders::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe; the epoch and sequence let clients detect server
/// restarts and missed events
async fn health(State(state): State<ServerState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "epoch": state.orders.epoch(),
        "sequence": state.orders.current_sequence().unwrap_or(0),
    }))
}
