// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Liveness and health endpoints; no identity is established here.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - welcome message
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Artenact API! 🎨" }))
}

/// GET /health - reports whether the profile store is reachable
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.profiles.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "version": env!("CARGO_PKG_VERSION"),
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "detail": "profile store unavailable",
                })),
            )
        }
    }
}
