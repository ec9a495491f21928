// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service description and store health probe. Nothing here touches
// client or project data.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Ledger API",
        "version": version,
        "description": "Client and project records with per-project user assignment",
        "endpoints": {
            "health": "/health (public)",
            "clients": "/clients/, /clients/:id/ (protected)",
            "client_projects": "/clients/:client_id/projects/ (protected)",
            "projects": "/projects/, /projects/:id/ (protected)",
        }
    }))
}

/// GET /health - store reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
