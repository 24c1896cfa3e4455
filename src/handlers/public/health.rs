// handlers/public/health.rs - GET / and GET /health

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::state::AppState;
use crate::types::timestamp;

/// GET / - service banner
pub async fn root_get() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Multi-tenant childcare facility management API",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/register, /auth/login (public - token acquisition)",
                "api": "/api/* (protected - ?location=<id> selects the location for owners)",
                "admin": "/api/admin/* (organization owner)",
            }
        }
    }))
}

/**
 * GET /health - liveness plus a store connectivity probe
 *
 * Answers 503 when the store probe fails. `ai` reports whether a
 * completion endpoint is configured.
 */
pub async fn health_get(State(state): State<AppState>) -> impl IntoResponse {
    let now = timestamp::format(&timestamp::now());

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok",
                    "ai": state.ai.is_some()
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check store probe failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "store unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "store_error": e.to_string()
                    }
                })),
            )
        }
    }
}
