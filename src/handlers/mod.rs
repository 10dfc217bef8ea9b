pub mod scan;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, routing::post, Json, Router};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::jwt_auth_middleware;
use crate::verify::VerificationController;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<VerificationController>,
    /// Health probe target; None when running on the in-memory store.
    pub db: Option<PgPool>,
}

/// Build the full router. Lives in the library so tests can drive it
/// in-process against the in-memory repository.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/scan/verify", post(scan::verify_post))
        .route("/api/scan/admit", post(scan::admit_post))
        .route("/api/scan/stats", get(scan::stats_get))
        .layer(axum_middleware::from_fn(jwt_auth_middleware))
        .with_state(state.clone());

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
        .merge(protected)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Gatecheck API",
            "version": version,
            "description": "Ticket verification service: scan, verify and admit event tickets exactly once",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "verify": "POST /api/scan/verify (operator token)",
                "admit": "POST /api/scan/admit (operator token)",
                "stats": "GET /api/scan/stats (operator token)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    let database = match &state.db {
        None => Ok("disabled".to_string()),
        Some(pool) => sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map(|_| "ok".to_string())
            .map_err(|e| e.to_string()),
    };

    match database {
        Ok(database) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": database
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e
                }
            })),
        ),
    }
}
