use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::handlers::AppState;
use crate::middleware::OperatorContext;

use super::require_verifier;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// Raw scan payload from any source: camera decode, uploaded-image
    /// decode, or operator-typed text.
    pub payload: String,
}

/// POST /api/scan/verify - resolve a raw payload into a scan outcome.
/// Read-only; the admit affordance is a separate call.
pub async fn verify_post(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorContext>,
    Json(body): Json<VerifyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_verifier(&state, &operator).await?;

    let outcome = state.controller.verify(&body.payload).await;
    Ok(Json(json!({ "success": true, "data": outcome })))
}
