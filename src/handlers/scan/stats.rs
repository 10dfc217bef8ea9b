use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::handlers::AppState;
use crate::middleware::OperatorContext;

use super::require_verifier;

/// GET /api/scan/stats - the operator's running admission tally.
/// Display-only aggregate; no correctness dependency.
pub async fn stats_get(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorContext>,
) -> Result<impl IntoResponse, ApiError> {
    require_verifier(&state, &operator).await?;

    let admitted = state.controller.used_count(&operator.operator).await?;
    Ok(Json(json!({ "success": true, "data": { "admitted": admitted } })))
}
