use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::handlers::AppState;
use crate::middleware::OperatorContext;

use super::require_verifier;

#[derive(Debug, Deserialize)]
pub struct AdmitRequest {
    pub reference: String,
}

/// POST /api/scan/admit - perform the single permitted `success -> used`
/// transition. The operator identity comes from the authenticated context,
/// never from the request body.
pub async fn admit_post(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorContext>,
    Json(body): Json<AdmitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_verifier(&state, &operator).await?;

    let outcome = state
        .controller
        .admit(&body.reference, &operator.operator)
        .await;
    Ok(Json(json!({ "success": true, "data": outcome })))
}
