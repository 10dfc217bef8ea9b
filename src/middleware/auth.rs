use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{Json, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::Claims;
use crate::config;
use crate::error::ApiError;

/// Authenticated operator context extracted from JWT
#[derive(Clone, Debug)]
pub struct OperatorContext {
    pub operator: String,
    pub access: String,
    pub operator_id: Uuid,
}

impl From<Claims> for OperatorContext {
    fn from(claims: Claims) -> Self {
        Self {
            operator: claims.operator,
            access: claims.access,
            operator_id: claims.operator_id,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts the
/// operator context for the scan endpoints
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<Value>)> {
    // Extract JWT from Authorization header
    let token = extract_jwt_from_headers(&headers).map_err(|msg| {
        let api_error = ApiError::unauthorized(msg);
        (
            StatusCode::from_u16(api_error.status_code()).unwrap(),
            Json(api_error.to_json()),
        )
    })?;

    // Validate and decode JWT
    let claims = validate_jwt(&token).map_err(|msg| {
        let api_error = ApiError::unauthorized(msg);
        (
            StatusCode::from_u16(api_error.status_code()).unwrap(),
            Json(api_error.to_json()),
        )
    })?;

    // Convert claims to OperatorContext and inject into request
    let operator = OperatorContext::from(claims);
    request.extensions_mut().insert(operator);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}
