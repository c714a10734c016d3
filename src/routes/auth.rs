/**
 * Authentication
 * Bearer JWT verification for the admin API. Tokens are issued elsewhere.
 */
use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::AppError;

pub const ADMIN_ROLE: &str = "admin";

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,   // User ID
    pub email: String, // User email
    pub role: String,  // User role
    pub exp: i64,      // Expiry timestamp
    pub iat: i64,      // Issued at timestamp
}

/// Verify and decode access token
pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Middleware for `/api/admin`: requires a valid admin token and makes the
/// claims available to handlers as a request extension.
pub async fn require_admin(mut request: Request, next: Next) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("No authorization token provided".to_string()))?;

    let claims = verify_access_token(&token, &config::get().jwt_secret).map_err(|e| {
        tracing::debug!("Token verification failed: {}", e);
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;

    if claims.role != ADMIN_ROLE {
        tracing::warn!(user = %claims.sub, role = %claims.role, "non-admin token rejected");
        return Err(AppError::Unauthorized("Admin role required".to_string()));
    }

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
