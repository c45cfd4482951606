//! Authentication middleware
//!
//! Validates bearer JWTs and places the caller's `Principal` in the request
//! extensions for the workload handlers.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use kubegate_common::{AccessLevel, Principal};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (caller id)
    pub sub: String,
    pub access_level: AccessLevel,
    /// Expiration time (seconds since epoch)
    pub exp: usize,
    /// Issued at (seconds since epoch)
    pub iat: usize,
}

/// Reject requests without a valid bearer token
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::AuthenticationFailed("Bearer token required".to_string()))?;

    let claims = validate_jwt_token(&state.config.auth.jwt_secret, token)
        .map_err(ApiError::AuthenticationFailed)?;

    let principal = Principal::new(claims.sub, claims.access_level);
    tracing::debug!(principal = %principal.id, level = %principal.access_level, "Authenticated request");
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Validate JWT token with signature verification
pub fn validate_jwt_token(secret: &str, token: &str) -> Result<Claims, String> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

/// Issue an HS256 token for a caller
pub fn generate_jwt_token(
    secret: &str,
    subject: &str,
    access_level: AccessLevel,
    ttl_secs: usize,
) -> Result<String, String> {
    let now = chrono::Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: subject.to_string(),
        access_level,
        exp: now + ttl_secs,
        iat: now,
    };

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::new(Algorithm::HS256);

    encode(&header, &claims, &encoding_key).map_err(|e| format!("Failed to generate JWT: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let token = generate_jwt_token(SECRET, "alice", AccessLevel::Admin, 3600).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = validate_jwt_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.access_level, AccessLevel::Admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = generate_jwt_token(SECRET, "alice", AccessLevel::User, 3600).unwrap();
        assert!(validate_jwt_token("other-secret", &token).is_err());
    }

    #[test]
    fn test_validate_invalid_token() {
        assert!(validate_jwt_token(SECRET, "invalid").is_err());
    }
}
