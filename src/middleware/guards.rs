use std::sync::Arc;

use axum::{extract::FromRequestParts, http::header};
use uuid::Uuid;

use crate::{auth::Claims, error::AppError, state::AppState};

const INVALID_TOKEN: &str = "Invalid or expired token";

// Auth guard: verify the bearer token and hand the claims to the handler.
impl FromRequestParts<Arc<AppState>> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(claims);
        }

        let auth = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        let token = auth
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::unauthorized("Missing or invalid Authorization header"))?;

        let claims = state
            .services
            .tokens()
            .verify_access_token(token)
            .ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))?;

        parts.extensions.insert(claims.clone());
        Ok(claims)
    }
}

/// Authenticated caller, reduced to the user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = Claims::from_request_parts(parts, state).await?;
        claims
            .user_id()
            .map(AuthUser)
            .ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))
    }
}
