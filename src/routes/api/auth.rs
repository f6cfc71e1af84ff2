use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{RevokeOutcome, TokenBundle},
    middleware::AuthUser,
    response::{ApiResult, JsonApiResponse},
    services::{
        auth_service::{AuthResult, RegisterInput},
        user_service::UserProfile,
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub revoked: bool,
    pub count: u64,
}

impl From<RevokeOutcome> for LogoutResponse {
    fn from(outcome: RevokeOutcome) -> Self {
        let count = match outcome {
            RevokeOutcome::Revoked(count) => count,
            RevokeOutcome::NothingToRevoke | RevokeOutcome::StoreUnavailable => 0,
        };
        Self {
            revoked: outcome.revoked(),
            count,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/logout-all", post(logout_all))
        .route("/auth/profile", get(profile))
        .with_state(state)
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<AuthResult> {
    let result = state
        .services
        .auth()
        .register(RegisterInput {
            email: body.email,
            username: body.username,
            password: body.password,
            confirm_password: body.confirm_password,
        })
        .await?;
    JsonApiResponse::created(result)
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<AuthResult> {
    let result = state
        .services
        .auth()
        .login(&body.email, &body.password)
        .await?;
    JsonApiResponse::ok(result)
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<TokenBundle> {
    let tokens = state
        .services
        .auth()
        .refresh_tokens(&body.refresh_token)
        .await?;
    JsonApiResponse::ok(tokens)
}

// Always 200: a failed cleanup must not fail the client's logout.
async fn logout(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<LogoutResponse> {
    let outcome = state.services.auth().logout(&body.refresh_token).await;
    JsonApiResponse::ok(outcome.into())
}

async fn logout_all(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<LogoutResponse> {
    let outcome = state.services.auth().logout_all_devices(&user_id).await;
    JsonApiResponse::ok(outcome.into())
}

async fn profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<UserProfile> {
    JsonApiResponse::ok(state.services.auth().profile(&user_id).await?)
}
