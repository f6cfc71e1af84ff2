use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    middleware::AuthUser,
    response::{ApiResult, JsonApiResponse},
    services::training_service::ProgressView,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub quality: u8,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/training/openings/{opening_id}/reviews", post(record_review))
        .route("/training/due", get(due_reviews))
        .route("/training/progress", get(list_progress))
        .with_state(state)
}

async fn record_review(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(opening_id): Path<String>,
    Json(body): Json<ReviewRequest>,
) -> ApiResult<ProgressView> {
    let progress = state
        .services
        .training()
        .record_review(&user_id, &opening_id, body.quality)
        .await?;
    JsonApiResponse::ok(progress)
}

async fn due_reviews(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Vec<ProgressView>> {
    JsonApiResponse::ok(state.services.training().due_reviews(&user_id).await?)
}

async fn list_progress(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Vec<ProgressView>> {
    JsonApiResponse::ok(state.services.training().list_progress(&user_id).await?)
}
