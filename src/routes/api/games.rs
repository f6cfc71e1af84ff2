use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::dao::PaginatedResponse,
    error::AppError,
    middleware::AuthUser,
    response::{ApiResult, JsonApiResponse},
    services::game_service::GameView,
    state::AppState,
};

const DEFAULT_PAGE_SIZE: u64 = 20;

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub player_color: String,
    pub fen: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "move")]
    pub mv: String,
    pub fen: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/games", post(create_game).get(list_games))
        .route("/games/{id}", get(get_game).delete(delete_game))
        .route("/games/{id}/moves", post(apply_move))
        .route("/games/{id}/status", patch(update_status))
        .with_state(state)
}

async fn create_game(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateGameRequest>,
) -> ApiResult<GameView> {
    let game = state
        .services
        .games()
        .create_game(&user_id, &body.player_color, body.fen.as_deref())
        .await?;
    JsonApiResponse::created(game)
}

async fn list_games(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<PaginatedResponse<GameView>> {
    let Query(query) = query.map_err(|_| AppError::bad_request("Invalid query"))?;
    let games = state
        .services
        .games()
        .list_games(
            &user_id,
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;
    JsonApiResponse::ok(games)
}

async fn get_game(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<GameView> {
    JsonApiResponse::ok(state.services.games().get_game(&user_id, &id).await?)
}

async fn apply_move(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<MoveRequest>,
) -> ApiResult<GameView> {
    let game = state
        .services
        .games()
        .apply_move(&user_id, &id, &body.mv, body.fen.as_deref())
        .await?;
    JsonApiResponse::ok(game)
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusRequest>,
) -> ApiResult<GameView> {
    let game = state
        .services
        .games()
        .update_status(&user_id, &id, &body.status)
        .await?;
    JsonApiResponse::ok(game)
}

async fn delete_game(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    state.services.games().delete_game(&user_id, &id).await?;
    JsonApiResponse::ok(Deleted { id })
}
