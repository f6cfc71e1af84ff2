use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{auth, games, public, training};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public::router())
        .merge(auth::router(state.clone()))
        .merge(games::router(state.clone()))
        .merge(training::router(state))
}
