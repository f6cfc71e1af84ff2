use std::sync::Arc;

use axum::{Router, middleware};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

use crate::{
    config::AppConfig, middleware::json_error_middleware, routes::router, state::AppState,
};

pub const TEST_JWT_SECRET: &str = "test-access-secret";
pub const TEST_REFRESH_SECRET: &str = "test-refresh-secret";

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    cfg.auth.refresh_secret = TEST_REFRESH_SECRET.to_string();
    cfg
}

pub fn test_state(db: DatabaseConnection) -> Arc<AppState> {
    AppState::new(test_config(), db)
}

/// Router over `db` with the same error rewriting the server uses.
pub fn test_router_with_db(db: DatabaseConnection) -> Router {
    router(test_state(db)).layer(middleware::from_fn(json_error_middleware))
}

pub fn test_router() -> Router {
    test_router_with_db(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}
