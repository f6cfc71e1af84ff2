use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::{
    auth::TokenService,
    config::AuthConfig,
    db::dao::DaoContext,
    services::{
        auth_service::AuthService, game_service::GameService, token_reaper::TokenReaper,
        training_service::TrainingService, user_service::UserService,
    },
};

/// Every service, built once at startup and shared through `AppState`.
#[derive(Clone)]
pub struct ServiceContext {
    auth: AuthService,
    games: GameService,
    training: TrainingService,
    reaper: TokenReaper,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection, cfg: &AuthConfig) -> Self {
        let daos = DaoContext::new(db);
        let users = UserService::new(daos.user());
        let tokens = TokenService::new(daos.refresh_token(), cfg);

        Self {
            auth: AuthService::new(users, tokens),
            games: GameService::new(daos.game()),
            training: TrainingService::new(daos.opening_progress()),
            reaper: TokenReaper::new(
                daos.refresh_token(),
                Duration::from_secs(cfg.reaper_interval_secs),
            ),
        }
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn tokens(&self) -> &TokenService {
        self.auth.tokens()
    }

    pub fn games(&self) -> &GameService {
        &self.games
    }

    pub fn training(&self) -> &TrainingService {
        &self.training
    }

    pub fn reaper(&self) -> TokenReaper {
        self.reaper.clone()
    }
}
