use sea_orm::DatabaseConnection;

use super::{DaoBase, GameDao, OpeningProgressDao, RefreshTokenDao, UserDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn refresh_token(&self) -> RefreshTokenDao {
        DaoBase::new(&self.db)
    }

    pub fn game(&self) -> GameDao {
        DaoBase::new(&self.db)
    }

    pub fn opening_progress(&self) -> OpeningProgressDao {
        DaoBase::new(&self.db)
    }
}
