use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::refresh_token::{self, Entity as RefreshToken};

#[derive(Clone)]
pub struct RefreshTokenDao {
    db: DatabaseConnection,
}

impl DaoBase for RefreshTokenDao {
    type Entity = RefreshToken;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RefreshTokenDao {
    /// Persists a fresh opaque token (a v4 uuid) for `user_id`.
    pub async fn create_refresh_token(
        &self,
        user_id: &Uuid,
        expires_at: DateTimeWithTimeZone,
    ) -> DaoResult<refresh_token::Model> {
        let model = refresh_token::ActiveModel {
            token: Set(Uuid::new_v4().to_string()),
            user_id: Set(*user_id),
            expires_at: Set(expires_at),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn find_by_token(&self, token: &str) -> DaoResult<Option<refresh_token::Model>> {
        let token = token.to_string();
        self.find_one(move |query| query.filter(refresh_token::Column::Token.eq(token)))
            .await
    }

    pub async fn delete_by_token(&self, token: &str) -> DaoResult<u64> {
        let result = RefreshToken::delete_many()
            .filter(refresh_token::Column::Token.eq(token))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }

    /// Deletes the token only while it is still live. At most one caller
    /// sees `1` for a given token, which makes this the claim step of
    /// rotation.
    pub async fn delete_live_token(
        &self,
        token: &str,
        now: DateTimeWithTimeZone,
    ) -> DaoResult<u64> {
        let result = RefreshToken::delete_many()
            .filter(refresh_token::Column::Token.eq(token))
            .filter(refresh_token::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }

    pub async fn delete_all_for_user(&self, user_id: &Uuid) -> DaoResult<u64> {
        let result = RefreshToken::delete_many()
            .filter(refresh_token::Column::UserId.eq(*user_id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }

    pub async fn delete_expired(&self, now: DateTimeWithTimeZone) -> DaoResult<u64> {
        let result = RefreshToken::delete_many()
            .filter(refresh_token::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }
}
