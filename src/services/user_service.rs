use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::dao::{DaoBase, DaoLayerError, UserDao},
    db::entities::user,
    error::AppError,
};

/// Public view of a user. The password hash has no field here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub is_email_verified: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<&user::Model> for UserProfile {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            is_email_verified: user.is_email_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    user_dao: UserDao,
}

impl UserService {
    pub fn new(user_dao: UserDao) -> Self {
        Self { user_dao }
    }

    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<user::Model>, AppError> {
        match self.user_dao.find_by_id(*id).await {
            Ok(model) => Ok(Some(model)),
            Err(DaoLayerError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_by_email(email).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_by_username(username).await?)
    }

    /// A unique-constraint hit (a concurrent registration won) is a conflict.
    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<user::Model, AppError> {
        match self.user_dao.create_user(email, username, password_hash).await {
            Ok(user) => Ok(user),
            Err(err) if err.is_unique_violation() => {
                Err(AppError::conflict("Email or username already registered"))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn profile(&self, id: &Uuid) -> Result<UserProfile, AppError> {
        self.find_by_id(id)
            .await?
            .map(|user| UserProfile::from(&user))
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
