use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};

use super::{DaoBase, DaoResult};
use crate::db::entities::{prelude::User, user};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl UserDao {
    /// Expects an already normalised (trimmed, lowercase) address.
    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        let email = email.to_string();
        self.find_one(move |query| query.filter(user::Column::Email.eq(email)))
            .await
    }

    pub async fn find_by_username(&self, username: &str) -> DaoResult<Option<user::Model>> {
        let username = username.to_string();
        self.find_one(move |query| query.filter(user::Column::Username.eq(username)))
            .await
    }

    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            email: Set(email.to_string()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            is_email_verified: Set(false),
            ..Default::default()
        };
        self.create(model).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use uuid::Uuid;

    use crate::db::entities::user;

    use super::UserDao;
    use crate::db::dao::{DaoBase, DaoLayerError};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn user_model(id: Uuid, email: &str, username: &str) -> user::Model {
        let now = ts();
        user::Model {
            id,
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            is_email_verified: false,
        }
    }

    #[tokio::test]
    async fn find_by_email_returns_first_match() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(id, "alice@example.com", "alice")]])
            .into_connection();
        let dao = UserDao::new(&db);

        let result = dao
            .find_by_email("alice@example.com")
            .await
            .expect("query should succeed");
        assert_eq!(result.map(|u| u.id), Some(id));
    }

    #[tokio::test]
    async fn find_by_username_returns_none_when_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let dao = UserDao::new(&db);

        let result = dao
            .find_by_username("nobody")
            .await
            .expect("query should succeed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn create_user_returns_inserted_row() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(id, "bob@example.com", "bob")]])
            .into_connection();
        let dao = UserDao::new(&db);

        let created = dao
            .create_user("bob@example.com", "bob", "hash")
            .await
            .expect("insert should succeed");
        assert_eq!(created.username, "bob");
        assert!(!created.is_email_verified);
    }

    #[tokio::test]
    async fn find_by_id_reports_missing_user() {
        let missing = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let dao = UserDao::new(&db);

        let err = dao.find_by_id(missing).await.expect_err("lookup should fail");
        assert!(matches!(err, DaoLayerError::NotFound { id, .. } if id == missing));
    }

    #[tokio::test]
    async fn query_errors_are_wrapped() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("select failed".to_string())])
            .into_connection();
        let dao = UserDao::new(&db);

        let err = dao
            .find_by_email("alice@example.com")
            .await
            .expect_err("query should fail");
        assert!(matches!(err, DaoLayerError::Db(_)));
        assert!(!err.is_unique_violation());
    }
}
