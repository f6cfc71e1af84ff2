use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult, PaginatedResponse};
use crate::db::entities::{game, prelude::Game};

#[derive(Clone)]
pub struct GameDao {
    db: DatabaseConnection,
}

impl DaoBase for GameDao {
    type Entity = Game;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl GameDao {
    pub async fn create_game(
        &self,
        user_id: &Uuid,
        player_color: &str,
        fen: &str,
        status: &str,
    ) -> DaoResult<game::Model> {
        let model = game::ActiveModel {
            user_id: Set(*user_id),
            player_color: Set(player_color.to_string()),
            fen: Set(fen.to_string()),
            moves: Set(String::new()),
            status: Set(status.to_string()),
            ..Default::default()
        };
        self.create(model).await
    }

    /// Ownership is part of the lookup: another user's game reads as absent.
    pub async fn find_owned(&self, user_id: &Uuid, game_id: &Uuid) -> DaoResult<Option<game::Model>> {
        let (user_id, game_id) = (*user_id, *game_id);
        self.find_one(move |query| {
            query
                .filter(game::Column::Id.eq(game_id))
                .filter(game::Column::UserId.eq(user_id))
        })
        .await
    }

    pub async fn list_for_user(
        &self,
        user_id: &Uuid,
        page: u64,
        page_size: u64,
    ) -> DaoResult<PaginatedResponse<game::Model>> {
        let user_id = *user_id;
        self.find(page, page_size, None, move |query| {
            query.filter(game::Column::UserId.eq(user_id))
        })
        .await
    }

    /// Writes `moves` only if the row still holds `previous_moves` and is in
    /// `status`. Returns the rows affected; `0` means another write got there
    /// first or the game left `status`.
    pub async fn record_move(
        &self,
        game_id: &Uuid,
        previous_moves: &str,
        status: &str,
        moves: String,
        fen: Option<String>,
        now: DateTimeWithTimeZone,
    ) -> DaoResult<u64> {
        let mut update = Game::update_many()
            .col_expr(game::Column::Moves, Expr::value(moves))
            .col_expr(game::Column::UpdatedAt, Expr::value(now));
        if let Some(fen) = fen {
            update = update.col_expr(game::Column::Fen, Expr::value(fen));
        }
        let result = update
            .filter(game::Column::Id.eq(*game_id))
            .filter(game::Column::Moves.eq(previous_moves))
            .filter(game::Column::Status.eq(status))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }

    pub async fn set_status(&self, game_id: &Uuid, status: &str) -> DaoResult<game::Model> {
        let status = status.to_string();
        self.update(*game_id, move |active| {
            active.status = Set(status);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::db::entities::game;

    use super::GameDao;
    use crate::db::dao::{DaoBase, DaoLayerError};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn game_model(id: Uuid, user_id: Uuid, moves: &str) -> game::Model {
        game::Model {
            id,
            created_at: ts(),
            updated_at: ts(),
            user_id,
            player_color: "white".to_string(),
            fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string(),
            moves: moves.to_string(),
            status: "active".to_string(),
        }
    }

    #[tokio::test]
    async fn find_owned_returns_none_for_foreign_game() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<game::Model>::new()])
            .into_connection();
        let dao = GameDao::new(&db);

        let result = dao
            .find_owned(&Uuid::new_v4(), &Uuid::new_v4())
            .await
            .expect("query should succeed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn list_for_user_detects_next_page() {
        let user_id = Uuid::new_v4();
        let rows: Vec<game::Model> = (0..3)
            .map(|_| game_model(Uuid::new_v4(), user_id, ""))
            .collect();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .into_connection();
        let dao = GameDao::new(&db);

        let page = dao
            .list_for_user(&user_id, 1, 2)
            .await
            .expect("query should succeed");
        assert_eq!(page.data.len(), 2);
        assert!(page.has_next);
    }

    #[tokio::test]
    async fn list_for_user_rejects_oversized_pages() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let dao = GameDao::new(&db);

        let err = dao
            .list_for_user(&Uuid::new_v4(), 1, 500)
            .await
            .expect_err("page size should be rejected");
        assert!(matches!(err, DaoLayerError::InvalidPagination { page_size: 500, .. }));
    }

    #[tokio::test]
    async fn record_move_is_guarded_by_previous_moves_and_status() {
        let game_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let dao = GameDao::new(&db);

        let rows = dao
            .record_move(&game_id, "e2e4", "active", "e2e4 e7e5".to_string(), None, ts())
            .await
            .expect("update should run");
        assert_eq!(rows, 0);

        let log = db.into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("UPDATE \\\"games\\\""), "{sql}");
        assert!(sql.contains("\\\"moves\\\" = $"), "{sql}");
        assert!(sql.contains("\\\"status\\\" = $"), "{sql}");
        assert!(!sql.contains("\\\"fen\\\" ="), "{sql}");
    }
}
