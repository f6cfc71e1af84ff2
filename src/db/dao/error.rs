use sea_orm::{DbErr, RuntimeErr, SqlErr, sqlx};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DaoLayerError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Invalid pagination: page={page} page_size={page_size}")]
    InvalidPagination { page: u64, page_size: u64 },
}

impl DaoLayerError {
    /// True when the database rejected a write because of a unique index.
    pub fn is_unique_violation(&self) -> bool {
        let DaoLayerError::Db(err) = self else {
            return false;
        };
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            return true;
        }
        match err {
            DbErr::Exec(RuntimeErr::SqlxError(inner))
            | DbErr::Query(RuntimeErr::SqlxError(inner)) => matches!(
                inner.as_ref(),
                sqlx::Error::Database(db_err) if db_err.is_unique_violation()
            ),
            _ => false,
        }
    }
}

pub type DaoResult<T> = Result<T, DaoLayerError>;
