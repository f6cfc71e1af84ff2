pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod game_dao;
pub mod opening_progress_dao;
pub mod refresh_token_dao;
pub mod user_dao;

pub use base::{DaoBase, PaginatedResponse};
pub use base_traits::{HasCreatedAtColumn, HasIdActiveModel, TimestampedActiveModel};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
#[cfg(test)]
pub(crate) use error::test_support;
pub use game_dao::GameDao;
pub use opening_progress_dao::{OpeningProgressDao, ScheduleUpdate};
pub use refresh_token_dao::RefreshTokenDao;
pub use user_dao::UserDao;
