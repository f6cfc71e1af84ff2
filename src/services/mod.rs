pub mod auth_service;
pub mod context;
pub mod game_service;
pub mod token_reaper;
pub mod training_service;
pub mod user_service;

pub use context::ServiceContext;
