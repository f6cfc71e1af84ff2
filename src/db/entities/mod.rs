#[allow(unused_imports)]
pub mod prelude {
    pub use super::game::Entity as Game;
    pub use super::opening_progress::Entity as OpeningProgress;
    pub use super::refresh_token::Entity as RefreshToken;
    pub use super::user::Entity as User;
}

pub mod game;
pub mod opening_progress;
pub mod refresh_token;
pub mod user;
