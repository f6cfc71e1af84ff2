pub mod duration;
pub mod jwt;
pub mod password;
pub mod tokens;
mod types;

pub use tokens::TokenService;
pub use types::{AccessPayload, Claims, RevokeOutcome, TokenBundle};
