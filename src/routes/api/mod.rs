pub mod auth;
pub mod games;
pub mod public;
mod router;
pub mod training;

pub use router::router;
