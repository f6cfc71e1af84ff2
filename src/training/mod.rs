pub mod sm2;

pub use sm2::{Quality, ReviewState, review};
