//! SeaORM entities and their mapping to domain types.

pub mod post;
pub mod user;
