//! Middleware modules.

pub mod auth;
pub mod error;

pub use auth::{Authenticated, MaybeAuthenticated};
pub use error::AppResult;
