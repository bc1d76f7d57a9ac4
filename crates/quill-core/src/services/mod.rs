//! Application services - the operations exposed to the HTTP boundary.
//!
//! Services own no state beyond their ports; every call is a short sequence
//! of store round trips with no retries.

mod auth;
mod posts;

pub use auth::{AuthService, IssuedSession};
pub use posts::PostService;

use uuid::Uuid;

use crate::error::DomainError;

/// Malformed ids resolve to nothing, so they surface as `NotFound`.
pub(crate) fn parse_id(entity_type: &'static str, raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw.trim()).map_err(|_| DomainError::not_found(entity_type, raw))
}
