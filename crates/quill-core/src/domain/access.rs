//! Visibility and ownership guards.

use uuid::Uuid;

use super::identity::Identity;
use super::post::{Post, PostStatus};
use crate::error::DomainError;

/// Outcome of a guard: the resource, or the reason it is withheld.
#[derive(Debug, Clone)]
pub enum Access<T> {
    Granted(T),
    Forbidden,
    NotFound,
}

impl<T> Access<T> {
    pub fn into_result(self, id: Uuid, denial: &str) -> Result<T, DomainError> {
        match self {
            Access::Granted(value) => Ok(value),
            Access::Forbidden => Err(DomainError::Forbidden(denial.to_string())),
            Access::NotFound => Err(DomainError::not_found("Post", id.to_string())),
        }
    }
}

/// Published posts are public; drafts only reach their author.
pub fn can_view<P: AsRef<Post>>(found: Option<P>, viewer: Option<&Identity>) -> Access<P> {
    match found {
        None => Access::NotFound,
        Some(p) => {
            let post = p.as_ref();
            let allowed = post.status == PostStatus::Published
                || viewer.is_some_and(|v| post.is_authored_by(v.user_id));
            if allowed {
                Access::Granted(p)
            } else {
                Access::Forbidden
            }
        }
    }
}

/// Only the author may change or remove a post.
pub fn can_modify<P: AsRef<Post>>(found: Option<P>, actor: &Identity) -> Access<P> {
    match found {
        None => Access::NotFound,
        Some(p) if p.as_ref().is_authored_by(actor.user_id) => Access::Granted(p),
        Some(_) => Access::Forbidden,
    }
}

impl AsRef<Post> for Post {
    fn as_ref(&self) -> &Post {
        self
    }
}

impl AsRef<Post> for super::post::PostWithAuthor {
    fn as_ref(&self) -> &Post {
        &self.post
    }
}
