//! Domain entities - the core business objects.

mod access;
mod identity;
mod pagination;
mod post;
mod user;

pub use access::{Access, can_modify, can_view};
pub use identity::Identity;
pub use pagination::{
    DEFAULT_LISTING_LIMIT, DEFAULT_PAGE, MAX_LIMIT, Page, PageInfo, PageRequest,
};
pub use post::{
    AuthorSummary, Post, PostChanges, PostDraft, PostStatus, PostWithAuthor, excerpt_of,
    read_time_of,
};
pub use user::{Registration, User};

pub(crate) use user::normalize_email;
