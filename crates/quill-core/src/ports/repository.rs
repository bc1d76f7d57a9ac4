use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{PageRequest, Post, PostStatus, PostWithAuthor, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Selection criteria for post listings.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub author_id: Option<Uuid>,
    /// Case-insensitive substring over title or body.
    pub search: Option<String>,
}

impl PostFilter {
    pub fn published() -> Self {
        Self {
            status: Some(PostStatus::Published),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Blank search terms are ignored.
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    /// In-process evaluation, for stores without a query language.
    pub fn matches(&self, post: &Post) -> bool {
        if self.status.is_some_and(|s| s != post.status) {
            return false;
        }
        if self.author_id.is_some_and(|a| a != post.author_id) {
            return false;
        }
        match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                post.title.to_lowercase().contains(&term)
                    || post.body.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

/// Post repository. Listing methods return posts joined with their author,
/// newest `published_date` first.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Fetch one post together with its author.
    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError>;

    /// Fetch the page window of posts matching `filter`.
    async fn find_page(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Vec<PostWithAuthor>, RepoError>;

    /// Count all posts matching `filter`.
    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError>;
}
