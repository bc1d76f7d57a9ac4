//! Authorization-gated CRUD and paginated listings over posts.

use std::sync::Arc;

use crate::domain::{
    AuthorSummary, Identity, Page, PageRequest, Post, PostChanges, PostDraft, PostWithAuthor,
    can_modify, can_view,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostFilter, PostRepository};

use super::parse_id;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Public listing: published posts only, optionally narrowed by a search term.
    pub async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<PostWithAuthor>, DomainError> {
        let filter = PostFilter::published().with_search(search);
        self.paginate(&filter, page).await
    }

    /// Published posts of one author. Drafts never appear here, not even
    /// for the author.
    pub async fn list_by_author(
        &self,
        author_id: &str,
        page: PageRequest,
    ) -> Result<Page<PostWithAuthor>, DomainError> {
        let author_id = parse_id("Author", author_id)?;
        let filter = PostFilter::published().with_author(author_id);
        self.paginate(&filter, page).await
    }

    pub async fn get(
        &self,
        id: &str,
        viewer: Option<&Identity>,
    ) -> Result<PostWithAuthor, DomainError> {
        let id = parse_id("Post", id)?;
        let found = self.posts.find_with_author(id).await?;

        can_view(found, viewer).into_result(id, "You do not have permission to view this post")
    }

    /// The author always comes from the authenticated identity.
    pub async fn create(
        &self,
        author: &Identity,
        draft: PostDraft,
    ) -> Result<PostWithAuthor, DomainError> {
        let post = Post::compose(author.user_id, draft)?;
        let post = self.posts.create(post).await?;

        Ok(PostWithAuthor {
            post,
            author: Some(AuthorSummary::from(author)),
        })
    }

    pub async fn update(
        &self,
        id: &str,
        actor: &Identity,
        changes: PostChanges,
    ) -> Result<PostWithAuthor, DomainError> {
        let id = parse_id("Post", id)?;
        let found = self.posts.find_by_id(id).await?;
        let mut post = can_modify(found, actor).into_result(id, "You can only edit your own posts")?;

        post.apply(changes)?;
        let post = self.posts.update(post).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id.to_string()),
            other => other.into(),
        })?;

        Ok(PostWithAuthor {
            post,
            author: Some(AuthorSummary::from(actor)),
        })
    }

    /// Permanent removal.
    pub async fn delete(&self, id: &str, actor: &Identity) -> Result<(), DomainError> {
        let id = parse_id("Post", id)?;
        let found = self.posts.find_by_id(id).await?;
        can_modify(found, actor).into_result(id, "You can only delete your own posts")?;

        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id.to_string()),
            other => other.into(),
        })
    }

    async fn paginate(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostWithAuthor>, DomainError> {
        let total = self.posts.count(filter).await?;
        let items = if page.skip() >= total {
            Vec::new()
        } else {
            self.posts.find_page(filter, page).await?
        };

        Ok(Page::new(items, page, total))
    }
}
