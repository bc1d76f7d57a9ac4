//! In-memory repositories - used when no database is configured.
//!
//! Both repositories share one [`InMemoryStore`] so posts can be joined with
//! their authors. Data is lost on process restart.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{AuthorSummary, PageRequest, Post, PostWithAuthor, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostFilter, PostRepository, UserRepository};

use super::mask_email;

/// Shared tables. Lock order is posts before users.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Repositories backed by this store.
    pub fn repositories(self: &Arc<Self>) -> (InMemoryUserRepository, InMemoryPostRepository) {
        (
            InMemoryUserRepository {
                store: Arc::clone(self),
            },
            InMemoryPostRepository {
                store: Arc::clone(self),
            },
        )
    }
}

pub struct InMemoryUserRepository {
    store: Arc<InMemoryStore>,
}

pub struct InMemoryPostRepository {
    store: Arc<InMemoryStore>,
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.users.read().await.get(&id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.store.users.write().await;

        // Mirror the unique indexes of the SQL schema.
        if users.contains_key(&user.id) {
            return Err(RepoError::Constraint("users_pkey".to_string()));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("users_email_key".to_string()));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint("users_username_key".to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.store.users.write().await;
        match users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(user)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        // Cascade like the foreign key does.
        let mut posts = self.store.posts.write().await;
        let mut users = self.store.users.write().await;
        users.remove(&id).ok_or(RepoError::NotFound)?;
        posts.retain(|_, p| p.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let users = self.store.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let users = self.store.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.posts.read().await.get(&id).cloned())
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.store.posts.write().await;
        let users = self.store.users.read().await;

        if !users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("posts_author_id_fkey".to_string()));
        }
        if posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("posts_pkey".to_string()));
        }

        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.store.posts.write().await;
        match posts.get_mut(&post.id) {
            Some(slot) => {
                *slot = post.clone();
                Ok(post)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.store.posts.write().await;
        posts.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        let posts = self.store.posts.read().await;
        let users = self.store.users.read().await;

        Ok(posts.get(&id).map(|post| PostWithAuthor {
            post: post.clone(),
            author: users.get(&post.author_id).map(AuthorSummary::from),
        }))
    }

    async fn find_page(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let posts = self.store.posts.read().await;
        let users = self.store.users.read().await;

        let mut matching: Vec<&Post> = posts.values().filter(|p| filter.matches(p)).collect();
        matching.sort_by_key(|p| Reverse((p.published_date, p.id)));

        Ok(matching
            .into_iter()
            .skip(page.skip() as usize)
            .take(page.limit() as usize)
            .map(|post| PostWithAuthor {
                post: post.clone(),
                author: users.get(&post.author_id).map(AuthorSummary::from),
            })
            .collect())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let posts = self.store.posts.read().await;
        Ok(posts.values().filter(|p| filter.matches(p)).count() as u64)
    }
}
