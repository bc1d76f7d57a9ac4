//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PasswordService, PostRepository, TokenService, UserRepository};
use quill_core::services::{AuthService, PostService};
use quill_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
use quill_infra::{DatabaseConnections, PostgresPostRepository, PostgresUserRepository};

use crate::config::AppConfig;

type Repositories = (Arc<dyn UserRepository>, Arc<dyn PostRepository>);

/// Shared application state. Cheap to clone; holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub posts: PostService,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repositories = Self::repositories(config).await;
        let state = Self::assemble(repositories, &config.jwt);
        tracing::info!("Application state initialized");
        state
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(jwt: &JwtConfig) -> Self {
        Self::assemble(memory_repositories(), jwt)
    }

    fn assemble((users, posts): Repositories, jwt: &JwtConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        Self {
            auth: AuthService::new(users, tokens, passwords),
            posts: PostService::new(posts),
        }
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> Repositories {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return memory_repositories();
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => (
                Arc::new(PostgresUserRepository::new(Arc::clone(&connections.main))),
                Arc::new(PostgresPostRepository::new(connections.main)),
            ),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                memory_repositories()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> Repositories {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        memory_repositories()
    }
}

fn memory_repositories() -> Repositories {
    let (users, posts) = InMemoryStore::new().repositories();
    (Arc::new(users), Arc::new(posts))
}
