//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use quill_core::domain::{PageRequest, PostWithAuthor, User};
use quill_core::error::RepoError;
use quill_core::ports::{PostFilter, PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::mask_email;
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

/// Translate a listing filter into a SQL condition.
fn condition(filter: &PostFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(status) = filter.status {
        cond = cond.add(post::Column::Status.eq(post::Status::from(status)));
    }
    if let Some(author_id) = filter.author_id {
        cond = cond.add(post::Column::AuthorId.eq(author_id));
    }
    if let Some(term) = &filter.search {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        let lower = |col: post::Column| Expr::expr(Func::lower(Expr::col((post::Entity, col))));
        cond = cond.add(
            Condition::any()
                .add(lower(post::Column::Title).like(pattern.clone()))
                .add(lower(post::Column::Body).like(pattern)),
        );
    }
    cond
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn join(rows: Vec<(post::Model, Option<user::Model>)>) -> Vec<PostWithAuthor> {
    rows.into_iter()
        .map(|(post, author)| PostWithAuthor {
            post: post.into(),
            author: author.map(Into::into),
        })
        .collect()
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(row.and_then(|r| join(vec![r]).pop()))
    }

    async fn find_page(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let rows = PostEntity::find()
            .filter(condition(filter))
            .order_by_desc(post::Column::PublishedDate)
            .order_by_desc(post::Column::Id)
            .find_also_related(UserEntity)
            .offset(page.skip())
            .limit(page.limit())
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(rows = rows.len(), page = page.page(), "Fetched post page");
        Ok(join(rows))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(condition(filter))
            .count(&*self.db)
            .await
            .map_err(map_db_err)
    }
}
