//! Post handlers: listings, single reads and author-only mutations.

use actix_web::{HttpResponse, web};

use quill_core::domain::{
    DEFAULT_LISTING_LIMIT, Page, PageRequest, PostChanges, PostDraft, PostStatus, PostWithAuthor,
};
use quill_shared::dto::{
    AuthorResponse, CreatePostRequest, ListPostsQuery, MessageResponse, Paginated,
    PaginationMeta, PostMutationResponse, PostResponse, UpdatePostRequest,
};

use crate::middleware::{AppResult, Authenticated, MaybeAuthenticated};
use crate::state::AppState;

fn post_response(item: PostWithAuthor) -> PostResponse {
    let PostWithAuthor { post, author } = item;
    PostResponse {
        id: post.id,
        title: post.title,
        body: post.body,
        excerpt: post.excerpt,
        author: author.map(|a| AuthorResponse {
            id: a.id,
            username: a.username,
            email: a.email,
        }),
        published_date: post.published_date,
        status: post.status.to_string(),
        tags: post.tags.into_iter().collect(),
        read_time: post.read_time,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn paginated(page: Page<PostWithAuthor>) -> Paginated<PostResponse> {
    let info = page.info;
    Paginated {
        data: page.items.into_iter().map(post_response).collect(),
        pagination: PaginationMeta {
            page: info.page,
            limit: info.limit,
            total: info.total,
            total_pages: info.total_pages,
            has_next: info.has_next,
            has_prev: info.has_prev,
        },
    }
}

fn page_request(query: &ListPostsQuery) -> AppResult<PageRequest> {
    Ok(PageRequest::new(
        query.page,
        query.limit,
        DEFAULT_LISTING_LIMIT,
    )?)
}

fn parse_status(raw: Option<String>) -> AppResult<Option<PostStatus>> {
    Ok(raw.map(|s| s.parse::<PostStatus>()).transpose()?)
}

/// GET /api/posts?page&limit&search
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
    MaybeAuthenticated(_viewer): MaybeAuthenticated,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let request = page_request(&query)?;
    let page = state.posts.list(query.search, request).await?;

    Ok(HttpResponse::Ok().json(paginated(page)))
}

/// GET /api/posts/author/{author_id}?page&limit
pub async fn list_author_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let request = page_request(&query)?;
    let page = state.posts.list_by_author(&path, request).await?;

    Ok(HttpResponse::Ok().json(paginated(page)))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    MaybeAuthenticated(viewer): MaybeAuthenticated,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(&path, viewer.as_ref()).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    Authenticated(identity): Authenticated,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = PostDraft {
        title: req.title,
        body: req.body,
        status: parse_status(req.status)?,
        tags: req.tags,
    };

    let created = state.posts.create(&identity, draft).await?;
    tracing::info!(post_id = %created.post.id, author_id = %identity.user_id, "Post created");

    Ok(HttpResponse::Created().json(PostMutationResponse {
        message: "Post created successfully".to_string(),
        post: post_response(created),
    }))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    Authenticated(identity): Authenticated,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = PostChanges {
        title: req.title,
        body: req.body,
        status: parse_status(req.status)?,
        tags: req.tags,
    };

    let updated = state.posts.update(&path, &identity, changes).await?;

    Ok(HttpResponse::Ok().json(PostMutationResponse {
        message: "Post updated successfully".to_string(),
        post: post_response(updated),
    }))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    Authenticated(identity): Authenticated,
) -> AppResult<HttpResponse> {
    state.posts.delete(&path, &identity).await?;
    tracing::info!(post_id = %path.as_str(), "Post deleted");

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Post deleted successfully".to_string(),
    }))
}
