//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::{Registration, User};
use quill_core::services::IssuedSession;
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

use crate::middleware::{AppResult, Authenticated};
use crate::state::AppState;

pub(crate) fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
    }
}

fn auth_response(session: IssuedSession) -> AuthResponse {
    AuthResponse {
        user: user_response(&session.user),
        token: session.token,
        expires_in: session.expires_in,
    }
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state
        .auth
        .register(Registration::new(req.username, req.email, req.password))
        .await?;

    tracing::info!(user_id = %session.user.id, "User registered");

    Ok(HttpResponse::Created().json(auth_response(session)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state.auth.login(&req.email, &req.password).await?;

    tracing::debug!(user_id = %session.user.id, "User logged in");

    Ok(HttpResponse::Ok().json(auth_response(session)))
}

/// GET /api/auth/me
pub async fn me(
    state: web::Data<AppState>,
    Authenticated(identity): Authenticated,
) -> AppResult<HttpResponse> {
    let user = state.auth.current_user(&identity).await?;
    Ok(HttpResponse::Ok().json(user_response(&user)))
}
