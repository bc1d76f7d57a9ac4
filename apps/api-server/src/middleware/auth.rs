//! Authorization gate as request extractors.
//!
//! [`Authenticated`] rejects the request unless a valid bearer token names
//! an existing user. [`MaybeAuthenticated`] never rejects; any failure just
//! leaves the request anonymous.

use std::future::Future;
use std::pin::Pin;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use quill_core::domain::Identity;
use quill_core::ports::AuthError;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Acting identity of a request that must be signed in.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

/// Acting identity when one could be established.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<Identity>);

/// `Ok(None)` when no `Authorization` header is present at all.
fn bearer_token(req: &HttpRequest) -> Result<Option<String>, AuthError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AuthError::TokenMalformed("Invalid authorization header".to_string()))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        _ => Err(AuthError::TokenMalformed("Expected Bearer token".to_string())),
    }
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>().cloned().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AppError::Internal("Server configuration error".to_string())
    })
}

impl FromRequest for Authenticated {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let token = bearer_token(req);

        Box::pin(async move {
            let state = state?;
            let token = token.map_err(AppError::Unauthenticated)?;
            let identity = state.auth.authenticate(token.as_deref()).await?;
            Ok(Authenticated(identity))
        })
    }
}

impl FromRequest for MaybeAuthenticated {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = app_state(req);
        // A garbled header is treated like no header.
        let token = bearer_token(req).ok().flatten();

        Box::pin(async move {
            let state = state?;
            Ok(MaybeAuthenticated(
                state.auth.authenticate_optional(token.as_deref()).await,
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn test_missing_header_is_not_an_error() {
        let req = TestRequest::default().to_http_request();

        assert!(matches!(bearer_token(&req), Ok(None)));
    }

    #[test]
    fn test_bearer_prefix_is_required() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic abc"))
            .to_http_request();

        assert!(matches!(
            bearer_token(&req),
            Err(AuthError::TokenMalformed(_))
        ));
    }

    #[test]
    fn test_bearer_token_is_extracted() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();

        assert_eq!(bearer_token(&req).unwrap().as_deref(), Some("abc.def.ghi"));
    }
}
