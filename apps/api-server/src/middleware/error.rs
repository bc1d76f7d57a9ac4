//! Error boundary - turns domain failures into `{error, message}` bodies.

use std::fmt;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use quill_core::ports::AuthError;
use quill_core::{DomainError, FieldError};
use quill_shared::{ErrorResponse, FieldDetail};

/// Application-level error type rendered at the HTTP boundary.
#[derive(Debug)]
pub enum AppError {
    Validation(Vec<FieldDetail>),
    Unauthenticated(AuthError),
    InvalidCredentials,
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(details) => write!(f, "Validation failed ({} fields)", details.len()),
            AppError::Unauthenticated(reason) => write!(f, "Unauthenticated: {reason}"),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::NotFound(msg) => write!(f, "Not found: {msg}"),
            AppError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl AppError {
    /// Shorthand for a request that could not be read at all.
    pub fn malformed(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldDetail {
            field: field.to_string(),
            message: message.into(),
        }])
    }
}

fn unauthenticated_message(reason: &AuthError) -> &'static str {
    match reason {
        AuthError::MissingAuth => "Access denied. No token provided.",
        AuthError::TokenExpired => "Token expired. Please log in again.",
        AuthError::UnknownSubject => "Invalid token. User no longer exists.",
        _ => "Invalid token.",
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(details) => ErrorResponse::validation(details.clone()),
            AppError::Unauthenticated(reason) => {
                tracing::debug!(reason = %reason, "Rejected unauthenticated request");
                ErrorResponse::unauthenticated(unauthenticated_message(reason))
            }
            AppError::InvalidCredentials => {
                ErrorResponse::new("Invalid credentials", "Invalid email or password")
            }
            AppError::Forbidden(msg) => ErrorResponse::forbidden(msg.clone()),
            AppError::NotFound(msg) => ErrorResponse::not_found(msg.clone()),
            AppError::Conflict(msg) => ErrorResponse::new("Conflict", msg.clone()),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

fn detail(err: FieldError) -> FieldDetail {
    FieldDetail {
        field: err.field,
        message: err.message,
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{entity_type} not found"))
            }
            DomainError::Validation(fields) => {
                AppError::Validation(fields.into_iter().map(detail).collect())
            }
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::InvalidCredentials => AppError::InvalidCredentials,
            DomainError::Unauthenticated(reason) => AppError::Unauthenticated(reason),
            DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Unreadable JSON bodies become validation failures instead of actix's plain-text 400.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::malformed("body", err.to_string()).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::malformed("query", err.to_string()).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::malformed("path", err.to_string()).into()
}
