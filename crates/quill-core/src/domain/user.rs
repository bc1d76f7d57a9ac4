use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, FieldError};

const USERNAME_MIN_CHARS: usize = 3;
const USERNAME_MAX_CHARS: usize = 30;
const PASSWORD_MIN_CHARS: usize = 6;

/// User entity - represents a registered author or reader.
///
/// Identity fields are fixed at registration; there is no update path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Sign-up input, normalized and checked by [`Registration::validate`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Trim the username, lower-case the email and check every field,
    /// reporting all offending fields at once.
    pub fn validate(self) -> Result<Self, DomainError> {
        let username = self.username.trim().to_string();
        let email = normalize_email(&self.email);
        let mut errors = Vec::new();

        let username_len = username.chars().count();
        if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&username_len) {
            errors.push(FieldError::new(
                "username",
                format!(
                    "Username must be between {USERNAME_MIN_CHARS} and {USERNAME_MAX_CHARS} characters"
                ),
            ));
        } else if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            errors.push(FieldError::new(
                "username",
                "Username may only contain letters, numbers and underscores",
            ));
        }

        if !is_valid_email(&email) {
            errors.push(FieldError::new("email", "Please provide a valid email"));
        }

        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            errors.push(FieldError::new(
                "password",
                format!("Password must be at least {PASSWORD_MIN_CHARS} characters"),
            ));
        }

        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        Ok(Self {
            username,
            email,
            password: self.password,
        })
    }
}

/// Emails are stored and looked up trimmed and lower-cased.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
