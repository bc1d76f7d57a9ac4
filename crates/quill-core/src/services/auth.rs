//! Credential checks and session issuance.

use std::sync::Arc;

use crate::domain::{Identity, Registration, User};
use crate::error::DomainError;
use crate::ports::{AuthError, PasswordService, TokenService, UserRepository};

/// A freshly minted session for `user`.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: User,
    pub token: String,
    pub expires_in: i64,
}

/// Registration, login and token verification.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
        }
    }

    /// Create an account and sign it in.
    pub async fn register(&self, registration: Registration) -> Result<IssuedSession, DomainError> {
        let reg = registration.validate()?;

        if self.users.find_by_email(&reg.email).await?.is_some() {
            return Err(DomainError::Duplicate("Email already registered".to_string()));
        }
        if self.users.find_by_username(&reg.username).await?.is_some() {
            return Err(DomainError::Duplicate("Username already taken".to_string()));
        }

        let password_hash = self.passwords.hash(&reg.password)?;
        let user = self
            .users
            .create(User::new(reg.username, reg.email, password_hash))
            .await?;

        self.issue(user)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, DomainError> {
        let email = crate::domain::normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        if !self.passwords.verify(password, &user.password_hash)? {
            return Err(DomainError::InvalidCredentials);
        }

        self.issue(user)
    }

    /// Decode a token without touching the store.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.tokens.validate_token(token).map(Identity::from)
    }

    /// Required-mode gate: the token must be present, valid, and name a
    /// user that still exists.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Identity, DomainError> {
        let token = token.ok_or(DomainError::Unauthenticated(AuthError::MissingAuth))?;
        let claimed = self.verify(token).map_err(DomainError::Unauthenticated)?;

        match self.users.find_by_id(claimed.user_id).await? {
            Some(user) => Ok(Identity::from(&user)),
            None => Err(DomainError::Unauthenticated(AuthError::UnknownSubject)),
        }
    }

    /// Optional-mode gate: any failure means "anonymous".
    pub async fn authenticate_optional(&self, token: Option<&str>) -> Option<Identity> {
        self.authenticate(token).await.ok()
    }

    /// Profile of the acting user.
    pub async fn current_user(&self, identity: &Identity) -> Result<User, DomainError> {
        self.users
            .find_by_id(identity.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", identity.user_id.to_string()))
    }

    fn issue(&self, user: User) -> Result<IssuedSession, DomainError> {
        let token = self
            .tokens
            .generate_token(user.id, &user.username, &user.email)?;

        Ok(IssuedSession {
            user,
            token,
            expires_in: self.tokens.expiration_seconds(),
        })
    }
}
