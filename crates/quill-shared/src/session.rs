//! Client-side session state.
//!
//! A [`ClientSession`] is created once by the UI shell and handed to whatever
//! needs the current user. It only changes through [`ClientSession::sign_in`]
//! and [`ClientSession::sign_out`].

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::dto::{AuthResponse, UserResponse};

/// A signed-in user and the token that proves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Start a session from a register/login response received at `now`.
    pub fn from_response(response: AuthResponse, now: DateTime<Utc>) -> Self {
        Self {
            token: response.token,
            user: response.user,
            expires_at: now + TimeDelta::seconds(response.expires_in),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientSession {
    current: Option<Session>,
}

impl ClientSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Resume a persisted session; expired ones are discarded.
    pub fn restore(saved: Option<Session>, now: DateTime<Utc>) -> Self {
        Self {
            current: saved.filter(|s| !s.is_expired_at(now)),
        }
    }

    pub fn sign_in(&mut self, response: AuthResponse, now: DateTime<Utc>) -> &UserResponse {
        &self.current.insert(Session::from_response(response, now)).user
    }

    pub fn sign_out(&mut self) {
        self.current = None;
    }

    /// The signed-in user, unless the token has lapsed.
    pub fn current_user(&self, now: DateTime<Utc>) -> Option<&UserResponse> {
        self.active(now).map(|s| &s.user)
    }

    pub fn authorization_header(&self, now: DateTime<Utc>) -> Option<String> {
        self.active(now).map(Session::bearer)
    }

    /// Session to persist between page loads.
    pub fn snapshot(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    fn active(&self, now: DateTime<Utc>) -> Option<&Session> {
        self.current.as_ref().filter(|s| !s.is_expired_at(now))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn response() -> AuthResponse {
        AuthResponse {
            token: "abc.def.ghi".into(),
            user: UserResponse {
                id: Uuid::new_v4(),
                username: "alice".into(),
                email: "alice@x.com".into(),
            },
            expires_in: 3600,
        }
    }

    #[test]
    fn test_sign_in_and_out() {
        let now = Utc::now();
        let mut session = ClientSession::anonymous();
        assert!(session.current_user(now).is_none());

        let user = session.sign_in(response(), now).clone();
        assert_eq!(session.current_user(now), Some(&user));
        assert_eq!(
            session.authorization_header(now).as_deref(),
            Some("Bearer abc.def.ghi")
        );

        session.sign_out();
        assert!(session.current_user(now).is_none());
        assert!(session.authorization_header(now).is_none());
    }

    #[test]
    fn test_expired_session_has_no_user() {
        let now = Utc::now();
        let mut session = ClientSession::anonymous();
        session.sign_in(response(), now);

        let later = now + TimeDelta::seconds(3600);
        assert!(session.current_user(later).is_none());
    }

    #[test]
    fn test_restore_discards_expired() {
        let now = Utc::now();
        let saved = Session::from_response(response(), now - TimeDelta::hours(2));

        assert!(ClientSession::restore(Some(saved.clone()), now)
            .snapshot()
            .is_none());
        assert!(ClientSession::restore(Some(saved), now - TimeDelta::minutes(90))
            .snapshot()
            .is_some());
    }
}
