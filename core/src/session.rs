/// Explicit session state — replaces ambient "current user" globals.
///
/// A `Session` is constructed once by the embedding application (after the
/// external auth provider confirms who is signed in) and passed to every
/// component that needs the current identity.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The signed-in member, as reported by the auth provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: String,
    pub email: Option<String>,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
        }
    }
}

/// One signed-in session, stamped with its issue time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: UserIdentity,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: UserIdentity) -> Self {
        Self {
            user,
            issued_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.user_id
    }
}

/// Moderator session with a bounded lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSession {
    pub username: String,
    pub issued_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn new(username: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            issued_at,
        }
    }

    /// Validity is a pure function of issue time, current time and max age.
    pub fn is_valid(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let age = now.signed_duration_since(self.issued_at);
        age >= chrono::Duration::zero()
            && age.to_std().map(|a| a < max_age).unwrap_or(false)
    }
}

/// External auth provider surface consumed by the core
pub trait AuthProvider: Send + Sync {
    /// The current session, or None when signed out
    fn current_session(&self) -> Option<Session>;

    fn sign_out(&self);
}

/// Fixed-identity provider for tests and embedding without a backend
pub struct StaticAuth {
    session: std::sync::Mutex<Option<Session>>,
}

impl StaticAuth {
    pub fn signed_in(user: UserIdentity) -> Self {
        Self {
            session: std::sync::Mutex::new(Some(Session::new(user))),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            session: std::sync::Mutex::new(None),
        }
    }
}

impl AuthProvider for StaticAuth {
    fn current_session(&self) -> Option<Session> {
        self.session.lock().ok().and_then(|s| s.clone())
    }

    fn sign_out(&self) {
        if let Ok(mut s) = self.session.lock() {
            *s = None;
        }
    }
}
