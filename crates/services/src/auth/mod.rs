//! Identity providers: who the user is, independent of their profile row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lessons_core::model::{Credentials, NewAccount, UserId};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

mod local;
mod remote;

pub use local::LocalIdentity;
pub use remote::RemoteIdentity;

/// An authenticated identity as handed out by a provider and persisted between launches.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: UserId,
    pub email: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    /// Session without backend tokens, as issued by local identities.
    #[must_use]
    pub fn local(user_id: UserId, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            access_token: None,
            refresh_token: None,
            expires_at: None,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or wrong password.
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError>;

    /// Create the identity only; the profile row is written by the caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    async fn sign_up(&self, account: &NewAccount) -> Result<AuthSession, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError` if the provider could not end the session.
    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError>;

    /// Re-attach a persisted session after a restart, or renew one that has
    /// expired. Returns the session to keep using, which may carry new tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if the session cannot be used anymore,
    /// or `AuthError::Http` if the provider could not be reached.
    async fn resume(&self, session: &AuthSession) -> Result<AuthSession, AuthError> {
        Ok(session.clone())
    }
}
