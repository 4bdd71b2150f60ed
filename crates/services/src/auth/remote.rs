use async_trait::async_trait;
use chrono::Duration;
use lessons_core::model::{Credentials, NewAccount, UserId};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use storage::rest::{BearerToken, RestConfig};
use tracing::{info, warn};

use super::{AuthSession, IdentityProvider};
use crate::Clock;
use crate::error::AuthError;

/// Hosted auth endpoints (`/auth/v1/...`) of the same project the REST backend talks to.
///
/// Keeps the shared [`BearerToken`] in step with the session so data requests
/// run as the signed-in user.
#[derive(Clone)]
pub struct RemoteIdentity {
    client: Client,
    config: RestConfig,
    token: BearerToken,
    clock: Clock,
}

impl RemoteIdentity {
    #[must_use]
    pub fn new(config: RestConfig, token: BearerToken, clock: Clock) -> Self {
        Self {
            client: Client::new(),
            config,
            token,
            clock,
        }
    }

    async fn check(response: Response) -> Result<Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(AuthError::HttpStatus { status, message })
    }

    /// Trade a refresh token for a new access token.
    async fn refresh(
        &self,
        session: &AuthSession,
        refresh_token: &str,
    ) -> Result<AuthSession, AuthError> {
        let response = self
            .client
            .post(self.config.endpoint("auth/v1/token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", self.config.api_key())
            .json(&RefreshGrant { refresh_token })
            .send()
            .await?;

        let response = match Self::check(response).await {
            Ok(response) => response,
            Err(AuthError::HttpStatus { status, .. })
                if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED =>
            {
                return Err(AuthError::NotSignedIn);
            }
            Err(e) => return Err(e),
        };

        let body: TokenResponse = response.json().await?;
        let mut renewed = self.session_from(body, &session.email)?;
        if renewed.refresh_token.is_none() {
            renewed.refresh_token = Some(refresh_token.to_owned());
        }
        Ok(renewed)
    }

    fn session_from(&self, body: TokenResponse, email: &str) -> Result<AuthSession, AuthError> {
        let user_id = body
            .user
            .as_ref()
            .map(|u| u.id)
            .or(body.id)
            .ok_or_else(|| AuthError::HttpStatus {
                status: StatusCode::OK,
                message: "response did not include a user id".into(),
            })?;
        let email = body
            .user
            .and_then(|u| u.email)
            .or(body.email)
            .unwrap_or_else(|| email.to_owned());
        let expires_at = body
            .expires_in
            .map(|secs| self.clock.now() + Duration::seconds(secs));
        Ok(AuthSession {
            user_id,
            email,
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            expires_at,
        })
    }
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct SignUpMetadata<'a> {
    full_name: &'a str,
    role: &'a str,
}

/// Token grant responses carry `user`; sign-up without auto-confirm returns the
/// bare user object instead, hence the top-level `id`/`email`.
#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: Option<RemoteUser>,
    id: Option<UserId>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: UserId,
    email: Option<String>,
}

fn is_duplicate_signup(status: StatusCode, message: &str) -> bool {
    let lowered = message.to_lowercase();
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY
    ) && (lowered.contains("already registered") || lowered.contains("user_already_exists"))
}

#[async_trait]
impl IdentityProvider for RemoteIdentity {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        let response = self
            .client
            .post(self.config.endpoint("auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", self.config.api_key())
            .json(&PasswordGrant {
                email: credentials.email.trim(),
                password: &credentials.password,
            })
            .send()
            .await?;

        let response = match Self::check(response).await {
            Ok(response) => response,
            Err(AuthError::HttpStatus { status, .. })
                if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED =>
            {
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let body: TokenResponse = response.json().await?;
        let session = self.session_from(body, credentials.email.trim())?;
        self.token.set(session.access_token.clone())?;
        info!(user_id = %session.user_id, "signed in");
        Ok(session)
    }

    async fn sign_up(&self, account: &NewAccount) -> Result<AuthSession, AuthError> {
        let response = self
            .client
            .post(self.config.endpoint("auth/v1/signup"))
            .header("apikey", self.config.api_key())
            .json(&SignUpRequest {
                email: account.email.trim(),
                password: &account.password,
                data: SignUpMetadata {
                    full_name: &account.full_name,
                    role: account.role.as_str(),
                },
            })
            .send()
            .await?;

        let response = match Self::check(response).await {
            Ok(response) => response,
            Err(AuthError::HttpStatus { status, message })
                if is_duplicate_signup(status, &message) =>
            {
                return Err(AuthError::EmailTaken);
            }
            Err(e) => return Err(e),
        };

        let body: TokenResponse = response.json().await?;
        let session = self.session_from(body, account.email.trim())?;
        if session.access_token.is_some() {
            self.token.set(session.access_token.clone())?;
        }
        info!(user_id = %session.user_id, "account created");
        Ok(session)
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        let result = match session.access_token.as_deref() {
            Some(access_token) => {
                let response = self
                    .client
                    .post(self.config.endpoint("auth/v1/logout"))
                    .header("apikey", self.config.api_key())
                    .bearer_auth(access_token)
                    .send()
                    .await;
                match response {
                    Ok(response) => Self::check(response).await.map(|_| ()),
                    Err(e) => Err(e.into()),
                }
            }
            None => Ok(()),
        };
        self.token.set(None)?;
        if let Err(e) = &result {
            warn!(error = %e, "remote sign-out failed; local session cleared anyway");
        }
        info!(user_id = %session.user_id, "signed out");
        result
    }

    async fn resume(&self, session: &AuthSession) -> Result<AuthSession, AuthError> {
        let session = if session.is_expired(self.clock.now()) {
            let Some(refresh_token) = session.refresh_token.as_deref() else {
                self.token.set(None)?;
                return Err(AuthError::NotSignedIn);
            };
            match self.refresh(session, refresh_token).await {
                Ok(renewed) => {
                    info!(user_id = %renewed.user_id, "session refreshed");
                    renewed
                }
                Err(e) => {
                    self.token.set(None)?;
                    return Err(e);
                }
            }
        } else {
            session.clone()
        };
        self.token.set(session.access_token.clone())?;
        Ok(session)
    }
}
