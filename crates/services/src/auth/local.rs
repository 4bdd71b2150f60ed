use std::sync::Arc;

use argon2::{
    Argon2, PasswordVerifier,
    password_hash::{PasswordHash, PasswordHasher, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use lessons_core::model::{Credentials, NewAccount, UserId};
use storage::repository::{CredentialRecord, CredentialRepository, StorageError};
use tracing::info;

use super::{AuthSession, IdentityProvider};
use crate::Clock;
use crate::error::AuthError;

/// Accounts kept next to the local database, passwords stored as argon2 PHC strings.
#[derive(Clone)]
pub struct LocalIdentity {
    clock: Clock,
    credentials: Arc<dyn CredentialRepository>,
}

impl LocalIdentity {
    #[must_use]
    pub fn new(clock: Clock, credentials: Arc<dyn CredentialRepository>) -> Self {
        Self { clock, credentials }
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .to_string())
}

fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        let record = self
            .credentials
            .find_credential(&credentials.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(&credentials.password, &record.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        info!(user_id = %record.user_id, "signed in");
        Ok(AuthSession::local(record.user_id, record.email))
    }

    async fn sign_up(&self, account: &NewAccount) -> Result<AuthSession, AuthError> {
        let record = CredentialRecord {
            user_id: UserId::generate(),
            email: account.email.trim().to_lowercase(),
            password_hash: hash_password(&account.password)?,
            created_at: self.clock.now(),
        };
        match self.credentials.insert_credential(&record).await {
            Ok(()) => {}
            Err(StorageError::Conflict) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e.into()),
        }
        info!(user_id = %record.user_id, "account created");
        Ok(AuthSession::local(record.user_id, record.email))
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        info!(user_id = %session.user_id, "signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessons_core::model::Role;
    use lessons_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn identity() -> LocalIdentity {
        LocalIdentity::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    fn account(email: &str) -> NewAccount {
        NewAccount {
            full_name: "Sam".into(),
            email: email.into(),
            password: "hunter22".into(),
            role: Role::Student,
            grade: Some("Grade 8".into()),
        }
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let identity = identity();
        let created = identity.sign_up(&account("Sam@Example.com")).await.unwrap();
        assert_eq!(created.email, "sam@example.com");

        let session = identity
            .sign_in(&Credentials {
                email: "sam@example.com".into(),
                password: "hunter22".into(),
            })
            .await
            .unwrap();
        assert_eq!(session.user_id, created.user_id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let identity = identity();
        identity.sign_up(&account("sam@example.com")).await.unwrap();

        let wrong = identity
            .sign_in(&Credentials {
                email: "sam@example.com".into(),
                password: "nope-nope".into(),
            })
            .await;
        let unknown = identity
            .sign_in(&Credentials {
                email: "nobody@example.com".into(),
                password: "hunter22".into(),
            })
            .await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let identity = identity();
        identity.sign_up(&account("sam@example.com")).await.unwrap();
        assert!(matches!(
            identity.sign_up(&account("SAM@example.com")).await,
            Err(AuthError::EmailTaken)
        ));
    }

    #[test]
    fn stored_hash_is_not_the_password() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }
}
