//! Who is signed in right now, and how that survives a restart.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use lessons_core::model::{Profile, SignInForm, SignUpForm, UserId};
use storage::repository::ProfileRepository;
use tracing::{info, warn};

use crate::Clock;
use crate::auth::{AuthSession, IdentityProvider};
use crate::error::{AuthError, SessionStoreError};

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `SessionStoreError` if a stored session exists but cannot be read.
    async fn load(&self) -> Result<Option<AuthSession>, SessionStoreError>;

    /// # Errors
    ///
    /// Returns `SessionStoreError` if the session cannot be written.
    async fn save(&self, session: &AuthSession) -> Result<(), SessionStoreError>;

    /// # Errors
    ///
    /// Returns `SessionStoreError` if the stored session cannot be removed.
    async fn clear(&self) -> Result<(), SessionStoreError>;
}

/// JSON file next to the database.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<AuthSession>, SessionStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, session: &AuthSession) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    slot: Arc<Mutex<Option<AuthSession>>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> Result<Option<AuthSession>, SessionStoreError> {
        let guard = self.slot.lock().map_err(|_| SessionStoreError::Poisoned)?;
        Ok(guard.clone())
    }

    async fn save(&self, session: &AuthSession) -> Result<(), SessionStoreError> {
        let mut guard = self.slot.lock().map_err(|_| SessionStoreError::Poisoned)?;
        *guard = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        let mut guard = self.slot.lock().map_err(|_| SessionStoreError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct SignedIn {
    session: AuthSession,
    profile: Option<Profile>,
}

/// Current identity and profile, shared by every screen.
///
/// A signed-in user may have no profile row yet; role-gated sections then stay
/// hidden while shared ones keep working.
#[derive(Clone)]
pub struct SessionContext {
    clock: Clock,
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileRepository>,
    store: Arc<dyn SessionStore>,
    state: Arc<RwLock<Option<SignedIn>>>,
}

impl SessionContext {
    #[must_use]
    pub fn new(
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileRepository>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            clock,
            identity,
            profiles,
            store,
            state: Arc::new(RwLock::new(None)),
        }
    }

    fn read_state(&self) -> Option<SignedIn> {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write_state(&self, next: Option<SignedIn>) {
        match self.state.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.read_state().is_some()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserId> {
        self.read_state().map(|s| s.session.user_id)
    }

    #[must_use]
    pub fn current_session(&self) -> Option<AuthSession> {
        self.read_state().map(|s| s.session)
    }

    #[must_use]
    pub fn current_profile(&self) -> Option<Profile> {
        self.read_state().and_then(|s| s.profile)
    }

    /// Pick up a persisted session on launch.
    ///
    /// Returns the signed-in user, or `None` when there is nothing to restore.
    /// An expired session is renewed through the provider when it can be; a
    /// session the provider no longer accepts is discarded. A provider that
    /// cannot be reached leaves the stored session for the next launch.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the store, the provider or the profile lookup fails.
    pub async fn restore(&self) -> Result<Option<UserId>, AuthError> {
        let Some(stored) = self.store.load().await? else {
            return Ok(None);
        };

        let Some(session) = self.resume_or_discard(&stored).await? else {
            return Ok(None);
        };

        let profile = self.profiles.get_profile(session.user_id).await?;
        let user_id = session.user_id;
        self.write_state(Some(SignedIn { session, profile }));
        info!(%user_id, "session restored");
        Ok(Some(user_id))
    }

    /// Renew the current session if it has expired since it was issued.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` when the provider refused to renew it
    /// (local state is then cleared), or the provider's or store's error.
    pub async fn renew(&self) -> Result<(), AuthError> {
        let Some(current) = self.read_state() else {
            return Ok(());
        };
        if !current.session.is_expired(self.clock.now()) {
            return Ok(());
        }

        match self.resume_or_discard(&current.session).await? {
            Some(session) => {
                self.write_state(Some(SignedIn {
                    session,
                    profile: current.profile,
                }));
                Ok(())
            }
            None => Err(AuthError::NotSignedIn),
        }
    }

    /// Ask the provider to take `stored` back, persisting whatever session it
    /// hands out. `None` means the session is gone for good.
    async fn resume_or_discard(
        &self,
        stored: &AuthSession,
    ) -> Result<Option<AuthSession>, AuthError> {
        let session = match self.identity.resume(stored).await {
            Ok(session) if !session.is_expired(self.clock.now()) => session,
            Err(AuthError::Http(e)) => return Err(AuthError::Http(e)),
            Ok(_) | Err(_) => {
                info!(user_id = %stored.user_id, "stored session is no longer valid");
                self.store.clear().await?;
                self.write_state(None);
                return Ok(None);
            }
        };

        if session != *stored {
            self.store.save(&session).await?;
        }
        Ok(Some(session))
    }

    /// # Errors
    ///
    /// Returns `AuthError::Validation` before contacting the provider when a
    /// field is blank, otherwise the provider's or store's error.
    pub async fn sign_in(&self, form: &SignInForm) -> Result<Option<Profile>, AuthError> {
        let credentials = form.validate()?;
        let session = self.identity.sign_in(&credentials).await?;
        self.store.save(&session).await?;
        let profile = self.profiles.get_profile(session.user_id).await?;
        self.write_state(Some(SignedIn {
            session,
            profile: profile.clone(),
        }));
        Ok(profile)
    }

    /// Register an identity and its profile row, then leave the user signed out
    /// so they continue on the sign-in screen.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for form problems (checked in the order the
    /// form shows them), `AuthError::EmailTaken`, or provider/storage failures.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<Profile, AuthError> {
        let account = form.validate()?;
        let session = self.identity.sign_up(&account).await?;

        let profile = Profile::new(
            session.user_id,
            &account.email,
            &account.full_name,
            account.role,
            account.grade.as_deref(),
            self.clock.now(),
        )?;
        self.profiles.insert_profile(&profile).await?;
        info!(user_id = %profile.id(), role = %profile.role(), "profile created");

        if session.access_token.is_some() {
            if let Err(e) = self.identity.sign_out(&session).await {
                warn!(error = %e, "could not end post-registration session");
            }
        }
        Ok(profile)
    }

    /// End the session with the provider and forget it locally.
    ///
    /// Local state is cleared even when the provider call fails; that failure
    /// is still returned.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` from the provider or the session store.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.read_state();
        self.write_state(None);
        self.store.clear().await?;
        match previous {
            Some(signed_in) => self.identity.sign_out(&signed_in.session).await,
            None => Ok(()),
        }
    }
}
