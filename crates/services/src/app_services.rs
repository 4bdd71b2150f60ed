use std::sync::Arc;

use storage::repository::{InMemoryRepository, Storage};
use storage::rest::{BearerToken, RestConfig};
use storage::sqlite::SqliteRepository;

use crate::Clock;
use crate::auth::{IdentityProvider, LocalIdentity, RemoteIdentity};
use crate::error::AppServicesError;
use crate::lesson_service::LessonService;
use crate::progress_service::ProgressTracker;
use crate::session::{InMemorySessionStore, SessionContext, SessionStore};
use crate::video_service::VideoService;

/// Assembles app-facing services over one backend.
#[derive(Clone)]
pub struct AppServices {
    session: SessionContext,
    lessons: Arc<LessonService>,
    videos: Arc<VideoService>,
    progress: Arc<ProgressTracker>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage with local accounts.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, AppServicesError> {
        let repo = SqliteRepository::connect(db_url).await?;
        repo.migrate().await?;
        let identity = Arc::new(LocalIdentity::new(clock, Arc::new(repo.clone())));
        Ok(Self::assemble(
            Storage::from_backend(repo),
            identity,
            clock,
            sessions,
        ))
    }

    /// Build services against the hosted backend; data and auth share one bearer token.
    #[must_use]
    pub fn new_remote(config: RestConfig, clock: Clock, sessions: Arc<dyn SessionStore>) -> Self {
        let token = BearerToken::new();
        let identity = Arc::new(RemoteIdentity::new(config.clone(), token.clone(), clock));
        Self::assemble(Storage::rest(config, token), identity, clock, sessions)
    }

    /// Everything in memory; used by tests and UI previews.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        let repo = InMemoryRepository::new();
        let identity = Arc::new(LocalIdentity::new(clock, Arc::new(repo.clone())));
        Self::assemble(
            Storage::from_backend(repo),
            identity,
            clock,
            Arc::new(InMemorySessionStore::new()),
        )
    }

    #[must_use]
    pub fn assemble(
        storage: Storage,
        identity: Arc<dyn IdentityProvider>,
        clock: Clock,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let session =
            SessionContext::new(clock, identity, Arc::clone(&storage.profiles), sessions);
        let lessons = Arc::new(LessonService::new(
            clock,
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.videos),
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.progress),
        ));
        let videos = Arc::new(VideoService::new(
            clock,
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.videos),
        ));
        let progress = Arc::new(ProgressTracker::new(clock, Arc::clone(&storage.progress)));
        Self {
            session,
            lessons,
            videos,
            progress,
        }
    }

    #[must_use]
    pub fn session(&self) -> SessionContext {
        self.session.clone()
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonService> {
        Arc::clone(&self.lessons)
    }

    #[must_use]
    pub fn videos(&self) -> Arc<VideoService> {
        Arc::clone(&self.videos)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.progress)
    }
}
