use std::sync::Arc;

use lessons_core::Clock;
use services::{LessonService, ProgressTracker, SessionContext, VideoService};

pub trait UiApp: Send + Sync {
    fn clock(&self) -> Clock;

    fn session(&self) -> SessionContext;
    fn lessons(&self) -> Arc<LessonService>;
    fn videos(&self) -> Arc<VideoService>;
    fn progress(&self) -> Arc<ProgressTracker>;
}

#[derive(Clone)]
pub struct AppContext {
    clock: Clock,
    session: SessionContext,
    lessons: Arc<LessonService>,
    videos: Arc<VideoService>,
    progress: Arc<ProgressTracker>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            clock: app.clock(),
            session: app.session(),
            lessons: app.lessons(),
            videos: app.videos(),
            progress: app.progress(),
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Shared by every screen; the only cross-screen state.
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

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
