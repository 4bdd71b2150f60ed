#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod error;
pub mod lesson_service;
pub mod progress_service;
pub mod session;
pub mod video_service;

pub use lessons_core::Clock;

pub use app_services::AppServices;
pub use auth::{AuthSession, IdentityProvider, LocalIdentity, RemoteIdentity};
pub use error::{
    AppServicesError, AuthError, ContentServiceError, ProgressServiceError, SessionStoreError,
};
pub use lesson_service::{LessonDetail, LessonService, LessonSummary, TeacherDashboard, filter_lessons};
pub use progress_service::ProgressTracker;
pub use session::{FileSessionStore, InMemorySessionStore, SessionContext, SessionStore};
pub use video_service::VideoService;
