//! Shared error types for the services crate.

use thiserror::Error;

use lessons_core::model::{AccountError, LessonError, ProfileError, ProgressError, VideoError};
use storage::repository::StorageError;
use storage::rest::RestInitError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while persisting or loading the signed-in session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionStoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("session store lock poisoned")]
    Poisoned,
}

/// Errors emitted by identity providers and `SessionContext`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] AccountError),
    #[error("email or password is incorrect")]
    InvalidCredentials,
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("not signed in")]
    NotSignedIn,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("identity service returned status {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    SessionStore(#[from] SessionStoreError),
}

/// Errors emitted by `LessonService` and `VideoService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentServiceError {
    #[error("only teachers can manage lessons")]
    TeachersOnly,
    #[error("this lesson belongs to another teacher")]
    NotOwner,
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Video(#[from] VideoError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressTracker`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Rest(#[from] RestInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
