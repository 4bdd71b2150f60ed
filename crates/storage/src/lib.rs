#![forbid(unsafe_code)]

pub mod repository;
pub mod rest;
pub mod sqlite;

pub use repository::{
    CredentialRecord, CredentialRepository, InMemoryRepository, LessonOrder, LessonRepository,
    ProfileRepository, Storage, StorageError, VideoRepository, WatchProgressRepository,
};
