use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lessons_core::model::{
    Lesson, LessonId, Profile, Role, UserId, Video, VideoId, WatchProgress,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("not authorized")]
    Unauthorized,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Orderings the lesson lists use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonOrder {
    /// `created_at` descending.
    Newest,
    /// `order_index` ascending, ties broken by `created_at` descending.
    Curriculum,
}

/// Local sign-in secret for an account; never leaves the storage/identity layers.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub user_id: UserId,
    /// Lowercased.
    pub email: String,
    /// PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id or email already exists.
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StorageError>;

    /// Fetch a profile by user id. Returns `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_profile(&self, id: UserId) -> Result<Option<Profile>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_profiles_by_role(&self, role: Role) -> Result<u32, StorageError>;
}

/// Repository contract for lessons.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored.
    async fn insert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// Replace the editable fields of an existing lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the lesson does not exist.
    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError>;

    /// Published lessons only.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_published_lessons(
        &self,
        order: LessonOrder,
        limit: Option<u32>,
    ) -> Result<Vec<Lesson>, StorageError>;

    /// All lessons of one teacher, newest first, published or not.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_lessons_by_teacher(&self, teacher_id: UserId)
    -> Result<Vec<Lesson>, StorageError>;

    /// Delete a single lesson row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if nothing was deleted.
    async fn delete_lesson(&self, id: LessonId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the lesson already has a video at that index.
    async fn insert_video(&self, video: &Video) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_video(&self, id: VideoId) -> Result<Option<Video>, StorageError>;

    /// Videos of a lesson by `order_index` ascending.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_videos_for_lesson(&self, lesson_id: LessonId)
    -> Result<Vec<Video>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_videos_for_lesson(&self, lesson_id: LessonId) -> Result<u32, StorageError>;

    /// One past the highest `order_index` in the lesson, or 0 for an empty lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn next_video_order_index(&self, lesson_id: LessonId) -> Result<i32, StorageError>;

    /// Delete exactly one video.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if nothing was deleted.
    async fn delete_video(&self, id: VideoId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait WatchProgressRepository: Send + Sync {
    /// Insert or replace the row keyed by (user, video) and return what is stored.
    ///
    /// An existing row keeps its id and `created_at`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn upsert_progress(&self, progress: &WatchProgress)
    -> Result<WatchProgress, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<Option<WatchProgress>, StorageError>;

    /// The user's rows restricted to `video_ids`, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_progress_for_videos(
        &self,
        user_id: UserId,
        video_ids: &[VideoId],
    ) -> Result<Vec<WatchProgress>, StorageError>;
}

#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the email is already registered.
    async fn insert_credential(&self, record: &CredentialRecord) -> Result<(), StorageError>;

    /// Lookup by (case-insensitive) email.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn find_credential(&self, email: &str) -> Result<Option<CredentialRecord>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct Tables {
    profiles: HashMap<UserId, Profile>,
    lessons: HashMap<LessonId, Lesson>,
    videos: HashMap<VideoId, Video>,
    progress: HashMap<(UserId, VideoId), WatchProgress>,
    credentials: HashMap<String, CredentialRecord>,
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Deleting a lesson or video removes dependent rows the way the SQL schema's
/// `ON DELETE CASCADE` foreign keys do.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let email_taken = guard
            .profiles
            .values()
            .any(|p| p.email().eq_ignore_ascii_case(profile.email()));
        if guard.profiles.contains_key(&profile.id()) || email_taken {
            return Err(StorageError::Conflict);
        }
        guard.profiles.insert(profile.id(), profile.clone());
        Ok(())
    }

    async fn get_profile(&self, id: UserId) -> Result<Option<Profile>, StorageError> {
        Ok(self.lock()?.profiles.get(&id).cloned())
    }

    async fn count_profiles_by_role(&self, role: Role) -> Result<u32, StorageError> {
        let count = self
            .lock()?
            .profiles
            .values()
            .filter(|p| p.role() == role)
            .count();
        u32::try_from(count).map_err(|_| StorageError::Serialization("count overflow".into()))
    }
}

fn sort_lessons(lessons: &mut [Lesson], order: LessonOrder) {
    match order {
        LessonOrder::Newest => lessons.sort_by(|a, b| b.created_at().cmp(&a.created_at())),
        LessonOrder::Curriculum => lessons.sort_by(|a, b| {
            a.order_index()
                .cmp(&b.order_index())
                .then_with(|| b.created_at().cmp(&a.created_at()))
        }),
    }
}

#[async_trait]
impl LessonRepository for InMemoryRepository {
    async fn insert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if guard.lessons.contains_key(&lesson.id()) {
            return Err(StorageError::Conflict);
        }
        guard.lessons.insert(lesson.id(), lesson.clone());
        Ok(())
    }

    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        match guard.lessons.get_mut(&lesson.id()) {
            Some(existing) => {
                *existing = lesson.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        Ok(self.lock()?.lessons.get(&id).cloned())
    }

    async fn list_published_lessons(
        &self,
        order: LessonOrder,
        limit: Option<u32>,
    ) -> Result<Vec<Lesson>, StorageError> {
        let mut lessons: Vec<Lesson> = self
            .lock()?
            .lessons
            .values()
            .filter(|l| l.is_published())
            .cloned()
            .collect();
        sort_lessons(&mut lessons, order);
        if let Some(limit) = limit {
            lessons.truncate(limit as usize);
        }
        Ok(lessons)
    }

    async fn list_lessons_by_teacher(
        &self,
        teacher_id: UserId,
    ) -> Result<Vec<Lesson>, StorageError> {
        let mut lessons: Vec<Lesson> = self
            .lock()?
            .lessons
            .values()
            .filter(|l| l.teacher_id() == teacher_id)
            .cloned()
            .collect();
        sort_lessons(&mut lessons, LessonOrder::Newest);
        Ok(lessons)
    }

    async fn delete_lesson(&self, id: LessonId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if guard.lessons.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        let orphaned: Vec<VideoId> = guard
            .videos
            .values()
            .filter(|v| v.lesson_id() == id)
            .map(Video::id)
            .collect();
        for video_id in orphaned {
            guard.videos.remove(&video_id);
            guard.progress.retain(|(_, v), _| *v != video_id);
        }
        Ok(())
    }
}

#[async_trait]
impl VideoRepository for InMemoryRepository {
    async fn insert_video(&self, video: &Video) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.lessons.contains_key(&video.lesson_id()) {
            return Err(StorageError::NotFound);
        }
        let index_taken = guard
            .videos
            .values()
            .any(|v| v.lesson_id() == video.lesson_id() && v.order_index() == video.order_index());
        if guard.videos.contains_key(&video.id()) || index_taken {
            return Err(StorageError::Conflict);
        }
        guard.videos.insert(video.id(), video.clone());
        Ok(())
    }

    async fn get_video(&self, id: VideoId) -> Result<Option<Video>, StorageError> {
        Ok(self.lock()?.videos.get(&id).cloned())
    }

    async fn list_videos_for_lesson(
        &self,
        lesson_id: LessonId,
    ) -> Result<Vec<Video>, StorageError> {
        let mut videos: Vec<Video> = self
            .lock()?
            .videos
            .values()
            .filter(|v| v.lesson_id() == lesson_id)
            .cloned()
            .collect();
        videos.sort_by_key(Video::order_index);
        Ok(videos)
    }

    async fn count_videos_for_lesson(&self, lesson_id: LessonId) -> Result<u32, StorageError> {
        let count = self
            .lock()?
            .videos
            .values()
            .filter(|v| v.lesson_id() == lesson_id)
            .count();
        u32::try_from(count).map_err(|_| StorageError::Serialization("count overflow".into()))
    }

    async fn next_video_order_index(&self, lesson_id: LessonId) -> Result<i32, StorageError> {
        let max = self
            .lock()?
            .videos
            .values()
            .filter(|v| v.lesson_id() == lesson_id)
            .map(Video::order_index)
            .max();
        Ok(max.map_or(0, |m| m + 1))
    }

    async fn delete_video(&self, id: VideoId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if guard.videos.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        guard.progress.retain(|(_, v), _| *v != id);
        Ok(())
    }
}

#[async_trait]
impl WatchProgressRepository for InMemoryRepository {
    async fn upsert_progress(
        &self,
        progress: &WatchProgress,
    ) -> Result<WatchProgress, StorageError> {
        let mut guard = self.lock()?;
        let key = (progress.user_id(), progress.video_id());
        let stored = match guard.progress.get(&key) {
            Some(existing) => existing.replaced_with(progress),
            None => progress.clone(),
        };
        guard.progress.insert(key, stored.clone());
        Ok(stored)
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<Option<WatchProgress>, StorageError> {
        Ok(self.lock()?.progress.get(&(user_id, video_id)).cloned())
    }

    async fn list_progress_for_videos(
        &self,
        user_id: UserId,
        video_ids: &[VideoId],
    ) -> Result<Vec<WatchProgress>, StorageError> {
        let guard = self.lock()?;
        Ok(video_ids
            .iter()
            .filter_map(|video_id| guard.progress.get(&(user_id, *video_id)).cloned())
            .collect())
    }
}

#[async_trait]
impl CredentialRepository for InMemoryRepository {
    async fn insert_credential(&self, record: &CredentialRecord) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let key = record.email.to_lowercase();
        if guard.credentials.contains_key(&key) {
            return Err(StorageError::Conflict);
        }
        guard.credentials.insert(key, record.clone());
        Ok(())
    }

    async fn find_credential(&self, email: &str) -> Result<Option<CredentialRecord>, StorageError> {
        Ok(self
            .lock()?
            .credentials
            .get(&email.trim().to_lowercase())
            .cloned())
    }
}

/// Aggregates the content repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub profiles: Arc<dyn ProfileRepository>,
    pub lessons: Arc<dyn LessonRepository>,
    pub videos: Arc<dyn VideoRepository>,
    pub progress: Arc<dyn WatchProgressRepository>,
}

impl Storage {
    /// Build a `Storage` where every repository is the same backend value.
    #[must_use]
    pub fn from_backend<R>(repo: R) -> Self
    where
        R: ProfileRepository
            + LessonRepository
            + VideoRepository
            + WatchProgressRepository
            + Clone
            + 'static,
    {
        Self {
            profiles: Arc::new(repo.clone()),
            lessons: Arc::new(repo.clone()),
            videos: Arc::new(repo.clone()),
            progress: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessons_core::model::{
        LessonDraft, PlaybackPosition, ProgressId, VideoDraft,
    };
    use lessons_core::time::fixed_now;

    fn build_lesson(teacher: UserId, title: &str, minutes_ago: i64, published: bool) -> Lesson {
        let draft = LessonDraft {
            title: title.into(),
            is_published: published,
            ..LessonDraft::default()
        };
        Lesson::new(
            LessonId::generate(),
            teacher,
            &draft,
            fixed_now() - chrono::Duration::minutes(minutes_ago),
        )
        .unwrap()
    }

    fn build_video(lesson: LessonId, index: i32) -> Video {
        let draft = VideoDraft {
            title: format!("Part {index}"),
            video_url: "https://example.com/v.mp4".into(),
            duration_seconds: 600,
            ..VideoDraft::default()
        };
        Video::new(VideoId::generate(), lesson, &draft, index, fixed_now()).unwrap()
    }

    #[tokio::test]
    async fn published_lessons_follow_requested_order() {
        let repo = InMemoryRepository::new();
        let teacher = UserId::generate();
        let old = build_lesson(teacher, "Old", 30, true);
        let new = build_lesson(teacher, "New", 1, true);
        let hidden = build_lesson(teacher, "Draft", 0, false);
        for lesson in [&old, &new, &hidden] {
            repo.insert_lesson(lesson).await.unwrap();
        }

        let newest = repo
            .list_published_lessons(LessonOrder::Newest, None)
            .await
            .unwrap();
        let titles: Vec<&str> = newest.iter().map(Lesson::title).collect();
        assert_eq!(titles, ["New", "Old"]);

        let limited = repo
            .list_published_lessons(LessonOrder::Newest, Some(1))
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);

        let mine = repo.list_lessons_by_teacher(teacher).await.unwrap();
        assert_eq!(mine.len(), 3);
        assert_eq!(mine[0].title(), "Draft");
    }

    #[tokio::test]
    async fn deleting_video_keeps_siblings() {
        let repo = InMemoryRepository::new();
        let lesson = build_lesson(UserId::generate(), "L", 0, true);
        repo.insert_lesson(&lesson).await.unwrap();
        let first = build_video(lesson.id(), 0);
        let second = build_video(lesson.id(), 1);
        repo.insert_video(&first).await.unwrap();
        repo.insert_video(&second).await.unwrap();

        repo.delete_video(first.id()).await.unwrap();

        let left = repo.list_videos_for_lesson(lesson.id()).await.unwrap();
        assert_eq!(left, vec![second]);
        assert!(matches!(
            repo.delete_video(first.id()).await,
            Err(StorageError::NotFound)
        ));
        assert_eq!(repo.next_video_order_index(lesson.id()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_user_and_video() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        let video = VideoId::generate();
        let sample = |pos| {
            WatchProgress::record(
                ProgressId::generate(),
                user,
                video,
                PlaybackPosition::new(pos, 600).unwrap(),
                fixed_now(),
            )
        };

        let first = repo.upsert_progress(&sample(100.0)).await.unwrap();
        let second = repo.upsert_progress(&sample(550.0)).await.unwrap();

        assert_eq!(first.id(), second.id());
        assert!(second.completed());
        let rows = repo.list_progress_for_videos(user, &[video]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].last_position_seconds(), 550);
    }

    #[tokio::test]
    async fn duplicate_credential_email_conflicts() {
        let repo = InMemoryRepository::new();
        let record = CredentialRecord {
            user_id: UserId::generate(),
            email: "a@example.com".into(),
            password_hash: "hash".into(),
            created_at: fixed_now(),
        };
        repo.insert_credential(&record).await.unwrap();
        let again = CredentialRecord {
            email: "A@Example.com".into(),
            ..record.clone()
        };
        assert!(matches!(
            repo.insert_credential(&again).await,
            Err(StorageError::Conflict)
        ));
        assert!(repo.find_credential(" A@EXAMPLE.COM").await.unwrap().is_some());
    }
}
