use std::sync::Arc;

use lessons_core::access::can_manage_lesson;
use lessons_core::model::{
    Lesson, LessonDraft, LessonId, LessonProgress, Profile, Role, UserId, Video,
};
use storage::repository::{
    LessonOrder, LessonRepository, ProfileRepository, StorageError, VideoRepository,
    WatchProgressRepository,
};
use tracing::{debug, info};

use crate::Clock;
use crate::error::ContentServiceError;

/// Lesson shown in a list together with how many videos it has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonSummary {
    pub lesson: Lesson,
    pub video_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherDashboard {
    pub lessons: Vec<LessonSummary>,
    pub total_videos: u32,
    pub student_count: u32,
}

impl TeacherDashboard {
    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.lessons.len()
    }
}

/// A lesson with its ordered videos and, for a signed-in viewer, their progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDetail {
    pub lesson: Lesson,
    pub videos: Vec<Video>,
    pub progress: LessonProgress,
}

/// Case-insensitive match on title or description; a blank query keeps everything.
#[must_use]
pub fn filter_lessons(lessons: &[LessonSummary], query: &str) -> Vec<LessonSummary> {
    lessons
        .iter()
        .filter(|summary| summary.lesson.matches_query(query))
        .cloned()
        .collect()
}

/// Published lessons are open to everyone; drafts only to their teacher.
pub(crate) fn is_viewable(lesson: &Lesson, viewer: Option<UserId>) -> bool {
    lesson.is_published() || viewer.is_some_and(|user| lesson.is_owned_by(user))
}

pub(crate) fn require_owner(profile: &Profile, lesson: &Lesson) -> Result<(), ContentServiceError> {
    if !profile.is_teacher() {
        return Err(ContentServiceError::TeachersOnly);
    }
    if !can_manage_lesson(profile, lesson) {
        return Err(ContentServiceError::NotOwner);
    }
    Ok(())
}

/// Reads and teacher-side writes for lessons.
#[derive(Clone)]
pub struct LessonService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
    videos: Arc<dyn VideoRepository>,
    profiles: Arc<dyn ProfileRepository>,
    progress: Arc<dyn WatchProgressRepository>,
}

impl LessonService {
    #[must_use]
    pub fn new(
        clock: Clock,
        lessons: Arc<dyn LessonRepository>,
        videos: Arc<dyn VideoRepository>,
        profiles: Arc<dyn ProfileRepository>,
        progress: Arc<dyn WatchProgressRepository>,
    ) -> Self {
        Self {
            clock,
            lessons,
            videos,
            profiles,
            progress,
        }
    }

    async fn with_video_counts(
        &self,
        lessons: Vec<Lesson>,
    ) -> Result<Vec<LessonSummary>, ContentServiceError> {
        let mut out = Vec::with_capacity(lessons.len());
        for lesson in lessons {
            let video_count = self.videos.count_videos_for_lesson(lesson.id()).await?;
            out.push(LessonSummary {
                lesson,
                video_count,
            });
        }
        Ok(out)
    }

    /// Newest published lessons for the home screen.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Storage` if repository access fails.
    pub async fn recent_lessons(
        &self,
        limit: u32,
    ) -> Result<Vec<LessonSummary>, ContentServiceError> {
        let lessons = self
            .lessons
            .list_published_lessons(LessonOrder::Newest, Some(limit))
            .await?;
        self.with_video_counts(lessons).await
    }

    /// Every published lesson in curriculum order.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Storage` if repository access fails.
    pub async fn catalog(&self) -> Result<Vec<LessonSummary>, ContentServiceError> {
        let lessons = self
            .lessons
            .list_published_lessons(LessonOrder::Curriculum, None)
            .await?;
        self.with_video_counts(lessons).await
    }

    /// Published lessons newest first, as the student tab lists them.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Storage` if repository access fails.
    pub async fn student_lessons(&self) -> Result<Vec<LessonSummary>, ContentServiceError> {
        let lessons = self
            .lessons
            .list_published_lessons(LessonOrder::Newest, None)
            .await?;
        self.with_video_counts(lessons).await
    }

    /// # Errors
    ///
    /// Returns `ContentServiceError::TeachersOnly` for a student profile, or
    /// `ContentServiceError::Storage` if repository access fails.
    pub async fn teacher_dashboard(
        &self,
        profile: &Profile,
    ) -> Result<TeacherDashboard, ContentServiceError> {
        if !profile.is_teacher() {
            return Err(ContentServiceError::TeachersOnly);
        }
        let own = self.lessons.list_lessons_by_teacher(profile.id()).await?;
        let lessons = self.with_video_counts(own).await?;
        let total_videos = lessons.iter().map(|s| s.video_count).sum();
        let student_count = self.profiles.count_profiles_by_role(Role::Student).await?;
        Ok(TeacherDashboard {
            lessons,
            total_videos,
            student_count,
        })
    }

    /// Lesson, its videos in order, and the viewer's progress on them.
    ///
    /// Returns `Ok(None)` when the lesson does not exist, or is unpublished and
    /// the viewer is not its teacher.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Storage` if repository access fails.
    pub async fn lesson_detail(
        &self,
        id: LessonId,
        viewer: Option<UserId>,
    ) -> Result<Option<LessonDetail>, ContentServiceError> {
        let Some(lesson) = self.lessons.get_lesson(id).await? else {
            return Ok(None);
        };
        if !is_viewable(&lesson, viewer) {
            debug!(lesson_id = %id, "unpublished lesson hidden from viewer");
            return Ok(None);
        }
        let videos = self.videos.list_videos_for_lesson(id).await?;
        let progress = match viewer {
            Some(user_id) => {
                let ids: Vec<_> = videos.iter().map(Video::id).collect();
                let rows = self.progress.list_progress_for_videos(user_id, &ids).await?;
                LessonProgress::collect(&videos, rows)
            }
            None => LessonProgress::default(),
        };
        debug!(lesson_id = %id, videos = videos.len(), "lesson detail loaded");
        Ok(Some(LessonDetail {
            lesson,
            videos,
            progress,
        }))
    }

    /// Lesson plus videos for the edit screen, only for its owner.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::TeachersOnly`/`NotOwner` when the profile
    /// may not edit it, or `ContentServiceError::Storage`.
    pub async fn lesson_for_editing(
        &self,
        profile: &Profile,
        id: LessonId,
    ) -> Result<Option<(Lesson, Vec<Video>)>, ContentServiceError> {
        let Some(lesson) = self.lessons.get_lesson(id).await? else {
            return Ok(None);
        };
        require_owner(profile, &lesson)?;
        let videos = self.videos.list_videos_for_lesson(id).await?;
        Ok(Some((lesson, videos)))
    }

    /// Create a lesson owned by `profile`.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::TeachersOnly` for students and
    /// `ContentServiceError::Lesson` for a blank title; nothing is written in
    /// either case.
    pub async fn create_lesson(
        &self,
        profile: &Profile,
        draft: &LessonDraft,
    ) -> Result<Lesson, ContentServiceError> {
        if !profile.is_teacher() {
            return Err(ContentServiceError::TeachersOnly);
        }
        let lesson = Lesson::new(LessonId::generate(), profile.id(), draft, self.clock.now())?;
        self.lessons.insert_lesson(&lesson).await?;
        info!(lesson_id = %lesson.id(), teacher_id = %profile.id(), "lesson created");
        Ok(lesson)
    }

    /// # Errors
    ///
    /// Returns `ContentServiceError::Storage(NotFound)` for an unknown lesson,
    /// ownership errors, or `ContentServiceError::Lesson` for a blank title.
    pub async fn update_lesson(
        &self,
        profile: &Profile,
        id: LessonId,
        draft: &LessonDraft,
    ) -> Result<Lesson, ContentServiceError> {
        let mut lesson = self
            .lessons
            .get_lesson(id)
            .await?
            .ok_or(StorageError::NotFound)?;
        require_owner(profile, &lesson)?;
        lesson.apply_draft(draft, self.clock.now())?;
        self.lessons.update_lesson(&lesson).await?;
        info!(lesson_id = %id, "lesson updated");
        Ok(lesson)
    }

    /// Delete one lesson row. Dependent videos and progress are the backend's
    /// concern (cascading foreign keys); nothing else is deleted from here.
    ///
    /// # Errors
    ///
    /// Returns ownership errors or `ContentServiceError::Storage(NotFound)`.
    pub async fn delete_lesson(
        &self,
        profile: &Profile,
        id: LessonId,
    ) -> Result<(), ContentServiceError> {
        let lesson = self
            .lessons
            .get_lesson(id)
            .await?
            .ok_or(StorageError::NotFound)?;
        require_owner(profile, &lesson)?;
        self.lessons.delete_lesson(id).await?;
        info!(lesson_id = %id, "lesson deleted");
        Ok(())
    }
}
