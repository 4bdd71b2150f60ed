use std::sync::Arc;

use lessons_core::model::{LessonId, Profile, UserId, Video, VideoDraft, VideoId};
use storage::repository::{LessonRepository, StorageError, VideoRepository};
use tracing::info;

use crate::Clock;
use crate::error::ContentServiceError;
use crate::lesson_service::{is_viewable, require_owner};

/// Video reads and the teacher's add/delete actions.
#[derive(Clone)]
pub struct VideoService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
    videos: Arc<dyn VideoRepository>,
}

impl VideoService {
    #[must_use]
    pub fn new(
        clock: Clock,
        lessons: Arc<dyn LessonRepository>,
        videos: Arc<dyn VideoRepository>,
    ) -> Self {
        Self {
            clock,
            lessons,
            videos,
        }
    }

    /// A video for the player: `Ok(None)` when it does not exist, or when its
    /// lesson is unpublished and the viewer is not the lesson's teacher.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Storage` if repository access fails.
    pub async fn playable_video(
        &self,
        id: VideoId,
        viewer: Option<UserId>,
    ) -> Result<Option<Video>, ContentServiceError> {
        let Some(video) = self.videos.get_video(id).await? else {
            return Ok(None);
        };
        match self.lessons.get_lesson(video.lesson_id()).await? {
            Some(lesson) if is_viewable(&lesson, viewer) => Ok(Some(video)),
            _ => Ok(None),
        }
    }

    /// Append a video to the end of a lesson the profile owns.
    ///
    /// The draft is checked before anything is read or written.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Video` for form problems, ownership errors,
    /// or `ContentServiceError::Storage(NotFound)` for an unknown lesson.
    pub async fn add_video(
        &self,
        profile: &Profile,
        lesson_id: LessonId,
        draft: &VideoDraft,
    ) -> Result<Video, ContentServiceError> {
        draft.check()?;
        let lesson = self
            .lessons
            .get_lesson(lesson_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        require_owner(profile, &lesson)?;

        let order_index = self.videos.next_video_order_index(lesson_id).await?;
        let video = Video::new(
            VideoId::generate(),
            lesson_id,
            draft,
            order_index,
            self.clock.now(),
        )?;
        self.videos.insert_video(&video).await?;
        info!(video_id = %video.id(), %lesson_id, order_index, "video added");
        Ok(video)
    }

    /// Delete exactly one video of a lesson the profile owns.
    ///
    /// # Errors
    ///
    /// Returns ownership errors or `ContentServiceError::Storage(NotFound)`.
    pub async fn delete_video(
        &self,
        profile: &Profile,
        id: VideoId,
    ) -> Result<(), ContentServiceError> {
        let video = self
            .videos
            .get_video(id)
            .await?
            .ok_or(StorageError::NotFound)?;
        let lesson = self
            .lessons
            .get_lesson(video.lesson_id())
            .await?
            .ok_or(StorageError::NotFound)?;
        require_owner(profile, &lesson)?;
        self.videos.delete_video(id).await?;
        info!(video_id = %id, lesson_id = %lesson.id(), "video deleted");
        Ok(())
    }
}
