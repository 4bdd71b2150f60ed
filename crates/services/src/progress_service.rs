use std::sync::Arc;

use lessons_core::model::{
    LessonProgress, PlaybackPosition, ProgressId, UserId, Video, VideoId, WatchProgress,
};
use storage::repository::WatchProgressRepository;
use tracing::{debug, warn};

use crate::Clock;
use crate::error::ProgressServiceError;

/// Records where a user is in a video and whether that counts as watched.
#[derive(Clone)]
pub struct ProgressTracker {
    clock: Clock,
    progress: Arc<dyn WatchProgressRepository>,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn WatchProgressRepository>) -> Self {
        Self { clock, progress }
    }

    /// Upsert the (user, video) row with the current position.
    ///
    /// Fractional seconds are floored before storage; completion is decided on
    /// the raw position (at least 90% of the duration).
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Progress` for a negative position or zero
    /// duration, or `ProgressServiceError::Storage` if the write fails.
    pub async fn record_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
        position_seconds: f64,
        duration_seconds: u32,
    ) -> Result<WatchProgress, ProgressServiceError> {
        let position = PlaybackPosition::new(position_seconds, duration_seconds)?;
        let sample = WatchProgress::record(
            ProgressId::generate(),
            user_id,
            video_id,
            position,
            self.clock.now(),
        );
        let stored = self.progress.upsert_progress(&sample).await?;
        debug!(
            %user_id,
            %video_id,
            position = stored.last_position_seconds(),
            completed = stored.completed(),
            "progress recorded"
        );
        Ok(stored)
    }

    /// Same as [`Self::record_progress`] but never fails the caller; problems are logged.
    pub async fn record_progress_best_effort(
        &self,
        user_id: UserId,
        video_id: VideoId,
        position_seconds: f64,
        duration_seconds: u32,
    ) -> Option<WatchProgress> {
        match self
            .record_progress(user_id, video_id, position_seconds, duration_seconds)
            .await
        {
            Ok(progress) => Some(progress),
            Err(e) => {
                warn!(%user_id, %video_id, error = %e, "failed to record progress");
                None
            }
        }
    }

    /// Opening the player marks the video as started at position 0.
    ///
    /// An existing row is returned untouched so reopening a finished video
    /// does not reset it.
    pub async fn mark_opened(&self, user_id: UserId, video: &Video) -> Option<WatchProgress> {
        match self.progress.get_progress(user_id, video.id()).await {
            Ok(Some(existing)) => Some(existing),
            Ok(None) => {
                self.record_progress_best_effort(user_id, video.id(), 0.0, video.duration_seconds())
                    .await
            }
            Err(e) => {
                warn!(%user_id, video_id = %video.id(), error = %e, "failed to load progress");
                None
            }
        }
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn get_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<Option<WatchProgress>, ProgressServiceError> {
        Ok(self.progress.get_progress(user_id, video_id).await?)
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn lesson_progress(
        &self,
        user_id: UserId,
        videos: &[Video],
    ) -> Result<LessonProgress, ProgressServiceError> {
        let ids: Vec<VideoId> = videos.iter().map(Video::id).collect();
        let rows = self.progress.list_progress_for_videos(user_id, &ids).await?;
        Ok(LessonProgress::collect(videos, rows))
    }
}
