use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{ProgressId, UserId, VideoId};
use crate::model::video::Video;

/// Returns true when `position_seconds >= 0.9 * duration_seconds`.
///
/// Compared as `10p >= 9d` so whole-second inputs never hit float rounding
/// at the boundary (540 of 600 completes, 539 does not).
#[must_use]
pub fn is_completed(position_seconds: f64, duration_seconds: u32) -> bool {
    position_seconds * 10.0 >= f64::from(duration_seconds) * 9.0
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("playback position must be a finite number >= 0, got {0}")]
    InvalidPosition(f64),

    #[error("video duration must be > 0 seconds")]
    ZeroDuration,
}

/// A validated playback sample: where the player is and whether that counts as done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackPosition {
    last_position_seconds: u32,
    completed: bool,
}

impl PlaybackPosition {
    /// # Errors
    ///
    /// Returns `ProgressError` for a negative/non-finite position or zero duration.
    pub fn new(position_seconds: f64, duration_seconds: u32) -> Result<Self, ProgressError> {
        if !position_seconds.is_finite() || position_seconds < 0.0 {
            return Err(ProgressError::InvalidPosition(position_seconds));
        }
        if duration_seconds == 0 {
            return Err(ProgressError::ZeroDuration);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let floored = position_seconds.floor().min(f64::from(u32::MAX)) as u32;

        Ok(Self {
            last_position_seconds: floored,
            completed: is_completed(position_seconds, duration_seconds),
        })
    }

    #[must_use]
    pub fn last_position_seconds(&self) -> u32 {
        self.last_position_seconds
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }
}

/// Per-user, per-video playback position and completion flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchProgress {
    id: ProgressId,
    user_id: UserId,
    video_id: VideoId,
    last_position_seconds: u32,
    completed: bool,
    watched_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl WatchProgress {
    /// First progress row for a (user, video) pair.
    #[must_use]
    pub fn record(
        id: ProgressId,
        user_id: UserId,
        video_id: VideoId,
        position: PlaybackPosition,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            video_id,
            last_position_seconds: position.last_position_seconds,
            completed: position.completed,
            watched_at: now,
            created_at: now,
        }
    }

    #[must_use]
    pub fn from_persisted(
        id: ProgressId,
        user_id: UserId,
        video_id: VideoId,
        last_position_seconds: u32,
        completed: bool,
        watched_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            video_id,
            last_position_seconds,
            completed,
            watched_at,
            created_at,
        }
    }

    /// Replaces position and completion, refreshing `watched_at`.
    ///
    /// The row keeps its id and `created_at`; this is what an upsert onto the
    /// (user, video) key does to an existing row.
    #[must_use]
    pub fn replaced_with(&self, incoming: &WatchProgress) -> Self {
        Self {
            id: self.id,
            user_id: self.user_id,
            video_id: self.video_id,
            last_position_seconds: incoming.last_position_seconds,
            completed: incoming.completed,
            watched_at: incoming.watched_at,
            created_at: self.created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> ProgressId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn video_id(&self) -> VideoId {
        self.video_id
    }

    #[must_use]
    pub fn last_position_seconds(&self) -> u32 {
        self.last_position_seconds
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn watched_at(&self) -> DateTime<Utc> {
        self.watched_at
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A user's progress across the videos of one lesson.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonProgress {
    by_video: HashMap<VideoId, WatchProgress>,
}

impl LessonProgress {
    /// Keeps only rows that belong to `videos`; later rows for the same video win.
    #[must_use]
    pub fn collect(videos: &[Video], rows: impl IntoIterator<Item = WatchProgress>) -> Self {
        let mut by_video = HashMap::with_capacity(videos.len());
        for row in rows {
            if videos.iter().any(|v| v.id() == row.video_id()) {
                by_video.insert(row.video_id(), row);
            }
        }
        Self { by_video }
    }

    #[must_use]
    pub fn get(&self, video_id: VideoId) -> Option<&WatchProgress> {
        self.by_video.get(&video_id)
    }

    #[must_use]
    pub fn is_completed(&self, video_id: VideoId) -> bool {
        self.get(video_id).is_some_and(WatchProgress::completed)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.by_video.values().filter(|p| p.completed()).count()
    }

    #[must_use]
    pub fn started_count(&self) -> usize {
        self.by_video.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::LessonId;
    use crate::model::video::VideoDraft;
    use crate::time::fixed_now;

    #[test]
    fn ninety_percent_of_ten_minutes_completes() {
        assert!(is_completed(540.0, 600));
        assert!(!is_completed(539.0, 600));
        assert!(!is_completed(539.99, 600));
    }

    #[test]
    fn threshold_holds_across_durations() {
        for d in 1..=2_000_u32 {
            for p in [0, d / 2, d * 9 / 10, d * 9 / 10 + 1, d] {
                // exact integer form of p >= 0.9 * d
                let expected = 10 * u64::from(p) >= 9 * u64::from(d);
                assert_eq!(is_completed(f64::from(p), d), expected, "p={p} d={d}");
            }
        }
    }

    #[test]
    fn position_is_floored_but_completion_uses_raw_value() {
        let pos = PlaybackPosition::new(539.7, 599).unwrap();
        assert_eq!(pos.last_position_seconds(), 539);
        assert!(pos.completed());
    }

    #[test]
    fn rejects_negative_position_and_zero_duration() {
        assert_eq!(
            PlaybackPosition::new(-1.0, 10).unwrap_err(),
            ProgressError::InvalidPosition(-1.0)
        );
        assert!(PlaybackPosition::new(f64::NAN, 10).is_err());
        assert_eq!(
            PlaybackPosition::new(1.0, 0).unwrap_err(),
            ProgressError::ZeroDuration
        );
    }

    #[test]
    fn replacement_keeps_identity() {
        let user = UserId::generate();
        let video = VideoId::generate();
        let first = WatchProgress::record(
            ProgressId::generate(),
            user,
            video,
            PlaybackPosition::new(10.0, 100).unwrap(),
            fixed_now(),
        );
        let later = fixed_now() + chrono::Duration::minutes(3);
        let incoming = WatchProgress::record(
            ProgressId::generate(),
            user,
            video,
            PlaybackPosition::new(95.0, 100).unwrap(),
            later,
        );
        let merged = first.replaced_with(&incoming);
        assert_eq!(merged.id(), first.id());
        assert_eq!(merged.created_at(), fixed_now());
        assert_eq!(merged.watched_at(), later);
        assert!(merged.completed());
    }

    #[test]
    fn lesson_progress_counts_completed_videos_of_the_lesson() {
        let lesson = LessonId::generate();
        let user = UserId::generate();
        let draft = VideoDraft {
            title: "v".into(),
            video_url: "https://example.com/v.mp4".into(),
            duration_seconds: 100,
            ..VideoDraft::default()
        };
        let a = Video::new(VideoId::generate(), lesson, &draft, 0, fixed_now()).unwrap();
        let b = Video::new(VideoId::generate(), lesson, &draft, 1, fixed_now()).unwrap();
        let stray = VideoId::generate();

        let row = |video, pos| {
            WatchProgress::record(
                ProgressId::generate(),
                user,
                video,
                PlaybackPosition::new(pos, 100).unwrap(),
                fixed_now(),
            )
        };
        let progress = LessonProgress::collect(
            &[a.clone(), b.clone()],
            vec![row(a.id(), 95.0), row(b.id(), 10.0), row(stray, 100.0)],
        );

        assert_eq!(progress.completed_count(), 1);
        assert_eq!(progress.started_count(), 2);
        assert!(progress.is_completed(a.id()));
        assert!(!progress.is_completed(b.id()));
        assert!(progress.get(stray).is_none());
    }
}
