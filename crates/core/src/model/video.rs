use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::model::ids::{LessonId, VideoId};
use crate::model::text::optional_text;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VideoError {
    #[error("video title cannot be empty")]
    EmptyTitle,

    #[error("video url cannot be empty")]
    EmptyUrl,

    #[error("video duration must be > 0 seconds")]
    ZeroDuration,

    #[error("order index must be >= 0")]
    NegativeOrderIndex,
}

/// Video fields as typed into the add-video form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoDraft {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub duration_seconds: u32,
    pub thumbnail_url: String,
}

impl VideoDraft {
    /// Form checks in the order the add-video screen reports them.
    ///
    /// # Errors
    ///
    /// Returns the first failing `VideoError`.
    pub fn check(&self) -> Result<(), VideoError> {
        if self.title.trim().is_empty() {
            return Err(VideoError::EmptyTitle);
        }
        if self.video_url.trim().is_empty() {
            return Err(VideoError::EmptyUrl);
        }
        if self.duration_seconds == 0 {
            return Err(VideoError::ZeroDuration);
        }
        Ok(())
    }
}

/// A playable media reference belonging to exactly one lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    id: VideoId,
    lesson_id: LessonId,
    title: String,
    description: Option<String>,
    video_url: String,
    duration_seconds: u32,
    order_index: i32,
    thumbnail_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Video {
    /// Creates a video appended at `order_index` within its lesson.
    ///
    /// # Errors
    ///
    /// Returns `VideoError` for a blank title or url, a zero duration, or a
    /// negative index. Checks run in that order.
    pub fn new(
        id: VideoId,
        lesson_id: LessonId,
        draft: &VideoDraft,
        order_index: i32,
        now: DateTime<Utc>,
    ) -> Result<Self, VideoError> {
        draft.check()?;
        if order_index < 0 {
            return Err(VideoError::NegativeOrderIndex);
        }
        Ok(Self {
            id,
            lesson_id,
            title: draft.title.trim().to_owned(),
            description: optional_text(&draft.description),
            video_url: draft.video_url.trim().to_owned(),
            duration_seconds: draft.duration_seconds,
            order_index,
            thumbnail_url: optional_text(&draft.thumbnail_url),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a video from storage.
    ///
    /// # Errors
    ///
    /// Returns `VideoError` if persisted values violate video invariants.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: VideoId,
        lesson_id: LessonId,
        title: String,
        description: Option<String>,
        video_url: String,
        duration_seconds: u32,
        order_index: i32,
        thumbnail_url: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, VideoError> {
        if title.trim().is_empty() {
            return Err(VideoError::EmptyTitle);
        }
        if video_url.trim().is_empty() {
            return Err(VideoError::EmptyUrl);
        }
        if duration_seconds == 0 {
            return Err(VideoError::ZeroDuration);
        }
        if order_index < 0 {
            return Err(VideoError::NegativeOrderIndex);
        }
        Ok(Self {
            id,
            lesson_id,
            title,
            description,
            video_url,
            duration_seconds,
            order_index,
            thumbnail_url,
            created_at,
            updated_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> VideoId {
        self.id
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    /// Always > 0.
    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    #[must_use]
    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    #[must_use]
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_seconds)
    }

    #[must_use]
    pub fn embed_url(&self) -> String {
        embed_url(&self.video_url)
    }
}

/// Formats seconds as `m:ss` (minutes are not wrapped into hours).
#[must_use]
pub fn format_duration(seconds: u32) -> String {
    let minutes = seconds / 60;
    let remainder = seconds % 60;
    format!("{minutes}:{remainder:02}")
}

/// Combines the minutes/seconds inputs of the add-video form.
///
/// Each part is read like a lenient integer parse: leading digits count,
/// anything unparsable counts as 0.
#[must_use]
pub fn parse_duration_input(minutes: &str, seconds: &str) -> u32 {
    fn leading_number(raw: &str) -> u32 {
        let digits: String = raw
            .trim()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().unwrap_or(0)
    }

    leading_number(minutes)
        .saturating_mul(60)
        .saturating_add(leading_number(seconds))
}

/// Maps YouTube watch/short links to an autoplaying embed URL.
///
/// Other URLs, and YouTube URLs without a recognizable video id, are returned unchanged.
#[must_use]
pub fn embed_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let video_id = if trimmed.contains("youtu.be") {
        trimmed
            .split("youtu.be/")
            .nth(1)
            .and_then(|rest| rest.split(['?', '&', '#']).next())
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
    } else if trimmed.contains("youtube.com") {
        Url::parse(trimmed).ok().and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
                .filter(|id| !id.is_empty())
        })
    } else {
        None
    };

    match video_id {
        Some(id) => format!("https://www.youtube.com/embed/{id}?autoplay=1&modestbranding=1&rel=0"),
        None => trimmed.to_owned(),
    }
}
