//! Wire shapes of the hosted tables.

use chrono::{DateTime, Utc};
use lessons_core::model::{
    Lesson, LessonId, Profile, ProgressId, Role, UserId, Video, VideoId, WatchProgress,
};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ProfileRow {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub grade: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Profile> for ProfileRow {
    fn from(p: &Profile) -> Self {
        Self {
            id: p.id(),
            email: p.email().to_owned(),
            full_name: p.full_name().to_owned(),
            role: p.role(),
            grade: p.grade().map(ToOwned::to_owned),
            created_at: p.created_at(),
            updated_at: p.updated_at(),
        }
    }
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Profile::from_persisted(
            r.id,
            r.email,
            r.full_name,
            r.role,
            r.grade,
            r.created_at,
            r.updated_at,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct LessonRow {
    pub id: LessonId,
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub teacher_id: UserId,
    pub order_index: i32,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Lesson> for LessonRow {
    fn from(l: &Lesson) -> Self {
        Self {
            id: l.id(),
            title: l.title().to_owned(),
            description: l.description().map(ToOwned::to_owned),
            cover_image_url: l.cover_image_url().map(ToOwned::to_owned),
            teacher_id: l.teacher_id(),
            order_index: l.order_index(),
            is_published: l.is_published(),
            created_at: l.created_at(),
            updated_at: l.updated_at(),
        }
    }
}

impl TryFrom<LessonRow> for Lesson {
    type Error = StorageError;

    fn try_from(r: LessonRow) -> Result<Self, Self::Error> {
        Lesson::from_persisted(
            r.id,
            r.title,
            r.description,
            r.cover_image_url,
            r.teacher_id,
            r.order_index,
            r.is_published,
            r.created_at,
            r.updated_at,
        )
        .map_err(ser)
    }
}

/// Editable lesson columns sent on PATCH.
#[derive(Debug, Serialize)]
pub(crate) struct LessonPatch<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub cover_image_url: Option<&'a str>,
    pub is_published: bool,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Lesson> for LessonPatch<'a> {
    fn from(l: &'a Lesson) -> Self {
        Self {
            title: l.title(),
            description: l.description(),
            cover_image_url: l.cover_image_url(),
            is_published: l.is_published(),
            updated_at: l.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct VideoRow {
    pub id: VideoId,
    pub lesson_id: LessonId,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub duration_seconds: u32,
    pub order_index: i32,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Video> for VideoRow {
    fn from(v: &Video) -> Self {
        Self {
            id: v.id(),
            lesson_id: v.lesson_id(),
            title: v.title().to_owned(),
            description: v.description().map(ToOwned::to_owned),
            video_url: v.video_url().to_owned(),
            duration_seconds: v.duration_seconds(),
            order_index: v.order_index(),
            thumbnail_url: v.thumbnail_url().map(ToOwned::to_owned),
            created_at: v.created_at(),
            updated_at: v.updated_at(),
        }
    }
}

impl TryFrom<VideoRow> for Video {
    type Error = StorageError;

    fn try_from(r: VideoRow) -> Result<Self, Self::Error> {
        Video::from_persisted(
            r.id,
            r.lesson_id,
            r.title,
            r.description,
            r.video_url,
            r.duration_seconds,
            r.order_index,
            r.thumbnail_url,
            r.created_at,
            r.updated_at,
        )
        .map_err(ser)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressRow {
    pub id: ProgressId,
    pub user_id: UserId,
    pub video_id: VideoId,
    pub last_position_seconds: u32,
    pub completed: bool,
    pub watched_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<ProgressRow> for WatchProgress {
    fn from(r: ProgressRow) -> Self {
        WatchProgress::from_persisted(
            r.id,
            r.user_id,
            r.video_id,
            r.last_position_seconds,
            r.completed,
            r.watched_at,
            r.created_at,
        )
    }
}

/// Upsert payload. `id` and `created_at` are left to the column defaults so a
/// merge onto an existing (user, video) row never rewrites them.
#[derive(Debug, Serialize)]
pub(crate) struct ProgressUpsert {
    pub user_id: UserId,
    pub video_id: VideoId,
    pub last_position_seconds: u32,
    pub completed: bool,
    pub watched_at: DateTime<Utc>,
}

impl From<&WatchProgress> for ProgressUpsert {
    fn from(p: &WatchProgress) -> Self {
        Self {
            user_id: p.user_id(),
            video_id: p.video_id(),
            last_position_seconds: p.last_position_seconds(),
            completed: p.completed(),
            watched_at: p.watched_at(),
        }
    }
}

/// Only the column the `next_video_order_index` query selects.
#[derive(Debug, Deserialize)]
pub(crate) struct OrderIndexRow {
    pub order_index: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessons_core::model::{LessonDraft, PlaybackPosition};
    use lessons_core::time::fixed_now;
    use serde_json::json;

    #[test]
    fn lesson_row_decodes_hosted_json() {
        let id = LessonId::generate();
        let teacher = UserId::generate();
        let body = json!({
            "id": id.to_string(),
            "title": "Algebra",
            "description": null,
            "cover_image_url": null,
            "teacher_id": teacher.to_string(),
            "order_index": 2,
            "is_published": true,
            "created_at": "2024-03-01T10:00:00+00:00",
            "updated_at": "2024-03-01T10:00:00.123456+00:00"
        });
        let row: LessonRow = serde_json::from_value(body).unwrap();
        let lesson = Lesson::try_from(row).unwrap();
        assert_eq!(lesson.id(), id);
        assert_eq!(lesson.teacher_id(), teacher);
        assert_eq!(lesson.order_index(), 2);
    }

    #[test]
    fn blank_title_from_backend_is_a_serialization_error() {
        let draft = LessonDraft {
            title: "x".into(),
            ..LessonDraft::default()
        };
        let lesson =
            Lesson::new(LessonId::generate(), UserId::generate(), &draft, fixed_now()).unwrap();
        let mut row = LessonRow::from(&lesson);
        row.title = "  ".into();
        assert!(matches!(
            Lesson::try_from(row),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn upsert_payload_omits_identity_columns() {
        let progress = WatchProgress::record(
            ProgressId::generate(),
            UserId::generate(),
            VideoId::generate(),
            PlaybackPosition::new(42.8, 100).unwrap(),
            fixed_now(),
        );
        let value = serde_json::to_value(ProgressUpsert::from(&progress)).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("created_at").is_none());
        assert_eq!(value["last_position_seconds"], 42);
        assert_eq!(value["completed"], false);
    }
}
