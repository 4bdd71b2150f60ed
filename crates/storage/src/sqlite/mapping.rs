use std::str::FromStr;

use chrono::{DateTime, Utc};
use lessons_core::model::{
    Lesson, LessonId, Profile, ProgressId, Role, UserId, Video, VideoId, WatchProgress,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{CredentialRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Unique and foreign key violations carry meaning for callers; everything
/// else is a connection problem.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
        if db.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
    }
    StorageError::Connection(e.to_string())
}

fn parse_id<T>(row: &SqliteRow, column: &str) -> Result<T, StorageError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    row.try_get::<String, _>(column)
        .map_err(ser)?
        .parse::<T>()
        .map_err(ser)
}

fn u32_column(row: &SqliteRow, column: &'static str) -> Result<u32, StorageError> {
    let raw: i64 = row.try_get(column).map_err(ser)?;
    u32::try_from(raw).map_err(|_| StorageError::Serialization(format!("invalid {column}: {raw}")))
}

fn i32_column(row: &SqliteRow, column: &'static str) -> Result<i32, StorageError> {
    let raw: i64 = row.try_get(column).map_err(ser)?;
    i32::try_from(raw).map_err(|_| StorageError::Serialization(format!("invalid {column}: {raw}")))
}

pub(crate) fn bool_to_i64(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn map_profile_row(row: &SqliteRow) -> Result<Profile, StorageError> {
    let role: Role = row
        .try_get::<String, _>("role")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    Ok(Profile::from_persisted(
        parse_id::<UserId>(row, "id")?,
        row.try_get("email").map_err(ser)?,
        row.try_get("full_name").map_err(ser)?,
        role,
        row.try_get("grade").map_err(ser)?,
        row.try_get::<DateTime<Utc>, _>("created_at").map_err(ser)?,
        row.try_get::<DateTime<Utc>, _>("updated_at").map_err(ser)?,
    ))
}

pub(crate) fn map_lesson_row(row: &SqliteRow) -> Result<Lesson, StorageError> {
    Lesson::from_persisted(
        parse_id::<LessonId>(row, "id")?,
        row.try_get("title").map_err(ser)?,
        row.try_get("description").map_err(ser)?,
        row.try_get("cover_image_url").map_err(ser)?,
        parse_id::<UserId>(row, "teacher_id")?,
        i32_column(row, "order_index")?,
        row.try_get::<i64, _>("is_published").map_err(ser)? != 0,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_video_row(row: &SqliteRow) -> Result<Video, StorageError> {
    Video::from_persisted(
        parse_id::<VideoId>(row, "id")?,
        parse_id::<LessonId>(row, "lesson_id")?,
        row.try_get("title").map_err(ser)?,
        row.try_get("description").map_err(ser)?,
        row.try_get("video_url").map_err(ser)?,
        u32_column(row, "duration_seconds")?,
        i32_column(row, "order_index")?,
        row.try_get("thumbnail_url").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<WatchProgress, StorageError> {
    Ok(WatchProgress::from_persisted(
        parse_id::<ProgressId>(row, "id")?,
        parse_id::<UserId>(row, "user_id")?,
        parse_id::<VideoId>(row, "video_id")?,
        u32_column(row, "last_position_seconds")?,
        row.try_get::<i64, _>("completed").map_err(ser)? != 0,
        row.try_get("watched_at").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    ))
}

pub(crate) fn map_credential_row(row: &SqliteRow) -> Result<CredentialRecord, StorageError> {
    Ok(CredentialRecord {
        user_id: parse_id::<UserId>(row, "user_id")?,
        email: row.try_get("email").map_err(ser)?,
        password_hash: row.try_get("password_hash").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}
