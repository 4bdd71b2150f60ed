use lessons_core::model::{LessonId, Video, VideoId};

use super::SqliteRepository;
use super::mapping::{db_err, map_video_row};
use crate::repository::{StorageError, VideoRepository};

#[async_trait::async_trait]
impl VideoRepository for SqliteRepository {
    async fn insert_video(&self, video: &Video) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO videos (id, lesson_id, title, description, video_url, duration_seconds, order_index, thumbnail_url, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
        )
        .bind(video.id().to_string())
        .bind(video.lesson_id().to_string())
        .bind(video.title())
        .bind(video.description())
        .bind(video.video_url())
        .bind(i64::from(video.duration_seconds()))
        .bind(i64::from(video.order_index()))
        .bind(video.thumbnail_url())
        .bind(video.created_at())
        .bind(video.updated_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_video(&self, id: VideoId) -> Result<Option<Video>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, lesson_id, title, description, video_url, duration_seconds, order_index, thumbnail_url, created_at, updated_at
            FROM videos WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_video_row).transpose()
    }

    async fn list_videos_for_lesson(
        &self,
        lesson_id: LessonId,
    ) -> Result<Vec<Video>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, lesson_id, title, description, video_url, duration_seconds, order_index, thumbnail_url, created_at, updated_at
            FROM videos
            WHERE lesson_id = ?1
            ORDER BY order_index ASC
            ",
        )
        .bind(lesson_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_video_row).collect()
    }

    async fn count_videos_for_lesson(&self, lesson_id: LessonId) -> Result<u32, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE lesson_id = ?1")
            .bind(lesson_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        u32::try_from(count).map_err(|_| StorageError::Serialization("count overflow".into()))
    }

    async fn next_video_order_index(&self, lesson_id: LessonId) -> Result<i32, StorageError> {
        let max: Option<i64> =
            sqlx::query_scalar("SELECT MAX(order_index) FROM videos WHERE lesson_id = ?1")
                .bind(lesson_id.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;
        let next = max.map_or(0, |m| m + 1);
        i32::try_from(next).map_err(|_| StorageError::Serialization("order_index overflow".into()))
    }

    async fn delete_video(&self, id: VideoId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM videos WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
