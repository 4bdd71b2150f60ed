use lessons_core::model::{UserId, VideoId, WatchProgress};

use super::SqliteRepository;
use super::mapping::{bool_to_i64, db_err, map_progress_row};
use crate::repository::{StorageError, WatchProgressRepository};

#[async_trait::async_trait]
impl WatchProgressRepository for SqliteRepository {
    async fn upsert_progress(
        &self,
        progress: &WatchProgress,
    ) -> Result<WatchProgress, StorageError> {
        let row = sqlx::query(
            r"
            INSERT INTO watch_progress (id, user_id, video_id, last_position_seconds, completed, watched_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id, video_id) DO UPDATE SET
                last_position_seconds = excluded.last_position_seconds,
                completed = excluded.completed,
                watched_at = excluded.watched_at
            RETURNING id, user_id, video_id, last_position_seconds, completed, watched_at, created_at
            ",
        )
        .bind(progress.id().to_string())
        .bind(progress.user_id().to_string())
        .bind(progress.video_id().to_string())
        .bind(i64::from(progress.last_position_seconds()))
        .bind(bool_to_i64(progress.completed()))
        .bind(progress.watched_at())
        .bind(progress.created_at())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        map_progress_row(&row)
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<Option<WatchProgress>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, video_id, last_position_seconds, completed, watched_at, created_at
            FROM watch_progress
            WHERE user_id = ?1 AND video_id = ?2
            ",
        )
        .bind(user_id.to_string())
        .bind(video_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn list_progress_for_videos(
        &self,
        user_id: UserId,
        video_ids: &[VideoId],
    ) -> Result<Vec<WatchProgress>, StorageError> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            r"
            SELECT id, user_id, video_id, last_position_seconds, completed, watched_at, created_at
            FROM watch_progress
            WHERE user_id = ?1 AND video_id IN (
            ",
        );
        for i in 0..video_ids.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 2).to_string());
        }
        sql.push(')');

        let mut query = sqlx::query(&sql).bind(user_id.to_string());
        for id in video_ids {
            query = query.bind(id.to_string());
        }

        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;

        rows.iter().map(map_progress_row).collect()
    }
}
