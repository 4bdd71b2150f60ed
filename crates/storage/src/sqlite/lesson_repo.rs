use lessons_core::model::{Lesson, LessonId, UserId};

use super::SqliteRepository;
use super::mapping::{bool_to_i64, db_err, map_lesson_row};
use crate::repository::{LessonOrder, LessonRepository, StorageError};

const LESSON_COLUMNS: &str = "id, title, description, cover_image_url, teacher_id, order_index, \
                              is_published, created_at, updated_at";

fn order_clause(order: LessonOrder) -> &'static str {
    match order {
        LessonOrder::Newest => "ORDER BY created_at DESC",
        LessonOrder::Curriculum => "ORDER BY order_index ASC, created_at DESC",
    }
}

#[async_trait::async_trait]
impl LessonRepository for SqliteRepository {
    async fn insert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO lessons (id, title, description, cover_image_url, teacher_id, order_index, is_published, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(lesson.id().to_string())
        .bind(lesson.title())
        .bind(lesson.description())
        .bind(lesson.cover_image_url())
        .bind(lesson.teacher_id().to_string())
        .bind(i64::from(lesson.order_index()))
        .bind(bool_to_i64(lesson.is_published()))
        .bind(lesson.created_at())
        .bind(lesson.updated_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE lessons SET
                title = ?2,
                description = ?3,
                cover_image_url = ?4,
                is_published = ?5,
                updated_at = ?6
            WHERE id = ?1
            ",
        )
        .bind(lesson.id().to_string())
        .bind(lesson.title())
        .bind(lesson.description())
        .bind(lesson.cover_image_url())
        .bind(bool_to_i64(lesson.is_published()))
        .bind(lesson.updated_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        let sql = format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(map_lesson_row).transpose()
    }

    async fn list_published_lessons(
        &self,
        order: LessonOrder,
        limit: Option<u32>,
    ) -> Result<Vec<Lesson>, StorageError> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map_or(-1, i64::from);
        let sql = format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE is_published = 1 {} LIMIT ?1",
            order_clause(order)
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter().map(map_lesson_row).collect()
    }

    async fn list_lessons_by_teacher(
        &self,
        teacher_id: UserId,
    ) -> Result<Vec<Lesson>, StorageError> {
        let sql = format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE teacher_id = ?1 {}",
            order_clause(LessonOrder::Newest)
        );
        let rows = sqlx::query(&sql)
            .bind(teacher_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter().map(map_lesson_row).collect()
    }

    async fn delete_lesson(&self, id: LessonId) -> Result<(), StorageError> {
        // Videos and their progress rows go with it through ON DELETE CASCADE.
        let res = sqlx::query("DELETE FROM lessons WHERE id = ?1")
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
