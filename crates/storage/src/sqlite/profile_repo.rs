use lessons_core::model::{Profile, Role, UserId};

use super::SqliteRepository;
use super::mapping::{db_err, map_profile_row};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO profiles (id, email, full_name, role, grade, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(profile.id().to_string())
        .bind(profile.email())
        .bind(profile.full_name())
        .bind(profile.role().as_str())
        .bind(profile.grade())
        .bind(profile.created_at())
        .bind(profile.updated_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_profile(&self, id: UserId) -> Result<Option<Profile>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, email, full_name, role, grade, created_at, updated_at
            FROM profiles WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_profile_row).transpose()
    }

    async fn count_profiles_by_role(&self, role: Role) -> Result<u32, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE role = ?1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        u32::try_from(count).map_err(|_| StorageError::Serialization("count overflow".into()))
    }
}
