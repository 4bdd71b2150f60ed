use super::SqliteRepository;
use super::mapping::{db_err, map_credential_row};
use crate::repository::{CredentialRecord, CredentialRepository, StorageError};

#[async_trait::async_trait]
impl CredentialRepository for SqliteRepository {
    async fn insert_credential(&self, record: &CredentialRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO credentials (email, user_id, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(record.email.to_lowercase())
        .bind(record.user_id.to_string())
        .bind(&record.password_hash)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn find_credential(&self, email: &str) -> Result<Option<CredentialRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT email, user_id, password_hash, created_at
            FROM credentials WHERE email = ?1
            ",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_credential_row).transpose()
    }
}
