use async_trait::async_trait;
use chrono::Utc;
use quiz_core::model::CountryCode;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{decode_codes, encode_codes};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_set(&self, key: &str) -> Result<Option<Vec<CountryCode>>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT codes
            FROM progress_sets
            WHERE key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row
            .try_get("codes")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        decode_codes(&raw).map(Some)
    }

    async fn save_set(&self, key: &str, codes: &[CountryCode]) -> Result<(), StorageError> {
        let encoded = encode_codes(codes)?;

        sqlx::query(
            r"
            INSERT INTO progress_sets (key, codes, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                codes = excluded.codes,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(encoded)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn clear_set(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM progress_sets WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
