//! Repository for the `hidden_media_files` log.

use gallery_core::types::DbId;
use sqlx::PgPool;

use crate::models::hidden_media::HiddenMediaFile;

/// Column list for `hidden_media_files` queries.
const COLUMNS: &str = "id, original_asset_id, file_name, deleted_from_source, created_at, updated_at";

/// Provides access to the hidden-media log.
pub struct HiddenMediaRepo;

impl HiddenMediaRepo {
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<HiddenMediaFile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hidden_media_files WHERE id = $1");
        sqlx::query_as::<_, HiddenMediaFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Log entries for the files of a deleted asset.
    pub async fn list_for_asset(
        pool: &PgPool,
        original_asset_id: DbId,
    ) -> Result<Vec<HiddenMediaFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM hidden_media_files WHERE original_asset_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, HiddenMediaFile>(&query)
            .bind(original_asset_id)
            .fetch_all(pool)
            .await
    }

    /// Flag an entry whose file no longer exists in storage.
    pub async fn mark_deleted_from_source(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<HiddenMediaFile>, sqlx::Error> {
        let query = format!(
            "UPDATE hidden_media_files SET deleted_from_source = true \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HiddenMediaFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
