//! Log of stored files hidden when their asset was deleted.

use gallery_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `hidden_media_files` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HiddenMediaFile {
    pub id: DbId,
    /// Id the asset had before deletion.
    pub original_asset_id: DbId,
    pub file_name: String,
    /// Set when a restore found the file gone from storage.
    pub deleted_from_source: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
