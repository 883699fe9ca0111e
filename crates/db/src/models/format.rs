//! Geometry formats and their resources.

use gallery_core::formats::{FormatEntry, ResourceEntry};
use gallery_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `formats` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Format {
    pub id: DbId,
    pub asset_id: DbId,
    pub format_type: String,
    pub role: Option<i32>,
    pub archive_url: Option<String>,
    pub triangle_count: Option<i32>,
    pub lod_hint: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `resources` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Resource {
    pub id: DbId,
    pub format_id: DbId,
    pub is_root: bool,
    pub file_path: Option<String>,
    pub external_url: Option<String>,
    pub content_type: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Resource {
    pub fn into_entry(self) -> ResourceEntry {
        ResourceEntry {
            id: self.id,
            is_root: self.is_root,
            file_path: self.file_path,
            external_url: self.external_url,
            content_type: self.content_type,
        }
    }
}

impl Format {
    /// Combine a format row with its resources, in insertion order.
    pub fn into_entry(self, resources: Vec<Resource>) -> FormatEntry {
        FormatEntry {
            id: self.id,
            format_type: self.format_type,
            role: self.role,
            archive_url: self.archive_url,
            triangle_count: self.triangle_count,
            lod_hint: self.lod_hint,
            resources: resources.into_iter().map(Resource::into_entry).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for attaching a format, with its resources, to an asset.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormat {
    #[validate(length(min = 1, max = 32))]
    pub format_type: String,
    pub role: Option<i32>,
    #[validate(length(max = 2048))]
    pub archive_url: Option<String>,
    #[validate(range(min = 0))]
    pub triangle_count: Option<i32>,
    #[validate(range(min = 0))]
    pub lod_hint: Option<i32>,
    #[serde(default)]
    #[validate(nested)]
    pub resources: Vec<CreateResource>,
}

/// DTO for one resource of a new format.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateResource {
    #[serde(default)]
    pub is_root: bool,
    #[validate(length(min = 1, max = 1024))]
    pub file_path: Option<String>,
    #[validate(url)]
    pub external_url: Option<String>,
    #[validate(length(max = 255))]
    pub content_type: Option<String>,
}
