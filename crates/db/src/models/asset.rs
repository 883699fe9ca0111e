//! Asset rows and DTOs.

use gallery_core::catalog::{AssetState, Category, ColorSpace, License, Visibility};
use gallery_core::error::CoreError;
use gallery_core::rank::RankInputs;
use gallery_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Asset {
    pub id: DbId,
    pub url: String,
    pub owner_id: DbId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub visibility: String,
    pub curated: bool,
    pub license: Option<String>,
    pub category: Option<String>,
    pub state: String,
    pub likes: i64,
    pub views: i64,
    pub downloads: i64,
    pub historical_likes: i64,
    pub historical_views: i64,
    pub rank: f64,
    pub thumbnail: Option<String>,
    pub thumbnail_content_type: Option<String>,
    pub presentation_params: Option<serde_json::Value>,
    pub has_tilt: bool,
    pub has_blocks: bool,
    pub has_gltf1: bool,
    pub has_gltf2: bool,
    pub has_gltf_any: bool,
    pub has_fbx: bool,
    pub has_obj: bool,
    pub formats: serde_json::Value,
    pub search_text: Option<String>,
    pub is_viewer_compatible: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Asset {
    pub fn visibility(&self) -> Result<Visibility, CoreError> {
        Visibility::parse(&self.visibility)
    }

    pub fn state(&self) -> Result<AssetState, CoreError> {
        AssetState::parse(&self.state)
    }

    /// The stored license. Unknown codes read as no license.
    pub fn license(&self) -> Option<License> {
        self.license
            .as_deref()
            .and_then(|code| License::parse(code).ok())
    }

    pub fn rank_inputs(&self) -> RankInputs {
        RankInputs {
            likes: self.likes,
            historical_likes: self.historical_likes,
            views: self.views,
            historical_views: self.historical_views,
        }
    }
}

/// An asset joined with its owner's public identity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub asset: Asset,
    pub owner_url: String,
    pub owner_display_name: String,
}

// ---------------------------------------------------------------------------
// Presentation parameters
// ---------------------------------------------------------------------------

/// Orientation quaternion applied by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// Viewer settings stored as JSON alongside the asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PresentationParams {
    #[validate(length(max = 32))]
    pub background_color: Option<String>,
    pub orienting_rotation: Option<Quaternion>,
    pub color_space: Option<ColorSpace>,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for creating a bare asset owned by the caller.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAsset {
    /// Public url slug; generated when absent.
    #[validate(length(min = 1, max = 255))]
    pub url: Option<String>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 10_000))]
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
    pub license: Option<License>,
    pub category: Option<Category>,
}

/// DTO for patching asset metadata. Only present fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAsset {
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 10_000))]
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
    pub license: Option<License>,
    pub category: Option<Category>,
    pub state: Option<AssetState>,
    #[validate(length(max = 1024))]
    pub thumbnail: Option<String>,
    #[validate(length(max = 255))]
    pub thumbnail_content_type: Option<String>,
    #[validate(nested)]
    pub presentation_params: Option<PresentationParams>,
    /// Replaces the tag set when present.
    #[validate(length(max = 50))]
    pub tags: Option<Vec<String>>,
}
