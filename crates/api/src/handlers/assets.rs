//! Handlers for the asset catalog.
//!
//! Reads are open to anonymous callers and respect the visibility policy:
//! an asset the caller may not see is reported exactly like a missing one.
//! Mutations require a bearer token and, except for views and likes,
//! ownership of the asset.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use indexmap::IndexMap;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use gallery_core::access::{ensure_owner, ensure_visible};
use gallery_core::catalog::{role_label, validate_role, Visibility};
use gallery_core::downloads::{build_download_bundles, primary_download_url, DownloadBundle};
use gallery_core::error::CoreError;
use gallery_core::formats::{
    resolve_preferred_viewer_format, FormatEntry, ResourceEntry, ResourceLocation,
};
use gallery_core::query::build_asset_query;
use gallery_core::storage::{hide_files, user_media_files, BlobStorage};
use gallery_core::types::{DbId, Timestamp};
use gallery_db::models::asset::{AssetWithOwner, CreateAsset, UpdateAsset};
use gallery_db::models::format::CreateFormat;
use gallery_db::repositories::{AssetRepo, FormatRepo, TagRepo};

use crate::error::AppResult;
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::query::ListAssetsParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// A resource as exposed by the catalog, with a fetchable URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    pub relative_path: Option<String>,
    pub url: Option<String>,
    pub content_type: Option<String>,
}

/// A format as exposed by the catalog.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatResponse {
    pub id: DbId,
    pub format_type: String,
    pub role: Option<i32>,
    pub role_label: Option<&'static str>,
    pub archive_url: Option<String>,
    pub triangle_count: Option<i32>,
    pub lod_hint: Option<i32>,
    pub root: Option<ResourceResponse>,
    pub resources: Vec<ResourceResponse>,
}

/// The format a viewer should load.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerFormatResponse {
    pub format_type: String,
    pub role: Option<i32>,
    pub url: Option<String>,
    pub content_type: Option<String>,
}

/// Public identity of an asset's owner.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub url: String,
    pub display_name: String,
}

/// A fully decorated catalog asset.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    pub asset_id: DbId,
    pub url: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub owner: OwnerResponse,
    pub visibility: String,
    pub is_curated: bool,
    pub license: Option<String>,
    pub category: Option<String>,
    pub state: String,
    pub tags: Vec<String>,
    pub likes: i64,
    pub views: i64,
    pub downloads: i64,
    pub rank: f64,
    pub thumbnail: Option<String>,
    pub presentation_params: Option<serde_json::Value>,
    pub is_viewer_compatible: bool,
    pub formats: Vec<FormatResponse>,
    pub preferred_viewer_format: Option<ViewerFormatResponse>,
    pub download_bundles: IndexMap<&'static str, DownloadBundle>,
    pub primary_download_url: Option<String>,
    pub create_time: Timestamp,
    pub update_time: Timestamp,
}

/// Counters after a view or like.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountersResponse {
    pub asset_id: DbId,
    pub likes: i64,
    pub views: i64,
    pub rank: f64,
}

/// Result of a like request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    /// False when the caller had already liked the asset.
    pub liked: bool,
    #[serde(flatten)]
    pub counters: CountersResponse,
}

fn resource_url(storage: &dyn BlobStorage, resource: &ResourceEntry) -> Option<String> {
    match resource.location()? {
        ResourceLocation::Stored(name) => Some(storage.public_url(name)),
        ResourceLocation::External(url) => Some(url.to_string()),
    }
}

fn present_resource(storage: &dyn BlobStorage, resource: &ResourceEntry) -> ResourceResponse {
    ResourceResponse {
        relative_path: resource.relative_path().map(str::to_string),
        url: resource_url(storage, resource),
        content_type: resource.content_type.clone(),
    }
}

fn present_format(storage: &dyn BlobStorage, format: &FormatEntry) -> FormatResponse {
    FormatResponse {
        id: format.id,
        format_type: format.format_type.clone(),
        role: format.role,
        role_label: format.role.and_then(role_label),
        archive_url: format.archive_url.clone(),
        triangle_count: format.triangle_count,
        lod_hint: format.lod_hint,
        root: format.root_resource().map(|r| present_resource(storage, r)),
        resources: format
            .supporting_resources()
            .map(|r| present_resource(storage, r))
            .collect(),
    }
}

/// Decorate an asset row with its formats, viewer format and downloads.
fn present_asset(
    state: &AppState,
    row: AssetWithOwner,
    formats: &[FormatEntry],
    tags: Vec<String>,
) -> AssetResponse {
    let storage = state.storage.as_ref();
    let catalog = state.catalog.as_ref();
    let asset = row.asset;

    let preferred_viewer_format =
        resolve_preferred_viewer_format(formats).map(|viewer| ViewerFormatResponse {
            format_type: viewer.format.format_type.clone(),
            role: viewer.format.role,
            url: resource_url(storage, viewer.root),
            content_type: viewer.root.content_type.clone(),
        });
    let license = asset.license();

    AssetResponse {
        asset_id: asset.id,
        display_name: asset.name,
        description: asset.description,
        owner: OwnerResponse {
            url: row.owner_url,
            display_name: row.owner_display_name,
        },
        visibility: asset.visibility,
        is_curated: asset.curated,
        category: asset.category,
        state: asset.state,
        tags,
        likes: asset.likes,
        views: asset.views,
        downloads: asset.downloads,
        rank: asset.rank,
        thumbnail: asset
            .thumbnail
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| storage.public_url(t)),
        presentation_params: asset.presentation_params,
        is_viewer_compatible: asset.is_viewer_compatible,
        formats: formats.iter().map(|f| present_format(storage, f)).collect(),
        preferred_viewer_format,
        download_bundles: build_download_bundles(formats, catalog),
        primary_download_url: primary_download_url(license, Some(&asset.url), formats, catalog),
        license: asset.license,
        url: asset.url,
        create_time: asset.created_at,
        update_time: asset.updated_at,
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Load an asset the viewer may see, or fail with "not found".
async fn load_visible(
    state: &AppState,
    id: DbId,
    viewer: Option<DbId>,
) -> AppResult<AssetWithOwner> {
    let row = AssetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Asset", id))?;
    ensure_visible(row.asset.visibility()?, row.asset.owner_id, viewer, id)?;
    Ok(row)
}

/// Load an asset for mutation by `user_id`.
///
/// Invisible assets are "not found"; visible assets owned by someone else
/// are "forbidden".
async fn load_owned(state: &AppState, id: DbId, user_id: DbId) -> AppResult<AssetWithOwner> {
    let row = load_visible(state, id, Some(user_id)).await?;
    ensure_owner(row.asset.owner_id, user_id)?;
    Ok(row)
}

async fn present_one(state: &AppState, row: AssetWithOwner) -> AppResult<AssetResponse> {
    let formats = FormatRepo::list_for_asset(&state.pool, row.asset.id).await?;
    let tags = TagRepo::names_for_asset(&state.pool, row.asset.id).await?;
    Ok(present_asset(state, row, &formats, tags))
}

async fn counters(state: &AppState, id: DbId) -> AppResult<CountersResponse> {
    let row = AssetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Asset", id))?;
    Ok(CountersResponse {
        asset_id: id,
        likes: row.asset.likes,
        views: row.asset.views,
        rank: row.asset.rank,
    })
}

// ---------------------------------------------------------------------------
// Catalog reads
// ---------------------------------------------------------------------------

/// GET /api/v1/assets
///
/// Public assets matching the filters, one page at a time.
pub async fn list_assets(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<impl IntoResponse> {
    let params = ListAssetsParams::from_pairs(&pairs);
    let predicate = build_asset_query(&params.filters, &state.catalog);

    let (rows, total) =
        AssetRepo::list(&state.pool, &predicate, params.order, &params.page).await?;

    let ids: Vec<DbId> = rows.iter().map(|r| r.asset.id).collect();
    let mut formats = FormatRepo::list_for_assets(&state.pool, &ids).await?;
    let mut tags: HashMap<DbId, Vec<String>> =
        TagRepo::names_for_assets(&state.pool, &ids).await?;

    let assets = rows
        .into_iter()
        .map(|row| {
            let id = row.asset.id;
            let asset_formats = formats.remove(&id).unwrap_or_default();
            let asset_tags = tags.remove(&id).unwrap_or_default();
            present_asset(&state, row, &asset_formats, asset_tags)
        })
        .collect();

    tracing::debug!(total, page_token = params.page.page_token, "Listed assets");

    Ok(Json(params.page.paginate(assets, total)))
}

/// GET /api/v1/assets/id/{id}
pub async fn get_asset(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let row = load_visible(&state, id, viewer.user_id()).await?;
    Ok(Json(present_one(&state, row).await?))
}

/// GET /api/v1/assets/{owner_url}/{asset_url}
pub async fn get_asset_by_urls(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path((owner_url, asset_url)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let key = format!("{owner_url}/{asset_url}");
    let row = AssetRepo::find_by_urls(&state.pool, &owner_url, &asset_url)
        .await?
        .ok_or_else(|| CoreError::not_found("Asset", &key))?;
    ensure_visible(
        row.asset.visibility()?,
        row.asset.owner_id,
        viewer.user_id(),
        &key,
    )?;
    Ok(Json(present_one(&state, row).await?))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/v1/assets
///
/// Create a BARE asset owned by the caller. Derived fields stay at their
/// defaults until formats are attached.
pub async fn create_asset(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAsset>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let url = input
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

    let asset = AssetRepo::create(&state.pool, auth.user_id, &url, &input).await?;

    tracing::info!(asset_id = asset.id, user_id = auth.user_id, url = %asset.url, "Asset created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: asset })))
}

/// PATCH /api/v1/assets/id/{id}
pub async fn update_asset(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAsset>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let row = load_owned(&state, id, auth.user_id).await?;

    if let (Some(current), Some(next)) = (row.asset.license(), input.license) {
        if !current.allows_change_to(next) {
            return Err(CoreError::Validation(format!(
                "License {current} cannot be changed to {next}"
            ))
            .into());
        }
    }

    AssetRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Asset", id))?;
    let asset = AssetRepo::refresh_derived(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Asset", id))?;

    tracing::info!(asset_id = id, user_id = auth.user_id, "Asset updated");

    Ok(Json(DataResponse { data: asset }))
}

/// PATCH /api/v1/assets/id/{id}/unpublish
pub async fn unpublish_asset(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_owned(&state, id, auth.user_id).await?;

    if !AssetRepo::set_visibility(&state.pool, id, Visibility::Private).await? {
        return Err(CoreError::not_found("Asset", id).into());
    }
    let asset = AssetRepo::refresh_derived(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Asset", id))?;

    tracing::info!(asset_id = id, user_id = auth.user_id, "Asset unpublished");

    Ok(Json(DataResponse { data: asset }))
}

/// DELETE /api/v1/assets/id/{id}
///
/// Hide the owner's uploaded media, log each hidden file, then delete the
/// asset row.
pub async fn delete_asset(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let row = load_owned(&state, id, auth.user_id).await?;

    let formats = FormatRepo::list_for_asset(&state.pool, id).await?;
    let files = user_media_files(
        row.asset.thumbnail.as_deref(),
        &formats,
        &state.catalog.user_media_prefix,
    );
    let hidden = hide_files(state.storage.as_ref(), &files).await?;

    if !AssetRepo::delete_with_hidden_media(&state.pool, id, &hidden).await? {
        return Err(CoreError::not_found("Asset", id).into());
    }

    tracing::info!(
        asset_id = id,
        user_id = auth.user_id,
        hidden_files = hidden.len(),
        "Asset deleted",
    );

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/assets/id/{id}/formats
///
/// Attach a format with its resources, then refresh derived fields.
pub async fn attach_format(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateFormat>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if let Some(role) = input.role {
        validate_role(role)?;
    }
    load_owned(&state, id, auth.user_id).await?;

    let format = FormatRepo::create(&state.pool, id, &input).await?;
    AssetRepo::refresh_derived(&state.pool, id).await?;

    tracing::info!(
        asset_id = id,
        format_id = format.id,
        format_type = %format.format_type,
        "Format attached",
    );

    let data = present_format(state.storage.as_ref(), &format);
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// POST /api/v1/assets/id/{id}/views
pub async fn record_view(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let row = load_visible(&state, id, viewer.user_id()).await?;

    let (views, rank) = AssetRepo::increment_view_and_rank(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Asset", id))?;

    Ok(Json(DataResponse {
        data: CountersResponse {
            asset_id: id,
            likes: row.asset.likes,
            views,
            rank,
        },
    }))
}

/// POST /api/v1/assets/id/{id}/likes
///
/// Record the caller's like. Liking twice is a no-op.
pub async fn like_asset(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_visible(&state, id, Some(auth.user_id)).await?;

    let liked = AssetRepo::like(&state.pool, auth.user_id, id).await?;
    if liked {
        tracing::info!(asset_id = id, user_id = auth.user_id, "Asset liked");
    }

    let counters = counters(&state, id).await?;
    Ok(Json(DataResponse {
        data: LikeResponse { liked, counters },
    }))
}
