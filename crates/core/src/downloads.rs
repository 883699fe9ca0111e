//! Download descriptors offered for an asset, one per legacy role.

use indexmap::IndexMap;
use serde::Serialize;

use crate::catalog::{
    is_downloadable_role, role_label, License, ROLE_ORIGINAL_GLTF, ROLE_POLYGONE_GLTF,
    ROLE_UPDATED_GLTF,
};
use crate::config::{CatalogConfig, GLTF_ZIP_SUPPORTING_TEXT};
use crate::formats::{resolve_preferred_viewer_format, FormatEntry};

/// Marker inserted before `.gltf` in the alternative zip file names.
const GLTF_UPDATED_SUFFIX: &str = "_(GLTFupdated)";

/// How a client should fetch one downloadable format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DownloadBundle {
    /// Archived copy of the format.
    Archive { archive_url: String },
    /// Several stored files the client zips itself, plus renamed copies.
    Zip {
        files_to_zip: Vec<String>,
        files_to_zip_with_suffix: Vec<String>,
        supporting_text: String,
    },
    /// A single file.
    File { file: String },
    /// The format exists but nothing in it can be fetched.
    Empty {},
}

/// Build the download mapping, keyed by role label.
///
/// Only formats with a downloadable role are considered. The first format
/// seen for a role wins; later formats with the same role are ignored.
/// Non-archived original/updated glTF formats are skipped since no safe
/// download path exists for them.
pub fn build_download_bundles(
    formats: &[FormatEntry],
    config: &CatalogConfig,
) -> IndexMap<&'static str, DownloadBundle> {
    let mut bundles = IndexMap::new();

    for format in formats {
        let Some(role) = format.role.filter(|r| is_downloadable_role(*r)) else {
            continue;
        };
        let Some(label) = role_label(role) else {
            continue;
        };
        if bundles.contains_key(label) {
            continue;
        }

        let bundle = if let Some(archive) = format.archive_url() {
            DownloadBundle::Archive {
                archive_url: format!("{}{archive}", config.archive_prefix),
            }
        } else if role == ROLE_POLYGONE_GLTF {
            zip_bundle(format)
        } else if role == ROLE_ORIGINAL_GLTF || role == ROLE_UPDATED_GLTF {
            continue;
        } else {
            single_file_bundle(format, config)
        };

        bundles.insert(label, bundle);
    }

    bundles
}

fn zip_bundle(format: &FormatEntry) -> DownloadBundle {
    let files_to_zip: Vec<String> = format
        .resources
        .iter()
        .filter_map(|r| r.stored_file())
        .map(str::to_string)
        .collect();
    let files_to_zip_with_suffix = files_to_zip.iter().map(|f| gltf_updated_name(f)).collect();

    DownloadBundle::Zip {
        files_to_zip,
        files_to_zip_with_suffix,
        supporting_text: GLTF_ZIP_SUPPORTING_TEXT.to_string(),
    }
}

fn single_file_bundle(format: &FormatEntry, config: &CatalogConfig) -> DownloadBundle {
    let first = format.resources.iter().find(|r| r.is_locatable());
    match first {
        Some(resource) => match (resource.stored_file(), &resource.external_url) {
            (Some(path), _) => DownloadBundle::File {
                file: config.stored_file_url(path),
            },
            (None, Some(url)) => DownloadBundle::File { file: url.clone() },
            (None, None) => DownloadBundle::Empty {},
        },
        None => DownloadBundle::Empty {},
    }
}

/// Rename `dir/model.gltf` to `dir/model_(GLTFupdated).gltf`. Other names
/// are returned unchanged.
pub fn gltf_updated_name(name: &str) -> String {
    match name.strip_suffix(".gltf") {
        Some(stem) => format!("{stem}{GLTF_UPDATED_SUFFIX}.gltf"),
        None => name.to_string(),
    }
}

/// Single "download" link shown on an asset page.
///
/// Absent when the asset has no license or all rights are reserved.
/// Prefers the archived updated glTF, then the archive of the viewer format,
/// then the bundle archive kept next to the user's uploads.
pub fn primary_download_url(
    license: Option<License>,
    asset_url: Option<&str>,
    formats: &[FormatEntry],
    config: &CatalogConfig,
) -> Option<String> {
    if !license?.permits_download() {
        return None;
    }

    let updated_archive = formats
        .iter()
        .filter(|f| f.role == Some(ROLE_UPDATED_GLTF) && f.root_resource().is_some())
        .find_map(FormatEntry::archive_url);
    if let Some(archive) = updated_archive {
        return Some(format!("{}{archive}", config.archive_prefix));
    }

    if let Some(archive) =
        resolve_preferred_viewer_format(formats).and_then(|viewer| viewer.format.archive_url())
    {
        return Some(format!("{}{archive}", config.archive_prefix));
    }

    let asset_url = asset_url.filter(|u| !u.is_empty())?;
    Some(config.stored_file_url(&format!(
        "{}{asset_url}/archive.zip",
        config.user_media_prefix
    )))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
