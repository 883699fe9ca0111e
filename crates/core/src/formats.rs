//! Geometry formats attached to an asset and the viewer-format resolver.
//!
//! The repository layer loads an asset's formats with their resources and
//! hands them over as [`FormatEntry`] values; nothing here touches storage.

use serde::Serialize;

use crate::catalog::{
    FORMAT_GLB, FORMAT_GLTF1, FORMAT_GLTF2, FORMAT_OBJ, ROLE_ORIGINAL_GLTF, ROLE_POLYGONE_GLB,
    ROLE_POLYGONE_GLTF, ROLE_UPDATED_GLTF,
};
use crate::types::DbId;

/// One file (or external link) belonging to a format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceEntry {
    pub id: DbId,
    /// The primary file of its format.
    pub is_root: bool,
    /// Path of a locally stored file, relative to the storage bucket.
    pub file_path: Option<String>,
    pub external_url: Option<String>,
    pub content_type: Option<String>,
}

/// Where a resource can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation<'a> {
    /// A file held by blob storage, identified by its stored name.
    Stored(&'a str),
    /// A link to somewhere else.
    External(&'a str),
}

impl ResourceEntry {
    /// The stored file when present, otherwise the external URL.
    ///
    /// Empty strings count as absent.
    pub fn location(&self) -> Option<ResourceLocation<'_>> {
        if let Some(path) = non_empty(&self.file_path) {
            return Some(ResourceLocation::Stored(path));
        }
        non_empty(&self.external_url).map(ResourceLocation::External)
    }

    /// The locally stored file path, if any.
    pub fn stored_file(&self) -> Option<&str> {
        non_empty(&self.file_path)
    }

    /// Whether the resource has a locatable file or link.
    pub fn is_locatable(&self) -> bool {
        self.location().is_some()
    }

    /// Last path segment of the file or link.
    pub fn relative_path(&self) -> Option<&str> {
        let full = match self.location()? {
            ResourceLocation::Stored(p) | ResourceLocation::External(p) => p,
        };
        full.rsplit('/').next()
    }
}

/// One encoding of an asset's geometry together with its resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatEntry {
    pub id: DbId,
    pub format_type: String,
    /// Legacy origin classifier.
    pub role: Option<i32>,
    pub archive_url: Option<String>,
    pub triangle_count: Option<i32>,
    pub lod_hint: Option<i32>,
    /// Resources in insertion order.
    pub resources: Vec<ResourceEntry>,
}

impl FormatEntry {
    /// First resource flagged as root.
    pub fn root_resource(&self) -> Option<&ResourceEntry> {
        self.resources.iter().find(|r| r.is_root)
    }

    /// Non-root resources (materials, textures, buffers).
    pub fn supporting_resources(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.resources.iter().filter(|r| !r.is_root)
    }

    /// Archive URL, treating empty strings as absent.
    pub fn archive_url(&self) -> Option<&str> {
        non_empty(&self.archive_url)
    }

    fn has_role_in(&self, roles: &[i32]) -> bool {
        self.role.is_some_and(|r| roles.contains(&r))
    }
}

// ---------------------------------------------------------------------------
// Viewer format resolution
// ---------------------------------------------------------------------------

/// Format types tried when no role-based format applies, best first.
pub const VIEWER_TYPE_PRIORITY: &[&str] = &[FORMAT_GLB, FORMAT_GLTF2, FORMAT_GLTF1, FORMAT_OBJ];

/// Role groups tried before falling back to format types, best first.
const VIEWER_ROLE_PRIORITY: &[&[i32]] = &[
    &[ROLE_POLYGONE_GLB, ROLE_POLYGONE_GLTF],
    &[ROLE_UPDATED_GLTF],
    &[ROLE_ORIGINAL_GLTF],
];

/// The format chosen for the viewer and the root resource it will load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerFormat<'a> {
    pub format: &'a FormatEntry,
    pub root: &'a ResourceEntry,
}

impl<'a> ViewerFormat<'a> {
    /// Location of the root resource. Always present for a resolved format.
    pub fn location(&self) -> Option<ResourceLocation<'a>> {
        self.root.location()
    }
}

/// Pick the single format an asset should be displayed with.
///
/// Role-based conversions win over plain format types: Polygone GLB/glTF,
/// then updated glTF, then original glTF. Failing those, the first of GLB,
/// GLTF2, GLTF and OBJ whose root resource can be located. A format whose
/// root cannot be located counts as absent, so the result is `None` when
/// nothing attached is displayable.
pub fn resolve_preferred_viewer_format(formats: &[FormatEntry]) -> Option<ViewerFormat<'_>> {
    for roles in VIEWER_ROLE_PRIORITY {
        let found = formats
            .iter()
            .filter(|f| f.has_role_in(roles))
            .find_map(locatable_root);
        if found.is_some() {
            return found;
        }
    }

    VIEWER_TYPE_PRIORITY.iter().find_map(|format_type| {
        formats
            .iter()
            .filter(|f| f.format_type == *format_type)
            .find_map(locatable_root)
    })
}

fn locatable_root(format: &FormatEntry) -> Option<ViewerFormat<'_>> {
    format
        .resources
        .iter()
        .find(|r| r.is_root && r.is_locatable())
        .map(|root| ViewerFormat { format, root })
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
