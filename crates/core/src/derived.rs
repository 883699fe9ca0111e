//! Denormalized asset fields recomputed by the write path.
//!
//! Format flags, the format list used by the `format` filter, the search text
//! and the viewer-compatibility flag are all derived from an asset's formats,
//! tags and owner. None of them is authoritative on its own; every write that
//! touches formats, tags or metadata calls [`compute_derived_fields`] and
//! persists the result. Rank is not part of this set: the store recomputes it
//! from the live counters whenever it writes these columns.

use serde::Serialize;

use crate::catalog::{
    BLOCKS_VIEWABLE_TYPES, FORMAT_BLOCKS, FORMAT_FBX, FORMAT_GLTF1, FORMAT_GLTF2, FORMAT_OBJ,
    FORMAT_TILT, VIEWABLE_ROLES,
};
use crate::formats::FormatEntry;

/// Asset attributes the derived fields are computed from.
#[derive(Debug, Clone)]
pub struct DerivedInputs<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub owner_display_name: &'a str,
    pub tags: &'a [String],
    pub formats: &'a [FormatEntry],
}

/// One entry of the denormalized format list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatListEntry {
    pub format: String,
}

/// The full set of derived columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedFields {
    pub has_tilt: bool,
    pub has_blocks: bool,
    pub has_gltf1: bool,
    pub has_gltf2: bool,
    pub has_gltf_any: bool,
    pub has_fbx: bool,
    pub has_obj: bool,
    pub formats: Vec<FormatListEntry>,
    pub search_text: String,
    pub is_viewer_compatible: bool,
}

/// Recompute every derived field.
pub fn compute_derived_fields(input: &DerivedInputs<'_>) -> DerivedFields {
    let has = |format_type: &str| input.formats.iter().any(|f| f.format_type == format_type);

    let has_gltf1 = has(FORMAT_GLTF1);
    let has_gltf2 = has(FORMAT_GLTF2);

    DerivedFields {
        has_tilt: has(FORMAT_TILT),
        has_blocks: has(FORMAT_BLOCKS),
        has_gltf1,
        has_gltf2,
        has_gltf_any: has_gltf1 || has_gltf2,
        has_fbx: has(FORMAT_FBX),
        has_obj: has(FORMAT_OBJ),
        formats: input
            .formats
            .iter()
            .map(|f| FormatListEntry {
                format: f.format_type.clone(),
            })
            .collect(),
        search_text: search_text(
            input.name,
            input.description,
            input.tags,
            input.owner_display_name,
        ),
        is_viewer_compatible: is_viewer_compatible(input.formats),
    }
}

/// `"<name> <description> <tags> <owner>"`, with missing parts left empty.
pub fn search_text(
    name: Option<&str>,
    description: Option<&str>,
    tags: &[String],
    owner_display_name: &str,
) -> String {
    format!(
        "{} {} {} {}",
        name.unwrap_or_default(),
        description.unwrap_or_default(),
        tags.join(" "),
        owner_display_name
    )
}

/// Blocks assets are only viewable once a Polygone conversion of a
/// displayable type exists. Everything else is compatible.
pub fn is_viewer_compatible(formats: &[FormatEntry]) -> bool {
    let is_blocks = formats.iter().any(|f| f.format_type == FORMAT_BLOCKS);
    if !is_blocks {
        return true;
    }
    formats.iter().any(|f| {
        BLOCKS_VIEWABLE_TYPES.contains(&f.format_type.as_str())
            && f.role.is_some_and(|r| VIEWABLE_ROLES.contains(&r))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::tests::{format, stored};

    fn inputs<'a>(formats: &'a [FormatEntry], tags: &'a [String]) -> DerivedInputs<'a> {
        DerivedInputs {
            name: Some("Rocket"),
            description: None,
            owner_display_name: "Ada",
            tags,
            formats,
        }
    }

    #[test]
    fn flags_follow_attached_formats() {
        let formats = vec![
            format(1, "GLTF", None, vec![]),
            format(2, "OBJ", None, vec![]),
            format(3, "TILT", None, vec![]),
        ];
        let input = inputs(&formats, &[]);
        let derived = compute_derived_fields(&input);

        assert!(derived.has_gltf1);
        assert!(!derived.has_gltf2);
        assert!(derived.has_gltf_any);
        assert!(derived.has_obj);
        assert!(derived.has_tilt);
        assert!(!derived.has_fbx);
        assert!(!derived.has_blocks);
        assert_eq!(
            derived.formats,
            vec![
                FormatListEntry { format: "GLTF".into() },
                FormatListEntry { format: "OBJ".into() },
                FormatListEntry { format: "TILT".into() },
            ]
        );
    }

    #[test]
    fn format_list_serializes_for_containment_queries() {
        let formats = vec![format(1, "GLB", None, vec![])];
        let input = inputs(&formats, &[]);
        let derived = compute_derived_fields(&input);
        assert_eq!(
            serde_json::to_value(&derived.formats).unwrap(),
            serde_json::json!([{"format": "GLB"}])
        );
    }

    #[test]
    fn search_text_joins_parts() {
        let tags = vec!["space".to_string(), "sci-fi".to_string()];
        assert_eq!(
            search_text(Some("Rocket"), Some("big"), &tags, "Ada"),
            "Rocket big space sci-fi Ada"
        );
        assert_eq!(search_text(Some("Rocket"), None, &[], "Ada"), "Rocket   Ada");
    }

    #[test]
    fn non_blocks_assets_are_compatible() {
        let formats = vec![format(1, "OBJ", None, vec![])];
        assert!(is_viewer_compatible(&formats));
        assert!(is_viewer_compatible(&[]));
    }

    #[test]
    fn blocks_needs_viewable_conversion() {
        let blocks_only = vec![
            format(1, "BLOCKS", Some(7), vec![]),
            format(2, "OBJ", Some(1), vec![]),
        ];
        assert!(!is_viewer_compatible(&blocks_only));

        let converted = vec![
            format(1, "BLOCKS", Some(7), vec![]),
            format(2, "GLTF2", Some(1003), vec![stored(20, true, "icosa/a.gltf")]),
        ];
        assert!(is_viewer_compatible(&converted));
    }
}
