//! Catalog vocabulary: visibility, lifecycle state, licenses, categories,
//! geometry format types and the legacy resource-role table.
//!
//! Every enum here is stored as its upper-case code in a TEXT column and
//! serialized the same way on the wire.

use crate::error::CoreError;

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = ($code:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $code)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// The code stored in the database and used on the wire.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $code ),+
                }
            }

            /// Human-readable label.
            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Parse a stored code.
            pub fn parse(code: &str) -> Result<Self, CoreError> {
                match code {
                    $( $code => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Unknown {} '{other}'",
                        stringify!($name)
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_text_enum! {
    /// Who may see an asset.
    Visibility {
        Public = ("PUBLIC", "Public"),
        Private = ("PRIVATE", "Private"),
        Unlisted = ("UNLISTED", "Unlisted"),
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Private
    }
}

define_text_enum! {
    /// Upload lifecycle. Transitions are owned by the upload subsystem.
    AssetState {
        Bare = ("BARE", "Bare"),
        Uploading = ("UPLOADING", "Uploading"),
        Complete = ("COMPLETE", "Complete"),
        Failed = ("FAILED", "Failed"),
    }
}

impl Default for AssetState {
    fn default() -> Self {
        AssetState::Bare
    }
}

define_text_enum! {
    /// Color space the viewer should render in.
    ColorSpace {
        Linear = ("LINEAR", "LINEAR"),
        Gamma = ("GAMMA", "GAMMA"),
    }
}

define_text_enum! {
    /// Asset license.
    License {
        CcBy3 = ("CREATIVE_COMMONS_BY_3_0", "CC BY Attribution 3.0 International"),
        CcByNd3 = ("CREATIVE_COMMONS_BY_ND_3_0", "CC BY-ND Attribution-NoDerivatives 3.0 International"),
        CcBy4 = ("CREATIVE_COMMONS_BY_4_0", "CC BY Attribution 4.0 International"),
        CcByNd4 = ("CREATIVE_COMMONS_BY_ND_4_0", "CC BY-ND Attribution-NoDerivatives 4.0 International"),
        Cc0 = ("CREATIVE_COMMONS_0", "CC0 1.0 Universal"),
        AllRightsReserved = ("ALL_RIGHTS_RESERVED", "All rights reserved"),
    }
}

impl License {
    /// The 4.0 equivalent of a 3.0 Creative Commons license.
    pub fn upgraded(self) -> Self {
        match self {
            License::CcBy3 => License::CcBy4,
            License::CcByNd3 => License::CcByNd4,
            other => other,
        }
    }

    /// Creative Commons grants cannot be revoked: a 4.0 license is final and
    /// a 3.0 license may only move to its 4.0 equivalent.
    pub fn allows_change_to(self, next: License) -> bool {
        match self {
            _ if next == self => true,
            License::CcBy4 | License::CcByNd4 | License::Cc0 => false,
            License::CcBy3 | License::CcByNd3 => next == self.upgraded(),
            License::AllRightsReserved => true,
        }
    }

    /// Whether the license allows the asset to be downloaded at all.
    pub fn permits_download(self) -> bool {
        self != License::AllRightsReserved
    }
}

define_text_enum! {
    /// Browsing category.
    Category {
        Miscellaneous = ("MISCELLANEOUS", "Miscellaneous"),
        Animals = ("ANIMALS", "Animals & Pets"),
        Architecture = ("ARCHITECTURE", "Architecture"),
        Art = ("ART", "Art"),
        Culture = ("CULTURE", "Culture & Humanity"),
        Events = ("EVENTS", "Current Events"),
        Food = ("FOOD", "Food & Drink"),
        History = ("HISTORY", "History"),
        Home = ("HOME", "Furniture & Home"),
        Nature = ("NATURE", "Nature"),
        Objects = ("OBJECTS", "Objects"),
        People = ("PEOPLE", "People & Characters"),
        Places = ("PLACES", "Places & Scenes"),
        Science = ("SCIENCE", "Science"),
        Sports = ("SPORTS", "Sports & Fitness"),
        Tech = ("TECH", "Tools & Technology"),
        Transport = ("TRANSPORT", "Transport"),
        Travel = ("TRAVEL", "Travel & Leisure"),
    }
}

// ---------------------------------------------------------------------------
// Format types
// ---------------------------------------------------------------------------

pub const FORMAT_TILT: &str = "TILT";
pub const FORMAT_BLOCKS: &str = "BLOCKS";
pub const FORMAT_GLTF1: &str = "GLTF";
pub const FORMAT_GLTF2: &str = "GLTF2";
pub const FORMAT_GLB: &str = "GLB";
pub const FORMAT_OBJ: &str = "OBJ";
pub const FORMAT_FBX: &str = "FBX";

/// Format types that make a Blocks asset renderable in the viewer.
pub const BLOCKS_VIEWABLE_TYPES: &[&str] = &[FORMAT_OBJ, FORMAT_GLB, FORMAT_GLTF2];

// ---------------------------------------------------------------------------
// Resource roles
// ---------------------------------------------------------------------------

/// Original glTF export.
pub const ROLE_ORIGINAL_GLTF: i32 = 12;
/// Re-exported glTF.
pub const ROLE_UPDATED_GLTF: i32 = 30;
/// Polygone GLB conversion.
pub const ROLE_POLYGONE_GLB: i32 = 1002;
/// Polygone glTF conversion; carries multi-file Blocks exports.
pub const ROLE_POLYGONE_GLTF: i32 = 1003;

/// Legacy numeric roles and their display labels.
pub const RESOURCE_ROLES: &[(i32, &str)] = &[
    (1, "Original OBJ File"),
    (2, "Tilt File"),
    (4, "Unknown GLTF File A"),
    (6, "Original FBX File"),
    (7, "Blocks File"),
    (8, "USD File"),
    (11, "HTML File"),
    (12, "Original glTF File"),
    (13, "Tour Creator Experience"),
    (15, "JSON File"),
    (16, "lullmodel File"),
    (17, "sand File A"),
    (18, "GLB File"),
    (19, "sand File B"),
    (20, "sandc File"),
    (21, "pb File"),
    (22, "Unknown GLTF File B"),
    (24, "Original Triangulated OBJ File"),
    (25, "JPG (Buggy)"),
    (26, "USDZ File"),
    (30, "Updated glTF File"),
    (32, "Editor settings pb file"),
    (35, "Unknown GLTF File C"),
    (36, "Unknown GLB File A"),
    (38, "Unknown GLB File B"),
    (1000, "Polygone Tilt File"),
    (1001, "Polygone Blocks File"),
    (1002, "Polygone GLB File"),
    (1003, "Polygone GLTF File"),
    (1004, "Polygone OBJ File"),
    (1005, "Polygone FBX File"),
];

/// Roles whose formats may be offered for download.
pub const DOWNLOADABLE_ROLES: &[i32] = &[
    1, 2, 6, 7, 8, 12, 18, 24, 26, 30, 1000, 1001, 1002, 1003, 1004, 1005,
];

/// Roles produced by the Poly scrape that the viewer can display.
pub const VIEWABLE_ROLES: &[i32] = &[1002, 1003, 1004];

/// Display label for a role, if the role is known.
pub fn role_label(role: i32) -> Option<&'static str> {
    RESOURCE_ROLES
        .iter()
        .find(|(code, _)| *code == role)
        .map(|(_, label)| *label)
}

/// Check whether a role is in the downloadable allow-list.
pub fn is_downloadable_role(role: i32) -> bool {
    DOWNLOADABLE_ROLES.contains(&role)
}

/// Check whether a role is known at all.
pub fn validate_role(role: i32) -> Result<(), CoreError> {
    if role_label(role).is_some() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Unknown resource role {role}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_round_trips_through_code() {
        for v in Visibility::ALL {
            assert_eq!(Visibility::parse(v.as_str()).unwrap(), *v);
        }
    }

    #[test]
    fn unknown_visibility_is_rejected() {
        assert!(Visibility::parse("SECRET").is_err());
        assert!(Visibility::parse("public").is_err());
    }

    #[test]
    fn defaults_match_new_rows() {
        assert_eq!(Visibility::default(), Visibility::Private);
        assert_eq!(AssetState::default(), AssetState::Bare);
    }

    #[test]
    fn v3_licenses_upgrade_to_v4() {
        assert_eq!(License::CcBy3.upgraded(), License::CcBy4);
        assert_eq!(License::CcByNd3.upgraded(), License::CcByNd4);
        assert_eq!(License::Cc0.upgraded(), License::Cc0);
    }

    #[test]
    fn creative_commons_licenses_only_move_forward() {
        assert!(License::CcBy3.allows_change_to(License::CcBy4));
        assert!(!License::CcBy3.allows_change_to(License::Cc0));
        assert!(!License::CcByNd3.allows_change_to(License::CcBy4));
        assert!(!License::CcBy4.allows_change_to(License::AllRightsReserved));
        assert!(License::Cc0.allows_change_to(License::Cc0));
        assert!(License::AllRightsReserved.allows_change_to(License::CcBy4));
    }

    #[test]
    fn reserved_license_blocks_download() {
        assert!(!License::AllRightsReserved.permits_download());
        assert!(License::Cc0.permits_download());
    }

    #[test]
    fn category_serializes_as_code() {
        let json = serde_json::to_string(&Category::Tech).unwrap();
        assert_eq!(json, "\"TECH\"");
        assert_eq!(Category::Tech.label(), "Tools & Technology");
    }

    #[test]
    fn role_labels() {
        assert_eq!(role_label(1003), Some("Polygone GLTF File"));
        assert_eq!(role_label(30), Some("Updated glTF File"));
        assert_eq!(role_label(3), None);
    }

    #[test]
    fn downloadable_roles_exclude_html() {
        assert!(is_downloadable_role(1));
        assert!(is_downloadable_role(1005));
        assert!(!is_downloadable_role(11));
    }

    #[test]
    fn validate_role_rejects_unknown() {
        assert!(validate_role(18).is_ok());
        assert!(validate_role(9999).is_err());
    }
}
