//! Catalog-wide settings injected into the domain functions that need them.

use std::collections::HashMap;

/// Prefix that turns a stored archive path into a Wayback Machine URL.
pub const DEFAULT_ARCHIVE_PREFIX: &str = "https://web.archive.org/web/";

/// Stored names under this prefix belong to user uploads.
pub const DEFAULT_USER_MEDIA_PREFIX: &str = "icosa/";

/// Advisory shown next to zipped multi-file glTF downloads.
pub const GLTF_ZIP_SUPPORTING_TEXT: &str =
    "Try the alternative download if the original doesn't work for you. We're working to fix this.";

/// Settings consulted by format, download and query logic.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Public base of the storage bucket, e.g. `https://f000.example.com/file/bucket`.
    /// No trailing slash.
    pub storage_base_url: String,
    /// Prefix prepended to format archive URLs.
    pub archive_prefix: String,
    /// Stored-name prefix of user uploads; only these are hidden on delete.
    pub user_media_prefix: String,
    /// Alternate category codes accepted by filters, mapped to canonical codes.
    pub category_aliases: HashMap<String, String>,
}

impl CatalogConfig {
    /// Build a config for the given storage base with default prefixes and aliases.
    pub fn new(storage_base_url: impl Into<String>) -> Self {
        let storage_base_url = storage_base_url.into().trim_end_matches('/').to_string();
        Self {
            storage_base_url,
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
            user_media_prefix: DEFAULT_USER_MEDIA_PREFIX.to_string(),
            category_aliases: default_category_aliases(),
        }
    }

    /// Public URL of a stored file.
    pub fn stored_file_url(&self, name: &str) -> String {
        format!("{}/{}", self.storage_base_url, name.trim_start_matches('/'))
    }

    /// Canonical category code for a filter value.
    pub fn canonical_category(&self, code: &str) -> String {
        let upper = code.trim().to_ascii_uppercase();
        self.category_aliases.get(&upper).cloned().unwrap_or(upper)
    }
}

/// Aliases used by clients of the original Poly API.
pub fn default_category_aliases() -> HashMap<String, String> {
    HashMap::from([("TECHNOLOGY".to_string(), "TECH".to_string())])
}
