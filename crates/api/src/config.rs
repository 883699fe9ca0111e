use std::path::PathBuf;

use gallery_core::config::{CatalogConfig, DEFAULT_ARCHIVE_PREFIX, DEFAULT_USER_MEDIA_PREFIX};

use crate::auth::token::TokenSettings;

/// Server configuration loaded from environment variables.
///
/// All fields except the token secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on draining in-flight requests after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Bearer-token validation settings.
    pub token: TokenSettings,
    /// Blob storage and catalog settings.
    pub storage: StorageConfig,
}

/// Where stored media lives and how it is published.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Public URL of the storage service.
    pub storage_url: String,
    /// Bucket appended to `storage_url` to form the public base.
    pub bucket_name: String,
    /// Local directory backing the bucket.
    pub media_root: PathBuf,
    /// Stored-name prefix of user uploads.
    pub user_media_prefix: String,
    /// Prefix prepended to format archive URLs.
    pub archive_prefix: String,
}

impl StorageConfig {
    /// Public base of the bucket: `<storage_url>/<bucket_name>`.
    pub fn public_base_url(&self) -> String {
        format!(
            "{}/{}",
            self.storage_url.trim_end_matches('/'),
            self.bucket_name.trim_matches('/')
        )
    }

    /// Catalog settings derived from the storage layout.
    pub fn catalog_config(&self) -> CatalogConfig {
        let mut catalog = CatalogConfig::new(self.public_base_url());
        catalog.user_media_prefix = self.user_media_prefix.clone();
        catalog.archive_prefix = self.archive_prefix.clone();
        catalog
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `STORAGE_URL`          | `http://localhost:3000`    |
    /// | `STORAGE_BUCKET_NAME`  | `media`                    |
    /// | `MEDIA_ROOT`           | `./media`                  |
    /// | `USER_MEDIA_PREFIX`    | `icosa/`                   |
    /// | `ARCHIVE_PREFIX`       | `https://web.archive.org/web/` |
    ///
    /// `DATABASE_URL` is read separately at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let storage = StorageConfig {
            storage_url: std::env::var("STORAGE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            bucket_name: std::env::var("STORAGE_BUCKET_NAME").unwrap_or_else(|_| "media".into()),
            media_root: std::env::var("MEDIA_ROOT")
                .unwrap_or_else(|_| "./media".into())
                .into(),
            user_media_prefix: std::env::var("USER_MEDIA_PREFIX")
                .unwrap_or_else(|_| DEFAULT_USER_MEDIA_PREFIX.into()),
            archive_prefix: std::env::var("ARCHIVE_PREFIX")
                .unwrap_or_else(|_| DEFAULT_ARCHIVE_PREFIX.into()),
        };

        let token = TokenSettings::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            token,
            storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> StorageConfig {
        StorageConfig {
            storage_url: "https://s3.example.com/".into(),
            bucket_name: "gallery".into(),
            media_root: "/tmp/media".into(),
            user_media_prefix: "uploads/".into(),
            archive_prefix: "https://archive.example.com/".into(),
        }
    }

    #[test]
    fn public_base_joins_url_and_bucket() {
        assert_eq!(storage().public_base_url(), "https://s3.example.com/gallery");
    }

    #[test]
    fn catalog_config_carries_prefixes() {
        let catalog = storage().catalog_config();
        assert_eq!(catalog.storage_base_url, "https://s3.example.com/gallery");
        assert_eq!(catalog.user_media_prefix, "uploads/");
        assert_eq!(catalog.archive_prefix, "https://archive.example.com/");
        assert_eq!(catalog.canonical_category("technology"), "TECH");
    }
}
