//! Blob storage interface and a local filesystem implementation.
//!
//! Stored files are addressed by name (a relative path such as
//! `icosa/<user>/<asset>/GLB/model.glb`). Hiding makes a file unreachable
//! through its public URL without destroying it, so it can be restored.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::formats::FormatEntry;

/// Directory under the storage root that holds hidden files.
pub const HIDDEN_DIR: &str = ".hidden";

/// Failures reported by a [`BlobStorage`] backend.
///
/// `NotPresent`, `NotHidden` and `AlreadyHidden` describe the file's state
/// and are expected during cleanup; callers usually log and continue.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not present in storage: {0}")]
    NotPresent(String),

    #[error("File is not hidden: {0}")]
    NotHidden(String),

    #[error("File is already hidden: {0}")]
    AlreadyHidden(String),

    #[error("Invalid stored file name: {0}")]
    InvalidName(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Operations the catalog needs from blob storage.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Public URL a client can fetch the named file from.
    fn public_url(&self, name: &str) -> String;

    /// Make the named file unreachable.
    async fn hide(&self, name: &str) -> Result<(), StorageError>;

    /// Restore a previously hidden file.
    async fn unhide(&self, name: &str) -> Result<(), StorageError>;
}

/// Files kept in a directory tree; hidden files move under [`HIDDEN_DIR`].
#[derive(Debug, Clone)]
pub struct LocalBlobStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn visible_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(checked_name(name)?))
    }

    fn hidden_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(HIDDEN_DIR).join(checked_name(name)?))
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    fn public_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name.trim_start_matches('/'))
    }

    async fn hide(&self, name: &str) -> Result<(), StorageError> {
        let visible = self.visible_path(name)?;
        let hidden = self.hidden_path(name)?;

        if !tokio::fs::try_exists(&visible).await? {
            if tokio::fs::try_exists(&hidden).await? {
                return Err(StorageError::AlreadyHidden(name.to_string()));
            }
            return Err(StorageError::NotPresent(name.to_string()));
        }

        move_file(&visible, &hidden).await?;
        tracing::debug!(file_name = name, "Hid stored file");
        Ok(())
    }

    async fn unhide(&self, name: &str) -> Result<(), StorageError> {
        let visible = self.visible_path(name)?;
        let hidden = self.hidden_path(name)?;

        if !tokio::fs::try_exists(&hidden).await? {
            if tokio::fs::try_exists(&visible).await? {
                return Err(StorageError::NotHidden(name.to_string()));
            }
            return Err(StorageError::NotPresent(name.to_string()));
        }

        move_file(&hidden, &visible).await?;
        tracing::debug!(file_name = name, "Restored stored file");
        Ok(())
    }
}

async fn move_file(from: &Path, to: &Path) -> Result<(), StorageError> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::rename(from, to).await?;
    Ok(())
}

/// Reject names that would escape the storage root.
fn checked_name(name: &str) -> Result<&Path, StorageError> {
    let path = Path::new(name);
    let safe = !name.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if safe {
        Ok(path)
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Asset media
// ---------------------------------------------------------------------------

/// Stored files of an asset that belong to the uploading user and may be
/// hidden when the asset is deleted.
///
/// Only names under `user_media_prefix` qualify. Legacy imports and anything
/// else are left untouched.
pub fn user_media_files(
    thumbnail: Option<&str>,
    formats: &[FormatEntry],
    user_media_prefix: &str,
) -> Vec<String> {
    thumbnail
        .into_iter()
        .chain(
            formats
                .iter()
                .flat_map(|f| f.resources.iter())
                .filter_map(|r| r.stored_file()),
        )
        .filter(|name| name.starts_with(user_media_prefix))
        .map(str::to_string)
        .collect()
}

/// Hide each file, returning the names that were actually hidden.
///
/// Files that are already gone or already hidden are logged and skipped.
/// Any other storage failure aborts.
pub async fn hide_files(
    storage: &dyn BlobStorage,
    names: &[String],
) -> Result<Vec<String>, StorageError> {
    let mut hidden = Vec::with_capacity(names.len());
    for name in names {
        match storage.hide(name).await {
            Ok(()) => hidden.push(name.clone()),
            Err(StorageError::NotPresent(_)) => {
                tracing::warn!(file_name = %name, "File not present in storage, skipping");
            }
            Err(StorageError::AlreadyHidden(_)) => {
                tracing::info!(file_name = %name, "File already hidden, skipping");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(hidden)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
