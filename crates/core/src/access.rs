//! Visibility and ownership checks for single-asset lookups and mutations.

use crate::catalog::Visibility;
use crate::error::CoreError;
use crate::types::DbId;

/// Message returned when a caller mutates an asset they do not own.
pub const NOT_OWNER_MESSAGE: &str = "Unauthorized user.";

/// Whether `viewer` may see an asset with the given visibility and owner.
///
/// Public and unlisted assets are visible to anyone holding their id or url.
/// Private assets are visible to their owner only.
pub fn can_view(visibility: Visibility, owner_id: DbId, viewer: Option<DbId>) -> bool {
    match visibility {
        Visibility::Public | Visibility::Unlisted => true,
        Visibility::Private => viewer == Some(owner_id),
    }
}

/// Fail with "not found" unless `viewer` may see the asset.
///
/// Invisible assets are reported exactly like missing ones.
pub fn ensure_visible(
    visibility: Visibility,
    owner_id: DbId,
    viewer: Option<DbId>,
    key: impl std::fmt::Display,
) -> Result<(), CoreError> {
    if can_view(visibility, owner_id, viewer) {
        Ok(())
    } else {
        Err(CoreError::not_found("Asset", key))
    }
}

/// Fail with "forbidden" unless `user_id` owns the asset.
pub fn ensure_owner(owner_id: DbId, user_id: DbId) -> Result<(), CoreError> {
    if owner_id == user_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(NOT_OWNER_MESSAGE.into()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn private_assets_are_owner_only() {
        assert!(can_view(Visibility::Private, 7, Some(7)));
        assert!(!can_view(Visibility::Private, 7, Some(8)));
        assert!(!can_view(Visibility::Private, 7, None));
    }

    #[test]
    fn public_and_unlisted_are_open() {
        assert!(can_view(Visibility::Public, 7, None));
        assert!(can_view(Visibility::Unlisted, 7, None));
    }

    #[test]
    fn hidden_asset_looks_missing() {
        let err = ensure_visible(Visibility::Private, 1, None, 42).unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "Asset", ref key } if key == "42");
    }

    #[test]
    fn ownership_mismatch_is_forbidden() {
        assert!(ensure_owner(3, 3).is_ok());
        assert_matches!(ensure_owner(3, 4), Err(CoreError::Forbidden(msg)) if msg == NOT_OWNER_MESSAGE);
    }
}
