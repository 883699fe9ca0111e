//! Route definitions for the asset catalog.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// Asset routes mounted at `/assets`.
///
/// ```text
/// GET    /                              -> list_assets
/// POST   /                              -> create_asset
/// GET    /id/{id}                       -> get_asset
/// PATCH  /id/{id}                       -> update_asset
/// DELETE /id/{id}                       -> delete_asset
/// PATCH  /id/{id}/unpublish             -> unpublish_asset
/// POST   /id/{id}/formats               -> attach_format
/// POST   /id/{id}/views                 -> record_view
/// POST   /id/{id}/likes                 -> like_asset
/// GET    /{owner_url}/{asset_url}       -> get_asset_by_urls
/// ```
///
/// The static `id` segment takes precedence over `{owner_url}`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::list_assets).post(assets::create_asset))
        .route(
            "/id/{id}",
            get(assets::get_asset)
                .patch(assets::update_asset)
                .delete(assets::delete_asset),
        )
        .route("/id/{id}/unpublish", patch(assets::unpublish_asset))
        .route("/id/{id}/formats", post(assets::attach_format))
        .route("/id/{id}/views", post(assets::record_view))
        .route("/id/{id}/likes", post(assets::like_asset))
        .route("/{owner_url}/{asset_url}", get(assets::get_asset_by_urls))
}
