pub mod admin;
pub mod assets;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /assets                                   list, create
/// /assets/id/{id}                           get, update, delete
/// /assets/id/{id}/unpublish                 set private (PATCH)
/// /assets/id/{id}/formats                   attach format (POST)
/// /assets/id/{id}/views                     record a view (POST)
/// /assets/id/{id}/likes                     like (POST)
/// /assets/{owner_url}/{asset_url}           lookup by urls
///
/// /admin/hidden-media/{id}/unhide           restore hidden file (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/assets", assets::router())
        .nest("/admin", admin::router())
}
