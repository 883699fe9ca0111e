//! Admin-only routes.

use axum::routing::post;
use axum::Router;

use crate::handlers::hidden_media;
use crate::state::AppState;

/// Admin routes mounted at `/admin`.
///
/// ```text
/// POST   /hidden-media/{id}/unhide      -> unhide
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/hidden-media/{id}/unhide", post(hidden_media::unhide))
}
