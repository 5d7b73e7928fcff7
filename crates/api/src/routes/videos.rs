//! Route definitions for the `/videos` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::videos;
use crate::state::AppState;

/// Routes mounted at `/videos`.
///
/// ```text
/// POST   /generate   -> generate_video
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(videos::generate_video))
}
