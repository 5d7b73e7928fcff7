//! Route definitions for the `/images` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Routes mounted at `/images`.
///
/// ```text
/// POST   /generate   -> generate_image
/// POST   /enrich     -> enrich_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(images::generate_image))
        .route("/enrich", post(images::enrich_image))
}
