//! Route definitions, one module per resource.

pub mod health;
pub mod images;
pub mod jobs;
pub mod quota;
pub mod tariffs;
pub mod usage;
pub mod videos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /videos/generate              POST   queue a video generation job
/// /images/generate              POST   queue an image generation job
/// /images/enrich                POST   queue an image enrichment job
/// /jobs/{id}                    GET    job status snapshot
/// /quota/settings               GET/PUT  global quota configuration
/// /quota/projects/{project_id}  GET/PUT  per-project quota configuration
/// /tariffs/{kind}               GET    tariff catalog per asset kind
/// /usage/recent                 GET    caller's recent usage records
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/videos", videos::router())
        .nest("/images", images::router())
        .nest("/jobs", jobs::router())
        .nest("/quota", quota::router())
        .nest("/tariffs", tariffs::router())
        .nest("/usage", usage::router())
}
