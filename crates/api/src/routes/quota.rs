//! Route definitions for quota configuration.

use axum::routing::get;
use axum::Router;

use crate::handlers::quota;
use crate::state::AppState;

/// Routes mounted at `/quota`.
///
/// ```text
/// GET    /check                    -> check
/// GET    /settings                 -> get_settings
/// PUT    /settings                 -> put_settings
/// GET    /projects/{project_id}    -> get_project_config
/// PUT    /projects/{project_id}    -> put_project_config
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/check", get(quota::check))
        .route(
            "/settings",
            get(quota::get_settings).put(quota::put_settings),
        )
        .route(
            "/projects/{project_id}",
            get(quota::get_project_config).put(quota::put_project_config),
        )
}
