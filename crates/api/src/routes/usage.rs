//! Route definitions for usage history.

use axum::routing::get;
use axum::Router;

use crate::handlers::usage;
use crate::state::AppState;

/// Routes mounted at `/usage`.
///
/// ```text
/// GET    /recent   -> recent
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/recent", get(usage::recent))
}
