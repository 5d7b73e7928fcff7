//! Route definitions for the tariff catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::tariffs;
use crate::state::AppState;

/// Routes mounted at `/tariffs`.
///
/// ```text
/// GET    /{kind}   -> list_tariffs
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{kind}", get(tariffs::list_tariffs))
}
