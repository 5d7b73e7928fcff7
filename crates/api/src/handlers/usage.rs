//! Handlers for usage history (PRD-24).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use mediagen_db::repositories::GenerationLogRepo;

use crate::error::AppResult;
use crate::identity::CallerIdentity;
use crate::response::DataResponse;
use crate::state::AppState;

/// Page size for the recent-usage listing.
const RECENT_LIMIT: i64 = 50;

/// GET /api/v1/usage/recent
///
/// The caller's most recent generation records, newest first.
pub async fn recent(
    caller: CallerIdentity,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rows = GenerationLogRepo::recent_for_user(&state.pool, &caller.email, RECENT_LIMIT).await?;
    Ok(Json(DataResponse { data: rows }))
}
