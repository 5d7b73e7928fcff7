//! Handlers for the tariff catalog (PRD-14).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use mediagen_core::pricing::AssetKind;
use mediagen_db::repositories::TariffRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/tariffs/{kind}
///
/// List the tariff records for one asset kind (`video`, `image`, or
/// `enrichment`), every effective date included.
pub async fn list_tariffs(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<impl IntoResponse> {
    let kind = AssetKind::parse(&kind)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown asset kind: {kind}")))?;

    let tariffs = TariffRepo::list_for_kind(&state.pool, kind).await?;
    Ok(Json(DataResponse { data: tariffs }))
}
