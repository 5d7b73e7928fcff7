//! Repository for the `tariffs` catalog (PRD-14).

use mediagen_core::pricing::{AssetKind, TariffRecord};
use sqlx::PgPool;

use crate::models::tariff::TariffRow;

/// Read access to the versioned price catalog.
pub struct TariffRepo;

impl TariffRepo {
    /// All tariff records for one asset kind, newest effective date first.
    ///
    /// The in-process resolver (`mediagen_core::pricing::resolve_tariff`)
    /// does its own date filtering, so this returns the full catalog for
    /// the kind.
    pub async fn list_for_kind(
        pool: &PgPool,
        kind: AssetKind,
    ) -> Result<Vec<TariffRecord>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TariffRow>(
            "SELECT id, asset_kind, model_id, effective_date, \
                    per_second_with_audio, per_second_without_audio, per_image, \
                    per_million_input_tokens, per_million_output_tokens \
             FROM tariffs \
             WHERE asset_kind = $1 \
             ORDER BY model_id, effective_date DESC",
        )
        .bind(kind.as_str())
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(TariffRecord::from).collect())
    }
}
