//! Usage aggregation for quota admission (PRD-11).
//!
//! One query returns both the count and the derived cost of successful
//! generations for a scope within a window. Cost is derived in SQL from
//! duration/model/audio-flag against the tariff catalog, picking the
//! latest tariff effective on or before each row's trigger date, the
//! same semantics as `mediagen_core::pricing::resolve_tariff`.

use mediagen_core::quota::{QuotaScope, UsageTotals, UsageWindow};
use sqlx::PgPool;

/// Status value aggregated rows must carry.
const STATUS_SUCCESS: &str = "success";

/// Cost derivation shared by both scope variants. The lateral join picks
/// the applicable tariff row per log row; rows with no applicable tariff
/// contribute zero cost ("cost unknown").
const AGGREGATE_SELECT: &str = "\
    SELECT COUNT(*) AS count, \
           COALESCE(SUM( \
               CASE g.asset_kind \
                   WHEN 'video' THEN \
                       COALESCE(g.video_duration_secs, 0) * COALESCE( \
                           CASE WHEN g.with_audio THEN t.per_second_with_audio \
                                ELSE t.per_second_without_audio END, 0) \
                   WHEN 'image' THEN COALESCE(t.per_image, 0) \
                   WHEN 'enrichment' THEN \
                       COALESCE(g.input_tokens, 0) / 1e6 * COALESCE(t.per_million_input_tokens, 0) \
                     + COALESCE(g.output_tokens, 0) / 1e6 * COALESCE(t.per_million_output_tokens, 0) \
                   ELSE 0 \
               END), 0)::DOUBLE PRECISION AS derived_cost \
    FROM generation_log g \
    LEFT JOIN LATERAL ( \
        SELECT * FROM tariffs t \
        WHERE t.asset_kind = g.asset_kind \
          AND t.model_id = g.model_id \
          AND t.effective_date <= (g.triggered_at AT TIME ZONE 'UTC')::date \
        ORDER BY t.effective_date DESC \
        LIMIT 1 \
    ) t ON TRUE \
    WHERE g.status = $1 \
      AND g.triggered_at >= $2 \
      AND g.triggered_at < $3";

/// Read-only aggregation over the usage log.
pub struct UsageRepo;

impl UsageRepo {
    /// Aggregate successful usage for a scope within a half-open window.
    pub async fn aggregate(
        pool: &PgPool,
        scope: &QuotaScope,
        window: &UsageWindow,
    ) -> Result<UsageTotals, sqlx::Error> {
        let query = match scope {
            QuotaScope::User(_) => format!("{AGGREGATE_SELECT} AND g.user_email = $4"),
            QuotaScope::Project(_) => format!("{AGGREGATE_SELECT} AND g.project_id = $4"),
        };

        let (count, derived_cost): (i64, f64) = sqlx::query_as(&query)
            .bind(STATUS_SUCCESS)
            .bind(window.start)
            .bind(window.end)
            .bind(scope.identity())
            .fetch_one(pool)
            .await?;

        Ok(UsageTotals {
            count,
            derived_cost,
        })
    }
}
