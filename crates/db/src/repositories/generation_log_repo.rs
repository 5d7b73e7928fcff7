//! Repository for the `generation_log` table (PRD-24).
//!
//! Rows are append-only: the persistence callbacks write them once and
//! nothing updates or deletes them afterwards.

use sqlx::PgPool;

use crate::models::generation_log::{GenerationLog, NewGenerationLog};

/// Column list for `generation_log` queries.
const COLUMNS: &str = "\
    id, asset_kind, user_email, project_id, model_id, prompt, negative_prompt, \
    status, error_message, triggered_at, completed_at, operation_secs, \
    video_duration_secs, with_audio, resolution, aspect_ratio, output_uri, \
    revised_prompt, input_tokens, output_tokens, cost, safety_reasons, created_at";

/// Provides append/read operations for the usage log.
pub struct GenerationLogRepo;

impl GenerationLogRepo {
    /// Append one usage-log row. Returns the stored row.
    pub async fn insert(
        pool: &PgPool,
        input: &NewGenerationLog,
    ) -> Result<GenerationLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_log \
                 (asset_kind, user_email, project_id, model_id, prompt, negative_prompt, \
                  status, error_message, triggered_at, completed_at, operation_secs, \
                  video_duration_secs, with_audio, resolution, aspect_ratio, output_uri, \
                  revised_prompt, input_tokens, output_tokens, cost, safety_reasons) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                     $16, $17, $18, $19, $20, $21) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationLog>(&query)
            .bind(&input.asset_kind)
            .bind(&input.user_email)
            .bind(&input.project_id)
            .bind(&input.model_id)
            .bind(&input.prompt)
            .bind(&input.negative_prompt)
            .bind(input.status.as_str())
            .bind(&input.error_message)
            .bind(input.triggered_at)
            .bind(input.completed_at)
            .bind(input.operation_secs)
            .bind(input.video_duration_secs)
            .bind(input.with_audio)
            .bind(&input.resolution)
            .bind(&input.aspect_ratio)
            .bind(&input.output_uri)
            .bind(&input.revised_prompt)
            .bind(input.input_tokens)
            .bind(input.output_tokens)
            .bind(input.cost)
            .bind(&input.safety_reasons)
            .fetch_one(pool)
            .await
    }

    /// Most recent rows for a caller, newest first. Used by operational
    /// debugging, not by the admission path.
    pub async fn recent_for_user(
        pool: &PgPool,
        user_email: &str,
        limit: i64,
    ) -> Result<Vec<GenerationLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generation_log \
             WHERE user_email = $1 \
             ORDER BY triggered_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, GenerationLog>(&query)
            .bind(user_email)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
