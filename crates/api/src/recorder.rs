//! Usage-log persistence callbacks (PRD-24).
//!
//! Implements the engine's [`CompletionHooks`]: when a job finishes, one
//! usage-log row is written per produced artifact (with the cost resolved
//! against the tariff catalog as of the trigger time), or a single
//! failure row when it did not. Errors here are reported back to the
//! worker, which logs them; the job's recorded status is already final.

use async_trait::async_trait;
use chrono::Utc;
use mediagen_core::generation::GenerationResult;
use mediagen_core::pricing::{
    enrichment_cost, image_cost, resolve_tariff, video_cost, AssetKind,
};
use mediagen_db::models::generation_log::{NewGenerationLog, UsageStatus};
use mediagen_db::repositories::{GenerationLogRepo, TariffRepo};
use mediagen_db::DbPool;
use mediagen_engine::outcome::{CallbackError, CompletionHooks, GenerationFailure, JobContext};

/// Writes usage-log rows for finished jobs.
pub struct UsageRecorder {
    pool: DbPool,
}

impl UsageRecorder {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Common row fields shared by success and failure records.
    fn base_row(&self, ctx: &JobContext, status: UsageStatus) -> NewGenerationLog {
        NewGenerationLog {
            asset_kind: ctx.asset_kind.as_str().to_string(),
            user_email: ctx.caller.clone(),
            project_id: ctx.project_id.clone(),
            model_id: ctx.model_id.clone(),
            prompt: ctx.prompt.clone(),
            negative_prompt: ctx.negative_prompt.clone(),
            status,
            error_message: None,
            triggered_at: ctx.triggered_at,
            completed_at: Utc::now(),
            operation_secs: 0.0,
            video_duration_secs: ctx.video_duration_secs,
            with_audio: ctx.with_audio,
            resolution: ctx.resolution.clone(),
            aspect_ratio: ctx.aspect_ratio.clone(),
            output_uri: None,
            revised_prompt: None,
            input_tokens: None,
            output_tokens: None,
            cost: 0.0,
            safety_reasons: None,
        }
    }

    /// Resolve the per-row cost for a successful generation.
    ///
    /// An unresolvable tariff means "cost unknown" and prices the row at
    /// zero rather than failing the record.
    async fn cost_per_row(
        &self,
        ctx: &JobContext,
        result: &GenerationResult,
        artifact_count: usize,
    ) -> Result<f64, CallbackError> {
        let tariffs = TariffRepo::list_for_kind(&self.pool, ctx.asset_kind)
            .await
            .map_err(|e| CallbackError(format!("tariff lookup failed: {e}")))?;

        let Some(tariff) = resolve_tariff(&tariffs, &ctx.model_id, ctx.triggered_at.date_naive())
        else {
            tracing::warn!(
                model_id = %ctx.model_id,
                asset_kind = ctx.asset_kind.as_str(),
                "No applicable tariff; recording zero cost",
            );
            return Ok(0.0);
        };

        Ok(match ctx.asset_kind {
            AssetKind::Video => video_cost(
                tariff,
                ctx.video_duration_secs.unwrap_or(0),
                ctx.with_audio,
            ),
            AssetKind::Image => image_cost(tariff),
            AssetKind::Enrichment => {
                // The call is priced once by tokens; spread across rows.
                enrichment_cost(
                    tariff,
                    result.input_tokens.unwrap_or(0),
                    result.output_tokens.unwrap_or(0),
                ) / artifact_count as f64
            }
        })
    }
}

#[async_trait]
impl CompletionHooks for UsageRecorder {
    async fn on_success(
        &self,
        result: &GenerationResult,
        ctx: &JobContext,
    ) -> Result<(), CallbackError> {
        let artifact_count = result.artifacts.len().max(1);
        let cost = self.cost_per_row(ctx, result, artifact_count).await?;
        let operation_secs = result.operation_secs / artifact_count as f64;

        let mut rows_written = 0usize;
        for artifact in &result.artifacts {
            let mut row = self.base_row(ctx, UsageStatus::Success);
            row.operation_secs = operation_secs;
            row.output_uri = Some(artifact.uri.clone());
            if artifact.resolution.is_some() {
                row.resolution = artifact.resolution.clone();
            }
            row.revised_prompt = result.revised_prompt.clone();
            row.input_tokens = result.input_tokens;
            row.output_tokens = result.output_tokens;
            row.cost = cost;

            GenerationLogRepo::insert(&self.pool, &row)
                .await
                .map_err(|e| CallbackError(format!("usage log insert failed: {e}")))?;
            rows_written += 1;
        }

        tracing::info!(
            user_email = %ctx.caller,
            asset_kind = ctx.asset_kind.as_str(),
            rows = rows_written,
            cost_per_row = cost,
            "Recorded successful generation",
        );
        Ok(())
    }

    async fn on_error(
        &self,
        failure: &GenerationFailure,
        ctx: &JobContext,
    ) -> Result<(), CallbackError> {
        let mut row = self.base_row(ctx, UsageStatus::Failure);
        row.error_message = Some(failure.message.clone());
        if !failure.reasons.is_empty() {
            row.safety_reasons = serde_json::to_value(&failure.reasons).ok();
        }

        GenerationLogRepo::insert(&self.pool, &row)
            .await
            .map_err(|e| CallbackError(format!("usage log insert failed: {e}")))?;

        tracing::info!(
            user_email = %ctx.caller,
            asset_kind = ctx.asset_kind.as_str(),
            reasons = failure.reasons.len(),
            "Recorded failed generation",
        );
        Ok(())
    }
}
