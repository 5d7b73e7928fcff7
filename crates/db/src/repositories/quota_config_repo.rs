//! Repository for quota configuration (PRD-11).

use mediagen_core::quota::{ProjectQuotaConfig, QuotaSettings};
use sqlx::PgPool;

use crate::models::quota::{
    kind_as_str, period_as_str, ProjectQuotaConfigRow, QuotaSettingsRow,
};

/// Provides read/write access to the global and per-project quotas.
pub struct QuotaConfigRepo;

impl QuotaConfigRepo {
    /// The global quota configuration. Falls back to `NO_LIMIT` when no
    /// row has ever been stored.
    pub async fn global(pool: &PgPool) -> Result<QuotaSettings, sqlx::Error> {
        let row = sqlx::query_as::<_, QuotaSettingsRow>(
            "SELECT quota_type, quota_limit, period, updated_at FROM quota_settings WHERE id = 1",
        )
        .fetch_optional(pool)
        .await?;

        Ok(row.map(QuotaSettings::from).unwrap_or_default())
    }

    /// Upsert the global quota configuration.
    pub async fn save_global(pool: &PgPool, settings: &QuotaSettings) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO quota_settings (id, quota_type, quota_limit, period, updated_at) \
             VALUES (1, $1, $2, $3, NOW()) \
             ON CONFLICT (id) DO UPDATE \
                 SET quota_type = $1, quota_limit = $2, period = $3, updated_at = NOW()",
        )
        .bind(kind_as_str(settings.kind))
        .bind(settings.limit)
        .bind(period_as_str(settings.period))
        .execute(pool)
        .await?;
        Ok(())
    }

    /// The quota configuration for a project, if one exists.
    pub async fn for_project(
        pool: &PgPool,
        project_id: &str,
    ) -> Result<Option<ProjectQuotaConfig>, sqlx::Error> {
        let row = sqlx::query_as::<_, ProjectQuotaConfigRow>(
            "SELECT project_id, unrestricted, quota_type, quota_limit, period, updated_at \
             FROM project_quota_configs WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(ProjectQuotaConfig::from))
    }

    /// Upsert a project quota configuration.
    pub async fn save_project(
        pool: &PgPool,
        config: &ProjectQuotaConfig,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO project_quota_configs \
                 (project_id, unrestricted, quota_type, quota_limit, period, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) \
             ON CONFLICT (project_id) DO UPDATE \
                 SET unrestricted = $2, quota_type = $3, quota_limit = $4, period = $5, \
                     updated_at = NOW()",
        )
        .bind(&config.project_id)
        .bind(config.unrestricted)
        .bind(kind_as_str(config.quota.kind))
        .bind(config.quota.limit)
        .bind(period_as_str(config.quota.period))
        .execute(pool)
        .await?;
        Ok(())
    }
}
