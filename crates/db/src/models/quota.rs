//! Quota configuration rows and their mapping to the core types (PRD-11).
//!
//! Enum-ish columns are stored as TEXT; unknown values parse to the
//! permissive default rather than failing, matching how the original
//! configuration documents were read.

use mediagen_core::quota::{ProjectQuotaConfig, QuotaLimitKind, QuotaPeriod, QuotaSettings};
use mediagen_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `quota_settings` table (single global row).
#[derive(Debug, Clone, FromRow)]
pub struct QuotaSettingsRow {
    pub quota_type: String,
    pub quota_limit: Option<f64>,
    pub period: String,
    pub updated_at: Timestamp,
}

/// A row from the `project_quota_configs` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectQuotaConfigRow {
    pub project_id: String,
    pub unrestricted: bool,
    pub quota_type: String,
    pub quota_limit: Option<f64>,
    pub period: String,
    pub updated_at: Timestamp,
}

/// Parse a stored quota type, defaulting to `NoLimit` for unknown values.
pub fn parse_kind(s: &str) -> QuotaLimitKind {
    match s {
        "COUNT_LIMIT" => QuotaLimitKind::CountLimit,
        "COST_LIMIT" => QuotaLimitKind::CostLimit,
        _ => QuotaLimitKind::NoLimit,
    }
}

/// Parse a stored period, defaulting to `Day` for unknown values.
pub fn parse_period(s: &str) -> QuotaPeriod {
    match s {
        "week" => QuotaPeriod::Week,
        _ => QuotaPeriod::Day,
    }
}

/// Database string for a quota kind.
pub fn kind_as_str(kind: QuotaLimitKind) -> &'static str {
    match kind {
        QuotaLimitKind::NoLimit => "NO_LIMIT",
        QuotaLimitKind::CountLimit => "COUNT_LIMIT",
        QuotaLimitKind::CostLimit => "COST_LIMIT",
    }
}

/// Database string for a period.
pub fn period_as_str(period: QuotaPeriod) -> &'static str {
    match period {
        QuotaPeriod::Day => "day",
        QuotaPeriod::Week => "week",
    }
}

impl From<QuotaSettingsRow> for QuotaSettings {
    fn from(row: QuotaSettingsRow) -> Self {
        QuotaSettings {
            kind: parse_kind(&row.quota_type),
            limit: row.quota_limit,
            period: parse_period(&row.period),
        }
    }
}

impl From<ProjectQuotaConfigRow> for ProjectQuotaConfig {
    fn from(row: ProjectQuotaConfigRow) -> Self {
        ProjectQuotaConfig {
            unrestricted: row.unrestricted,
            quota: QuotaSettings {
                kind: parse_kind(&row.quota_type),
                limit: row.quota_limit,
                period: parse_period(&row.period),
            },
            project_id: row.project_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_defaults_to_no_limit() {
        assert_eq!(parse_kind("SOMETHING_NEW"), QuotaLimitKind::NoLimit);
    }

    #[test]
    fn kind_round_trips() {
        for kind in [
            QuotaLimitKind::NoLimit,
            QuotaLimitKind::CountLimit,
            QuotaLimitKind::CostLimit,
        ] {
            assert_eq!(parse_kind(kind_as_str(kind)), kind);
        }
    }

    #[test]
    fn period_round_trips() {
        for period in [QuotaPeriod::Day, QuotaPeriod::Week] {
            assert_eq!(parse_period(period_as_str(period)), period);
        }
    }
}
