//! Quota configuration and admission math (PRD-11).
//!
//! Pure logic only: scope precedence, rolling calendar windows, and the
//! inclusive limit comparison. The admission controller in the engine
//! crate wires these to the usage aggregation query.

use chrono::{Datelike, Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

/// What a quota limit counts.
///
/// Wire strings match the stored configuration documents
/// (`NO_LIMIT` / `COUNT_LIMIT` / `COST_LIMIT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuotaLimitKind {
    /// No limit is enforced; every admission check passes.
    NoLimit,
    /// Limit on the number of successful generations in the window.
    CountLimit,
    /// Limit on the derived cost of successful generations in the window.
    CostLimit,
}

/// Rolling calendar period a quota applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaPeriod {
    Day,
    Week,
}

impl QuotaPeriod {
    /// Human-readable adjective for rejection messages.
    pub fn label(self) -> &'static str {
        match self {
            QuotaPeriod::Day => "daily",
            QuotaPeriod::Week => "weekly",
        }
    }
}

/// A quota configuration, either global or attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaSettings {
    /// Limit kind. Field is named `type` on the wire.
    #[serde(rename = "type")]
    pub kind: QuotaLimitKind,
    /// Threshold value; required and positive unless `kind` is `NoLimit`.
    #[serde(default)]
    pub limit: Option<f64>,
    /// Calendar period the limit rolls over.
    #[serde(default = "QuotaSettings::default_period")]
    pub period: QuotaPeriod,
}

impl QuotaSettings {
    fn default_period() -> QuotaPeriod {
        QuotaPeriod::Day
    }

    /// An unrestricted configuration; the fallback when nothing is stored.
    pub fn no_limit() -> Self {
        Self {
            kind: QuotaLimitKind::NoLimit,
            limit: None,
            period: QuotaPeriod::Day,
        }
    }

    /// Enforce the configuration invariant: a limited quota must carry a
    /// positive threshold.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.kind == QuotaLimitKind::NoLimit {
            return Ok(());
        }
        match self.limit {
            Some(limit) if limit > 0.0 => Ok(()),
            Some(limit) => Err(CoreError::Validation(format!(
                "Quota limit must be positive, got {limit}"
            ))),
            None => Err(CoreError::Validation(
                "Quota limit is required unless type is NO_LIMIT".to_string(),
            )),
        }
    }
}

impl Default for QuotaSettings {
    fn default() -> Self {
        Self::no_limit()
    }
}

/// Per-project quota configuration.
///
/// When present and not `unrestricted`, it overrides the global quota and
/// shifts the usage scope from the caller to the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectQuotaConfig {
    pub project_id: String,
    /// When set, the project opts out of quota enforcement entirely and
    /// the caller falls back to the global configuration.
    #[serde(default)]
    pub unrestricted: bool,
    pub quota: QuotaSettings,
}

// ---------------------------------------------------------------------------
// Scope resolution
// ---------------------------------------------------------------------------

/// The identity usage is measured against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaScope {
    /// Caller identity (email), measured under the global quota.
    User(String),
    /// Project identity, measured under the project's own quota.
    Project(String),
}

impl QuotaScope {
    /// The raw identity string the usage query filters on.
    pub fn identity(&self) -> &str {
        match self {
            QuotaScope::User(email) => email,
            QuotaScope::Project(id) => id,
        }
    }
}

/// Resolve the effective (scope, settings) pair for a request.
///
/// Precedence: a project configuration that is not flagged `unrestricted`
/// wins and scopes usage to the project; otherwise the caller is measured
/// under the global configuration.
pub fn resolve_scope<'a>(
    caller: &str,
    global: &'a QuotaSettings,
    project: Option<&'a ProjectQuotaConfig>,
) -> (QuotaScope, &'a QuotaSettings) {
    match project {
        Some(cfg) if !cfg.unrestricted => {
            (QuotaScope::Project(cfg.project_id.clone()), &cfg.quota)
        }
        _ => (QuotaScope::User(caller.to_string()), global),
    }
}

// ---------------------------------------------------------------------------
// Usage window
// ---------------------------------------------------------------------------

/// Half-open usage window `[start, end)` ending at the admission check.
///
/// Never stored; recomputed on every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl UsageWindow {
    /// Window for the current calendar period.
    ///
    /// Day: start of the current UTC day. Week: Monday 00:00 UTC of the
    /// current ISO week.
    pub fn current(period: QuotaPeriod, now: Timestamp) -> Self {
        let today = now.date_naive();
        let start_date = match period {
            QuotaPeriod::Day => today,
            QuotaPeriod::Week => {
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
            }
        };
        Self {
            start: start_date.and_time(NaiveTime::MIN).and_utc(),
            end: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Limit comparison
// ---------------------------------------------------------------------------

/// Aggregated usage for one scope over one window, as returned by the
/// usage aggregation query.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageTotals {
    /// Number of successful generations.
    pub count: i64,
    /// Cost derived from duration/model/audio via the tariff tables.
    pub derived_cost: f64,
}

/// Compare usage against a quota. Returns the rejection message when the
/// quota is met or exceeded (the comparison is inclusive: a scope sitting
/// exactly at the limit is rejected).
pub fn check_exceeded(settings: &QuotaSettings, usage: &UsageTotals) -> Option<String> {
    let Some(limit) = settings.limit else {
        return None;
    };

    match settings.kind {
        QuotaLimitKind::NoLimit => None,
        QuotaLimitKind::CountLimit => {
            if (usage.count as f64) >= limit {
                Some(format!(
                    "{} generation limit reached: {} of {} generations used",
                    capitalize(settings.period.label()),
                    usage.count,
                    limit as i64,
                ))
            } else {
                None
            }
        }
        QuotaLimitKind::CostLimit => {
            if usage.derived_cost >= limit {
                Some(format!(
                    "{} cost limit reached: ${:.2} of ${:.2} spent",
                    capitalize(settings.period.label()),
                    usage.derived_cost,
                    limit,
                ))
            } else {
                None
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn count_quota(limit: f64) -> QuotaSettings {
        QuotaSettings {
            kind: QuotaLimitKind::CountLimit,
            limit: Some(limit),
            period: QuotaPeriod::Day,
        }
    }

    fn usage(count: i64, cost: f64) -> UsageTotals {
        UsageTotals {
            count,
            derived_cost: cost,
        }
    }

    // -- validate --------------------------------------------------------

    #[test]
    fn no_limit_needs_no_threshold() {
        assert!(QuotaSettings::no_limit().validate().is_ok());
    }

    #[test]
    fn count_limit_without_threshold_rejected() {
        let settings = QuotaSettings {
            kind: QuotaLimitKind::CountLimit,
            limit: None,
            period: QuotaPeriod::Day,
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_threshold_rejected() {
        assert!(count_quota(0.0).validate().is_err());
    }

    #[test]
    fn negative_threshold_rejected() {
        assert!(count_quota(-3.0).validate().is_err());
    }

    #[test]
    fn positive_threshold_accepted() {
        assert!(count_quota(5.0).validate().is_ok());
    }

    // -- resolve_scope ---------------------------------------------------

    #[test]
    fn no_project_config_uses_global_caller_scope() {
        let global = count_quota(5.0);
        let (scope, settings) = resolve_scope("alice@example.com", &global, None);
        assert_eq!(scope, QuotaScope::User("alice@example.com".to_string()));
        assert_eq!(settings, &global);
    }

    #[test]
    fn restricted_project_config_wins() {
        let global = count_quota(5.0);
        let project = ProjectQuotaConfig {
            project_id: "proj-1".to_string(),
            unrestricted: false,
            quota: count_quota(10.0),
        };
        let (scope, settings) = resolve_scope("alice@example.com", &global, Some(&project));
        assert_eq!(scope, QuotaScope::Project("proj-1".to_string()));
        assert_eq!(settings.limit, Some(10.0));
    }

    #[test]
    fn unrestricted_project_falls_back_to_global() {
        let global = count_quota(5.0);
        let project = ProjectQuotaConfig {
            project_id: "proj-1".to_string(),
            unrestricted: true,
            quota: count_quota(10.0),
        };
        let (scope, settings) = resolve_scope("alice@example.com", &global, Some(&project));
        assert_eq!(scope, QuotaScope::User("alice@example.com".to_string()));
        assert_eq!(settings.limit, Some(5.0));
    }

    // -- UsageWindow -----------------------------------------------------

    #[test]
    fn day_window_starts_at_midnight_utc() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();
        let window = UsageWindow::current(QuotaPeriod::Day, now);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(window.end, now);
    }

    #[test]
    fn week_window_starts_on_monday() {
        // 2024-03-15 is a Friday; the preceding Monday is 2024-03-11.
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();
        let window = UsageWindow::current(QuotaPeriod::Week, now);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn week_window_on_monday_starts_same_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 11, 0, 5, 0).unwrap();
        let window = UsageWindow::current(QuotaPeriod::Week, now);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap()
        );
    }

    // -- check_exceeded --------------------------------------------------

    #[test]
    fn no_limit_never_rejects() {
        let settings = QuotaSettings::no_limit();
        assert!(check_exceeded(&settings, &usage(1_000_000, 1e9)).is_none());
    }

    #[test]
    fn count_at_limit_is_rejected() {
        let message = check_exceeded(&count_quota(5.0), &usage(5, 0.0));
        assert!(message.is_some());
        assert!(message.unwrap().contains("5 of 5"));
    }

    #[test]
    fn count_below_limit_is_admitted() {
        assert!(check_exceeded(&count_quota(5.0), &usage(4, 0.0)).is_none());
    }

    #[test]
    fn cost_at_limit_is_rejected() {
        let settings = QuotaSettings {
            kind: QuotaLimitKind::CostLimit,
            limit: Some(100.0),
            period: QuotaPeriod::Week,
        };
        let message = check_exceeded(&settings, &usage(3, 100.0));
        assert!(message.unwrap().starts_with("Weekly cost limit reached"));
    }

    #[test]
    fn cost_below_limit_is_admitted() {
        let settings = QuotaSettings {
            kind: QuotaLimitKind::CostLimit,
            limit: Some(100.0),
            period: QuotaPeriod::Week,
        };
        assert!(check_exceeded(&settings, &usage(3, 99.99)).is_none());
    }

    // -- serde wire format -----------------------------------------------

    #[test]
    fn settings_round_trip_matches_stored_format() {
        let json = r#"{"type":"COUNT_LIMIT","limit":5,"period":"day"}"#;
        let settings: QuotaSettings = serde_json::from_str(json).expect("parse");
        assert_eq!(settings.kind, QuotaLimitKind::CountLimit);
        assert_eq!(settings.limit, Some(5.0));
        assert_eq!(settings.period, QuotaPeriod::Day);
    }

    #[test]
    fn missing_period_defaults_to_day() {
        let json = r#"{"type":"NO_LIMIT"}"#;
        let settings: QuotaSettings = serde_json::from_str(json).expect("parse");
        assert_eq!(settings.period, QuotaPeriod::Day);
    }
}
