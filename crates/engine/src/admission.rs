//! Quota admission controller (PRD-11).
//!
//! A point-in-time check run on the request path before any job is
//! created: resolve the effective scope, compute the current calendar
//! window, issue one usage aggregation query, and compare inclusively
//! against the configured limit. There is no reservation: two
//! concurrent submissions from the same scope can both pass before
//! either is recorded; strict enforcement is an accepted non-goal.

use async_trait::async_trait;
use chrono::Utc;
use mediagen_core::quota::{
    check_exceeded, resolve_scope, ProjectQuotaConfig, QuotaLimitKind, QuotaScope, QuotaSettings,
    UsageTotals, UsageWindow,
};
use mediagen_db::repositories::UsageRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Usage source seam
// ---------------------------------------------------------------------------

/// Error from the usage aggregation backend.
#[derive(Debug, thiserror::Error)]
#[error("usage aggregation failed: {0}")]
pub struct UsageError(pub String);

/// Aggregated-usage query interface.
///
/// The controller only depends on this trait; production wires it to the
/// Postgres aggregation, tests inject scripted totals.
#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn aggregate(
        &self,
        scope: &QuotaScope,
        window: &UsageWindow,
    ) -> Result<UsageTotals, UsageError>;
}

/// Postgres-backed usage source.
pub struct PgUsageSource {
    pool: PgPool,
}

impl PgUsageSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageSource for PgUsageSource {
    async fn aggregate(
        &self,
        scope: &QuotaScope,
        window: &UsageWindow,
    ) -> Result<UsageTotals, UsageError> {
        UsageRepo::aggregate(&self.pool, scope, window)
            .await
            .map_err(|e| UsageError(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Result of an admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDecision {
    Admitted,
    /// Rejected with a human-readable message; the API surfaces it as a
    /// resource-exhausted response.
    Rejected { message: String },
}

impl AdmissionDecision {
    pub fn is_rejected(&self) -> bool {
        matches!(self, AdmissionDecision::Rejected { .. })
    }
}

/// Decides admit/reject for a (caller, scope) pair before dispatch.
pub struct AdmissionController<U: UsageSource> {
    usage: U,
}

impl<U: UsageSource> AdmissionController<U> {
    pub fn new(usage: U) -> Self {
        Self { usage }
    }

    /// Run the admission check for one request.
    ///
    /// `global` is the platform-wide quota; `project` is the requesting
    /// project's configuration when one exists. An unlimited resolved
    /// quota skips the usage query entirely.
    pub async fn check(
        &self,
        caller: &str,
        global: &QuotaSettings,
        project: Option<&ProjectQuotaConfig>,
    ) -> Result<AdmissionDecision, UsageError> {
        let (scope, settings) = resolve_scope(caller, global, project);

        if settings.kind == QuotaLimitKind::NoLimit {
            return Ok(AdmissionDecision::Admitted);
        }

        let window = UsageWindow::current(settings.period, Utc::now());
        let usage = self.usage.aggregate(&scope, &window).await?;

        match check_exceeded(settings, &usage) {
            Some(message) => {
                tracing::warn!(
                    scope = scope.identity(),
                    count = usage.count,
                    derived_cost = usage.derived_cost,
                    "Quota exceeded",
                );
                Ok(AdmissionDecision::Rejected { message })
            }
            None => Ok(AdmissionDecision::Admitted),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use mediagen_core::quota::QuotaPeriod;

    use super::*;

    /// Fixed-totals usage source recording what it was asked for.
    struct FixedUsage {
        totals: UsageTotals,
        queries: AtomicUsize,
        last_scope: Mutex<Option<QuotaScope>>,
    }

    impl FixedUsage {
        fn new(count: i64, cost: f64) -> Self {
            Self {
                totals: UsageTotals {
                    count,
                    derived_cost: cost,
                },
                queries: AtomicUsize::new(0),
                last_scope: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl UsageSource for &FixedUsage {
        async fn aggregate(
            &self,
            scope: &QuotaScope,
            _window: &UsageWindow,
        ) -> Result<UsageTotals, UsageError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            *self.last_scope.lock().unwrap() = Some(scope.clone());
            Ok(self.totals)
        }
    }

    fn count_quota(limit: f64) -> QuotaSettings {
        QuotaSettings {
            kind: QuotaLimitKind::CountLimit,
            limit: Some(limit),
            period: QuotaPeriod::Day,
        }
    }

    fn cost_quota(limit: f64) -> QuotaSettings {
        QuotaSettings {
            kind: QuotaLimitKind::CostLimit,
            limit: Some(limit),
            period: QuotaPeriod::Week,
        }
    }

    #[tokio::test]
    async fn no_limit_admits_without_querying_usage() {
        let usage = FixedUsage::new(1_000_000, 1e12);
        let controller = AdmissionController::new(&usage);

        let decision = controller
            .check("alice@example.com", &QuotaSettings::no_limit(), None)
            .await
            .unwrap();

        assert_eq!(decision, AdmissionDecision::Admitted);
        assert_eq!(usage.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn count_at_limit_is_rejected() {
        let usage = FixedUsage::new(5, 0.0);
        let controller = AdmissionController::new(&usage);

        let decision = controller
            .check("alice@example.com", &count_quota(5.0), None)
            .await
            .unwrap();

        assert!(decision.is_rejected());
    }

    #[tokio::test]
    async fn count_below_limit_is_admitted() {
        let usage = FixedUsage::new(4, 0.0);
        let controller = AdmissionController::new(&usage);

        let decision = controller
            .check("alice@example.com", &count_quota(5.0), None)
            .await
            .unwrap();

        assert_eq!(decision, AdmissionDecision::Admitted);
    }

    #[tokio::test]
    async fn cost_limit_compares_derived_cost() {
        let usage = FixedUsage::new(2, 150.0);
        let controller = AdmissionController::new(&usage);

        let decision = controller
            .check("alice@example.com", &cost_quota(100.0), None)
            .await
            .unwrap();

        match decision {
            AdmissionDecision::Rejected { message } => {
                assert!(message.contains("$150.00"));
            }
            AdmissionDecision::Admitted => panic!("expected rejection"),
        }
    }

    #[tokio::test]
    async fn restricted_project_config_scopes_query_to_project() {
        let usage = FixedUsage::new(0, 0.0);
        let controller = AdmissionController::new(&usage);
        let project = ProjectQuotaConfig {
            project_id: "proj-1".to_string(),
            unrestricted: false,
            quota: count_quota(10.0),
        };

        controller
            .check("alice@example.com", &QuotaSettings::no_limit(), Some(&project))
            .await
            .unwrap();

        assert_eq!(
            usage.last_scope.lock().unwrap().clone(),
            Some(QuotaScope::Project("proj-1".to_string())),
        );
    }

    #[tokio::test]
    async fn unrestricted_project_uses_global_quota() {
        let usage = FixedUsage::new(0, 0.0);
        let controller = AdmissionController::new(&usage);
        let project = ProjectQuotaConfig {
            project_id: "proj-1".to_string(),
            unrestricted: true,
            quota: count_quota(1.0),
        };

        // Global is NO_LIMIT, so no query should run at all.
        let decision = controller
            .check("alice@example.com", &QuotaSettings::no_limit(), Some(&project))
            .await
            .unwrap();

        assert_eq!(decision, AdmissionDecision::Admitted);
        assert_eq!(usage.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn aggregation_failure_propagates() {
        struct Broken;

        #[async_trait]
        impl UsageSource for Broken {
            async fn aggregate(
                &self,
                _scope: &QuotaScope,
                _window: &UsageWindow,
            ) -> Result<UsageTotals, UsageError> {
                Err(UsageError("connection refused".to_string()))
            }
        }

        let controller = AdmissionController::new(Broken);
        let err = controller
            .check("alice@example.com", &count_quota(5.0), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
