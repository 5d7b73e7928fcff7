//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod generation_log_repo;
pub mod quota_config_repo;
pub mod tariff_repo;
pub mod usage_repo;

pub use generation_log_repo::GenerationLogRepo;
pub use quota_config_repo::QuotaConfigRepo;
pub use tariff_repo::TariffRepo;
pub use usage_repo::UsageRepo;
