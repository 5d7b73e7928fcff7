//! Usage-log entity models (PRD-24).

use mediagen_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// Recorded outcome of a generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageStatus {
    Success,
    Failure,
}

impl UsageStatus {
    /// String representation for database storage.
    pub fn as_str(self) -> &'static str {
        match self {
            UsageStatus::Success => "success",
            UsageStatus::Failure => "failure",
        }
    }
}

/// A row from the `generation_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationLog {
    pub id: i64,
    pub asset_kind: String,
    pub user_email: String,
    pub project_id: Option<String>,
    pub model_id: String,
    pub prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub triggered_at: Timestamp,
    pub completed_at: Timestamp,
    pub operation_secs: f64,
    pub video_duration_secs: Option<i32>,
    pub with_audio: bool,
    pub resolution: Option<String>,
    pub aspect_ratio: Option<String>,
    pub output_uri: Option<String>,
    pub revised_prompt: Option<String>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub cost: f64,
    pub safety_reasons: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// Insert DTO for a new usage-log row.
///
/// Success rows are written once per produced artifact; failure rows once
/// per attempt, with `output_uri` empty and `cost` zero.
#[derive(Debug, Clone)]
pub struct NewGenerationLog {
    pub asset_kind: String,
    pub user_email: String,
    pub project_id: Option<String>,
    pub model_id: String,
    pub prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub status: UsageStatus,
    pub error_message: Option<String>,
    pub triggered_at: Timestamp,
    pub completed_at: Timestamp,
    pub operation_secs: f64,
    pub video_duration_secs: Option<i32>,
    pub with_audio: bool,
    pub resolution: Option<String>,
    pub aspect_ratio: Option<String>,
    pub output_uri: Option<String>,
    pub revised_prompt: Option<String>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub cost: f64,
    pub safety_reasons: Option<serde_json::Value>,
}
