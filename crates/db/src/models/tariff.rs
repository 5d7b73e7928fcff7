//! Tariff catalog rows (PRD-14).

use chrono::NaiveDate;
use mediagen_core::pricing::TariffRecord;
use sqlx::FromRow;

/// A row from the `tariffs` table.
#[derive(Debug, Clone, FromRow)]
pub struct TariffRow {
    pub id: i64,
    pub asset_kind: String,
    pub model_id: String,
    pub effective_date: NaiveDate,
    pub per_second_with_audio: Option<f64>,
    pub per_second_without_audio: Option<f64>,
    pub per_image: Option<f64>,
    pub per_million_input_tokens: Option<f64>,
    pub per_million_output_tokens: Option<f64>,
}

impl From<TariffRow> for TariffRecord {
    fn from(row: TariffRow) -> Self {
        TariffRecord {
            model_id: row.model_id,
            effective_date: row.effective_date,
            per_second_with_audio: row.per_second_with_audio,
            per_second_without_audio: row.per_second_without_audio,
            per_image: row.per_image,
            per_million_input_tokens: row.per_million_input_tokens,
            per_million_output_tokens: row.per_million_output_tokens,
        }
    }
}
