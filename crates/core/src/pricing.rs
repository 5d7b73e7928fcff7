//! Versioned tariff resolution and cost formulas (PRD-14).
//!
//! Tariffs are dated price records per model; the applicable record for a
//! usage timestamp is the latest one whose effective date is not in the
//! future of the usage date. Comparison is by calendar date only.
//! "No applicable tariff" is a normal outcome, never an error: callers
//! default the cost to zero and proceed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tokens per million, for the enrichment token-rate formulas.
const TOKENS_PER_MILLION: f64 = 1_000_000.0;

// ---------------------------------------------------------------------------
// Asset kinds
// ---------------------------------------------------------------------------

/// The kind of asset a generation produces. Each kind has its own tariff
/// table and price fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Video,
    Image,
    Enrichment,
}

impl AssetKind {
    /// String representation used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Video => "video",
            AssetKind::Image => "image",
            AssetKind::Enrichment => "enrichment",
        }
    }

    /// Parse from the database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "video" => Some(AssetKind::Video),
            "image" => Some(AssetKind::Image),
            "enrichment" => Some(AssetKind::Enrichment),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tariff records
// ---------------------------------------------------------------------------

/// One dated price record for a model.
///
/// Only the price fields matching the record's asset kind are populated:
/// per-second rates for video, a per-image rate for images, and
/// per-million-token rates for enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffRecord {
    pub model_id: String,
    pub effective_date: NaiveDate,
    pub per_second_with_audio: Option<f64>,
    pub per_second_without_audio: Option<f64>,
    pub per_image: Option<f64>,
    pub per_million_input_tokens: Option<f64>,
    pub per_million_output_tokens: Option<f64>,
}

/// Pick the tariff applicable to `model_id` as of `usage_date`.
///
/// Among the records for the model whose effective date is on or before
/// the usage date, the most recent wins. Returns `None` when the model is
/// unknown or every record takes effect after the usage date.
pub fn resolve_tariff<'a>(
    tariffs: &'a [TariffRecord],
    model_id: &str,
    usage_date: NaiveDate,
) -> Option<&'a TariffRecord> {
    tariffs
        .iter()
        .filter(|t| t.model_id == model_id && t.effective_date <= usage_date)
        .max_by_key(|t| t.effective_date)
}

// ---------------------------------------------------------------------------
// Cost formulas
// ---------------------------------------------------------------------------

/// Cost of a generated video: seconds times the per-second rate, which
/// depends on whether audio was generated.
pub fn video_cost(tariff: &TariffRecord, duration_secs: i32, with_audio: bool) -> f64 {
    let rate = if with_audio {
        tariff.per_second_with_audio
    } else {
        tariff.per_second_without_audio
    };
    rate.unwrap_or(0.0) * f64::from(duration_secs)
}

/// Cost of a single generated image.
pub fn image_cost(tariff: &TariffRecord) -> f64 {
    tariff.per_image.unwrap_or(0.0)
}

/// Cost of an enrichment call from its token counts.
pub fn enrichment_cost(tariff: &TariffRecord, input_tokens: i64, output_tokens: i64) -> f64 {
    let input = input_tokens as f64 / TOKENS_PER_MILLION * tariff.per_million_input_tokens.unwrap_or(0.0);
    let output =
        output_tokens as f64 / TOKENS_PER_MILLION * tariff.per_million_output_tokens.unwrap_or(0.0);
    input + output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn video_tariff(model: &str, date: (i32, u32, u32), rate: f64) -> TariffRecord {
        TariffRecord {
            model_id: model.to_string(),
            effective_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            per_second_with_audio: Some(rate * 2.0),
            per_second_without_audio: Some(rate),
            per_image: None,
            per_million_input_tokens: None,
            per_million_output_tokens: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // -- resolve_tariff --------------------------------------------------

    #[test]
    fn usage_between_versions_picks_earlier() {
        let tariffs = vec![
            video_tariff("veo-3.0", (2024, 1, 1), 0.10),
            video_tariff("veo-3.0", (2024, 6, 1), 0.20),
        ];
        let tariff = resolve_tariff(&tariffs, "veo-3.0", date(2024, 3, 15)).unwrap();
        assert_eq!(tariff.effective_date, date(2024, 1, 1));
    }

    #[test]
    fn usage_after_latest_version_picks_latest() {
        let tariffs = vec![
            video_tariff("veo-3.0", (2024, 1, 1), 0.10),
            video_tariff("veo-3.0", (2024, 6, 1), 0.20),
        ];
        let tariff = resolve_tariff(&tariffs, "veo-3.0", date(2024, 7, 1)).unwrap();
        assert_eq!(tariff.effective_date, date(2024, 6, 1));
    }

    #[test]
    fn usage_before_earliest_version_has_no_tariff() {
        let tariffs = vec![video_tariff("veo-3.0", (2024, 1, 1), 0.10)];
        assert!(resolve_tariff(&tariffs, "veo-3.0", date(2023, 12, 31)).is_none());
    }

    #[test]
    fn usage_on_effective_date_applies() {
        let tariffs = vec![video_tariff("veo-3.0", (2024, 6, 1), 0.20)];
        assert!(resolve_tariff(&tariffs, "veo-3.0", date(2024, 6, 1)).is_some());
    }

    #[test]
    fn unknown_model_has_no_tariff() {
        let tariffs = vec![video_tariff("veo-3.0", (2024, 1, 1), 0.10)];
        assert!(resolve_tariff(&tariffs, "imagen-4", date(2024, 7, 1)).is_none());
    }

    #[test]
    fn record_order_does_not_matter() {
        let tariffs = vec![
            video_tariff("veo-3.0", (2024, 6, 1), 0.20),
            video_tariff("veo-3.0", (2024, 1, 1), 0.10),
        ];
        let tariff = resolve_tariff(&tariffs, "veo-3.0", date(2024, 3, 15)).unwrap();
        assert_eq!(tariff.effective_date, date(2024, 1, 1));
    }

    // -- cost formulas ---------------------------------------------------

    #[test]
    fn video_cost_uses_audio_rate() {
        let tariff = video_tariff("veo-3.0", (2024, 1, 1), 0.10);
        assert!((video_cost(&tariff, 8, false) - 0.8).abs() < 1e-9);
        assert!((video_cost(&tariff, 8, true) - 1.6).abs() < 1e-9);
    }

    #[test]
    fn missing_rate_defaults_to_zero() {
        let tariff = TariffRecord {
            model_id: "veo-3.0".to_string(),
            effective_date: date(2024, 1, 1),
            per_second_with_audio: None,
            per_second_without_audio: None,
            per_image: None,
            per_million_input_tokens: None,
            per_million_output_tokens: None,
        };
        assert_eq!(video_cost(&tariff, 8, true), 0.0);
        assert_eq!(image_cost(&tariff), 0.0);
    }

    #[test]
    fn enrichment_cost_splits_token_rates() {
        let tariff = TariffRecord {
            model_id: "gemini-2.5-flash-image".to_string(),
            effective_date: date(2024, 1, 1),
            per_second_with_audio: None,
            per_second_without_audio: None,
            per_image: None,
            per_million_input_tokens: Some(0.30),
            per_million_output_tokens: Some(2.50),
        };
        // 1M input + 2M output => 0.30 + 5.00
        let cost = enrichment_cost(&tariff, 1_000_000, 2_000_000);
        assert!((cost - 5.30).abs() < 1e-9);
    }
}
