//! Content-safety rejection classification (PRD-16).
//!
//! The generation provider signals content-safety rejections by embedding
//! numeric "support codes" in otherwise generic error strings
//! (`... Support codes: 58061214, 29310472`). This module extracts those
//! codes and maps them through a static lookup table into structured
//! reasons the frontend can render. Codes missing from the table still
//! surface, with an `Unknown` category.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Marker pattern for inline support codes.
static SUPPORT_CODES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Support codes: ([\d, ]+)").expect("valid regex"));

// ---------------------------------------------------------------------------
// Reason type
// ---------------------------------------------------------------------------

/// A structured content-safety rejection reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyReason {
    /// The provider's numeric support code, as a string.
    pub code: String,
    /// Policy category, e.g. `"Child"`, `"Violence"`, `"Unknown"`.
    pub category: String,
    /// Human-readable description of what was filtered and why.
    pub description: String,
    /// Which side of the generation was filtered (input prompt, input
    /// image, or generated output).
    pub filtered: String,
}

// ---------------------------------------------------------------------------
// Static lookup table
// ---------------------------------------------------------------------------

struct FilterEntry {
    code: &'static str,
    category: &'static str,
    description: &'static str,
    filtered: &'static str,
}

/// Provider support codes and their meanings. Unlisted codes map to the
/// `Unknown` sentinel rather than being dropped.
const FILTER_TABLE: &[FilterEntry] = &[
    FilterEntry {
        code: "58061214",
        category: "Child",
        description: "The input prompt requests content depicting a child.",
        filtered: "input prompt",
    },
    FilterEntry {
        code: "17301594",
        category: "Child",
        description: "The input image contains a depiction of a child.",
        filtered: "input image",
    },
    FilterEntry {
        code: "15236754",
        category: "Child",
        description: "Generated content depicting a child was removed.",
        filtered: "generated output",
    },
    FilterEntry {
        code: "29310472",
        category: "Celebrity",
        description: "The input requests a photorealistic depiction of a celebrity.",
        filtered: "input prompt",
    },
    FilterEntry {
        code: "15336597",
        category: "Celebrity",
        description: "Generated content resembling a celebrity was removed.",
        filtered: "generated output",
    },
    FilterEntry {
        code: "62263041",
        category: "Dangerous Content",
        description: "The input prompt requests dangerous or harmful content.",
        filtered: "input prompt",
    },
    FilterEntry {
        code: "64151117",
        category: "Dangerous Content",
        description: "Generated dangerous or harmful content was removed.",
        filtered: "generated output",
    },
    FilterEntry {
        code: "57734940",
        category: "Hate",
        description: "The input prompt contains hateful content.",
        filtered: "input prompt",
    },
    FilterEntry {
        code: "22137204",
        category: "Hate",
        description: "Generated hateful content was removed.",
        filtered: "generated output",
    },
    FilterEntry {
        code: "39322892",
        category: "People/Face",
        description: "Person or face generation is not allowed for this request.",
        filtered: "input image",
    },
    FilterEntry {
        code: "92201652",
        category: "Personal Information",
        description: "The input contains personally identifiable information.",
        filtered: "input prompt",
    },
    FilterEntry {
        code: "89371032",
        category: "Prohibited Content",
        description: "The input prompt requests prohibited content.",
        filtered: "input prompt",
    },
    FilterEntry {
        code: "90789179",
        category: "Sexual",
        description: "The input prompt requests sexually explicit content.",
        filtered: "input prompt",
    },
    FilterEntry {
        code: "63429089",
        category: "Sexual",
        description: "Generated sexually explicit content was removed.",
        filtered: "generated output",
    },
    FilterEntry {
        code: "78610348",
        category: "Toxic",
        description: "The input prompt contains toxic language.",
        filtered: "input prompt",
    },
    FilterEntry {
        code: "61493863",
        category: "Violence",
        description: "The input requests violent content.",
        filtered: "input prompt",
    },
    FilterEntry {
        code: "56562880",
        category: "Violence",
        description: "Generated violent content was removed.",
        filtered: "generated output",
    },
    FilterEntry {
        code: "32635315",
        category: "Vulgar",
        description: "The input prompt contains vulgar language.",
        filtered: "input prompt",
    },
];

/// Description used for codes absent from the table.
const UNKNOWN_DESCRIPTION: &str = "An unknown safety filter was triggered.";

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Look up a single support code.
pub fn lookup_code(code: &str) -> SafetyReason {
    match FILTER_TABLE.iter().find(|entry| entry.code == code) {
        Some(entry) => SafetyReason {
            code: code.to_string(),
            category: entry.category.to_string(),
            description: entry.description.to_string(),
            filtered: entry.filtered.to_string(),
        },
        None => SafetyReason {
            code: code.to_string(),
            category: "Unknown".to_string(),
            description: UNKNOWN_DESCRIPTION.to_string(),
            filtered: "N/A".to_string(),
        },
    }
}

/// Extract every support code embedded in `raw_text` and map each through
/// the table.
///
/// Codes are deduplicated preserving first-seen order. Returns an empty
/// vec when the text carries no support-code marker, which means the
/// failure was not a content-safety rejection.
pub fn classify_rejection(raw_text: &str) -> Vec<SafetyReason> {
    let mut codes: Vec<&str> = Vec::new();
    for capture in SUPPORT_CODES_RE.captures_iter(raw_text) {
        let list = capture.get(1).map_or("", |m| m.as_str());
        for code in list.split(',') {
            let code = code.trim();
            if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) && !codes.contains(&code)
            {
                codes.push(code);
            }
        }
    }

    codes.into_iter().map(lookup_code).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_error_text_yields_no_reasons() {
        assert!(classify_rejection("INTERNAL: upstream deadline exceeded").is_empty());
    }

    #[test]
    fn single_known_code_is_mapped() {
        let reasons = classify_rejection(
            "Video generation failed. Support codes: 58061214",
        );
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].code, "58061214");
        assert_eq!(reasons[0].category, "Child");
    }

    #[test]
    fn two_codes_yield_two_reasons() {
        let reasons = classify_rejection(
            "The response is blocked. Support codes: 62263041, 90789179",
        );
        assert_eq!(reasons.len(), 2);
        assert_eq!(reasons[0].category, "Dangerous Content");
        assert_eq!(reasons[1].category, "Sexual");
    }

    #[test]
    fn unknown_code_maps_to_unknown_category() {
        let reasons = classify_rejection("blocked: Support codes: 1234");
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].code, "1234");
        assert_eq!(reasons[0].category, "Unknown");
    }

    #[test]
    fn duplicate_codes_are_collapsed() {
        let reasons = classify_rejection(
            "Support codes: 58061214, 58061214. Retried. Support codes: 58061214",
        );
        assert_eq!(reasons.len(), 1);
    }

    #[test]
    fn multiple_markers_preserve_first_seen_order() {
        let reasons =
            classify_rejection("a Support codes: 32635315 b Support codes: 58061214");
        let codes: Vec<&str> = reasons.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["32635315", "58061214"]);
    }

    #[test]
    fn non_numeric_fragments_are_ignored() {
        let reasons = classify_rejection("Support codes: , 58061214,  ,");
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].code, "58061214");
    }
}
