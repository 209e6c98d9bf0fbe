//! Interpretation of vision service responses
//!
//! A response is first searched for a JSON object carrying both
//! `crack_type` and `repair_level`. When none is found the raw text is
//! scanned for known labels instead.

use serde_json::Value;

use super::types::{Classification, ClassificationSource, CrackType, RepairLevel};
use crate::shared::llm::parse_json_lenient;

/// Envelope keys that hold the generated output, checked in order
const ENVELOPE_KEYS: [&str; 4] = ["output", "results", "generations", "choices"];

/// Nesting limit when searching a response document
const MAX_SEARCH_DEPTH: usize = 8;

pub fn parse_response(body: &str) -> Classification {
    if let Ok(document) = serde_json::from_str::<Value>(body) {
        if let Some((crack_type, repair_level)) = structured_labels(&document) {
            return Classification {
                crack_type,
                repair_level,
                raw: body.to_string(),
                source: ClassificationSource::Structured,
            };
        }
    }

    keyword_classification(body)
}

/// First matching label of each kind in the lower-cased text.
///
/// Defaults to `unknown` / `low` when nothing matches.
pub fn keyword_classification(body: &str) -> Classification {
    let text = body.to_lowercase();

    let crack_type = CrackType::KEYWORD_ORDER
        .into_iter()
        .find(|t| text.contains(t.label()))
        .unwrap_or(CrackType::Unknown);

    let repair_level = RepairLevel::KEYWORD_ORDER
        .into_iter()
        .find(|l| text.contains(l.label()))
        .unwrap_or(RepairLevel::Low);

    Classification {
        crack_type,
        repair_level,
        raw: body.to_string(),
        source: ClassificationSource::Keyword,
    }
}

fn structured_labels(document: &Value) -> Option<(CrackType, RepairLevel)> {
    let scope = match document {
        Value::Object(map) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .unwrap_or(document),
        _ => document,
    };

    find_labels(scope, 0)
}

fn find_labels(value: &Value, depth: usize) -> Option<(CrackType, RepairLevel)> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }

    match value {
        Value::Object(map) => {
            if let (Some(crack), Some(repair)) = (map.get("crack_type"), map.get("repair_level")) {
                let labels = crack
                    .as_str()
                    .and_then(CrackType::from_label)
                    .zip(repair.as_str().and_then(RepairLevel::from_label));
                if labels.is_some() {
                    return labels;
                }
            }
            map.values().find_map(|v| find_labels(v, depth + 1))
        }
        Value::Array(items) => items.iter().find_map(|v| find_labels(v, depth + 1)),
        // Generated text often carries the JSON answer as a string
        Value::String(text) if text.contains('{') => parse_json_lenient(text)
            .ok()
            .and_then(|inner| find_labels(&inner, depth + 1)),
        _ => None,
    }
}
