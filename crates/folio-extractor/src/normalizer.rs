//! Recover structured data from raw model output
//!
//! Model output is untrusted. The normalizer applies an ordered list of
//! named repair passes and then tries progressively looser parses. It
//! never fails: unusable output comes back as `None`.

use folio_domain::{FormatContract, GeneratedArtifact, Record};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, trace, warn};

/// A single text repair applied before parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairPass {
    /// Remove surrounding code-fence markers and whitespace
    StripFences,
    /// Remove commas directly before `]` or `}`
    RemoveTrailingCommas,
    /// Replace line breaks with spaces
    CollapseNewlines,
}

/// Passes applied to JSON output, in order
pub const JSON_REPAIR_PASSES: [RepairPass; 3] = [
    RepairPass::StripFences,
    RepairPass::RemoveTrailingCommas,
    RepairPass::CollapseNewlines,
];

impl RepairPass {
    /// Pass name, for logs
    pub fn name(self) -> &'static str {
        match self {
            RepairPass::StripFences => "strip_fences",
            RepairPass::RemoveTrailingCommas => "remove_trailing_commas",
            RepairPass::CollapseNewlines => "collapse_newlines",
        }
    }

    /// Apply this pass
    pub fn apply(self, text: &str) -> String {
        match self {
            RepairPass::StripFences => strip_fences(text).to_string(),
            RepairPass::RemoveTrailingCommas => trailing_comma_re().replace_all(text, "$1").into_owned(),
            RepairPass::CollapseNewlines => text.replace("\r\n", " ").replace(['\n', '\r'], " "),
        }
    }
}

fn trailing_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*([\]}])").expect("valid regex"))
}

fn array_span_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("valid regex"))
}

/// Remove one leading fence line (```` ``` ```` with optional language tag)
/// and one trailing fence, then trim
fn strip_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // Language tag runs to the end of the fence line
        s = match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => rest.trim_start_matches(|c: char| c.is_alphanumeric()),
        };
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Normalize output for the CSV contract
///
/// Returns the fence-free, trimmed CSV, or `None` when nothing but
/// whitespace is left.
pub fn normalize_csv(raw: &str) -> Option<String> {
    let cleaned = strip_fences(raw);
    if cleaned.lines().any(|line| !line.trim().is_empty()) {
        Some(cleaned.to_string())
    } else {
        None
    }
}

/// Parse output as a JSON array of objects
///
/// Repair passes run first, then a strict parse, then a parse of the
/// widest `[...]` span. Elements that are not objects are skipped.
pub fn parse_json_objects(raw: &str) -> Option<Vec<serde_json::Map<String, Value>>> {
    let mut cleaned = raw.to_string();
    for pass in JSON_REPAIR_PASSES {
        cleaned = pass.apply(&cleaned);
        trace!("Applied repair pass {}", pass.name());
    }

    let value = match serde_json::from_str::<Value>(&cleaned) {
        Ok(value @ Value::Array(_)) => value,
        _ => {
            let span = array_span_re().find(&cleaned)?;
            debug!("Strict parse failed, trying array span of {} chars", span.len());
            serde_json::from_str::<Value>(span.as_str()).ok()?
        }
    };

    let Value::Array(items) = value else {
        return None;
    };

    let total = items.len();
    let objects: Vec<_> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    if objects.len() < total {
        warn!("Skipped {} non-object array elements", total - objects.len());
    }
    Some(objects)
}

/// Normalize output for the record contract
///
/// Every value is coerced to a string: `null` becomes empty, numbers and
/// booleans their JSON text, nested values their compact JSON.
pub fn normalize_records(raw: &str) -> Option<Vec<Record>> {
    parse_json_objects(raw).map(|objects| objects.into_iter().map(to_record).collect())
}

fn to_record(object: serde_json::Map<String, Value>) -> Record {
    object
        .into_iter()
        .map(|(k, v)| {
            let v = match v {
                Value::Null => String::new(),
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, v)
        })
        .collect()
}

/// Normalize raw output against a contract
pub fn normalize(raw: &str, contract: &FormatContract) -> Option<GeneratedArtifact> {
    match contract {
        FormatContract::Csv => normalize_csv(raw).map(GeneratedArtifact::Csv),
        FormatContract::Records { .. } => normalize_records(raw).map(GeneratedArtifact::Records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_with_language_tag() {
        assert_eq!(strip_fences("```csv\na,b\n1,2\n```"), "a,b\n1,2");
        assert_eq!(strip_fences("  ```json\n[]\n```  "), "[]");
        assert_eq!(strip_fences("```[1]```"), "[1]");
        assert_eq!(strip_fences("plain"), "plain");
    }

    #[test]
    fn test_remove_trailing_commas() {
        let fixed = RepairPass::RemoveTrailingCommas.apply(r#"[{"a": "1",}, {"b": "2"},]"#);
        assert_eq!(fixed, r#"[{"a": "1"}, {"b": "2"}]"#);
    }

    #[test]
    fn test_collapse_newlines() {
        assert_eq!(RepairPass::CollapseNewlines.apply("a\r\nb\nc"), "a b c");
    }

    #[test]
    fn test_fenced_with_trailing_comma_equals_clean() {
        let messy = "```json\n[\n  {\"title\": \"Cells\", \"page\": \"1\"},\n]\n```";
        let clean = r#"[{"title": "Cells", "page": "1"}]"#;
        assert_eq!(normalize_records(messy), normalize_records(clean));
        assert_eq!(normalize_records(clean).map(|r| r.len()), Some(1));
    }

    #[test]
    fn test_embedded_newline_in_string_recovered() {
        let raw = "[{\"description\": \"line one\nline two\"}]";
        let records = normalize_records(raw).unwrap();
        assert_eq!(records[0]["description"], "line one line two");
    }

    #[test]
    fn test_array_span_inside_prose() {
        let raw = "Sure! Here is the data:\n[{\"a\": \"1\"}]\nLet me know if you need more.";
        let records = normalize_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["a"], "1");
    }

    #[test]
    fn test_garbage_is_no_data() {
        assert_eq!(normalize_records("I could not find anything."), None);
        assert_eq!(normalize_records(""), None);
        assert_eq!(normalize_records("[not json]"), None);
        assert_eq!(normalize_records(r#"{"a": "1"}"#), None);
    }

    #[test]
    fn test_values_coerced_to_strings() {
        let raw = r#"[{"n": 85, "f": 0.5, "b": true, "z": null, "l": [1, 2]}]"#;
        let records = normalize_records(raw).unwrap();
        let r = &records[0];
        assert_eq!(r["n"], "85");
        assert_eq!(r["f"], "0.5");
        assert_eq!(r["b"], "true");
        assert_eq!(r["z"], "");
        assert_eq!(r["l"], "[1,2]");
    }

    #[test]
    fn test_non_objects_skipped() {
        let records = normalize_records(r#"[1, {"a": "x"}, "s"]"#).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_csv_normalization() {
        assert_eq!(
            normalize_csv("```csv\ndate,event\n2024-01-01,launch\n```"),
            Some("date,event\n2024-01-01,launch".to_string())
        );
        assert_eq!(normalize_csv("```csv\n\n```"), None);
        assert_eq!(normalize_csv("   "), None);
    }

    #[test]
    fn test_normalize_dispatches_on_contract() {
        let csv = normalize("a\n1", &FormatContract::Csv).unwrap();
        assert_eq!(csv.as_csv(), Some("a\n1"));

        let records = normalize("[]", &FormatContract::records(["a"])).unwrap();
        assert_eq!(records.as_records().map(|r| r.len()), Some(0));
    }
}
