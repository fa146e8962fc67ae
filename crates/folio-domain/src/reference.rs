//! Reference datasets and reconciled records

use crate::{MatchConfidence, Record};
use serde::Serialize;

/// A read-only reference dataset
///
/// Column order is kept so identifier detection follows the header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl ReferenceSet {
    /// Create a reference set from its header and rows
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    /// Column names in header order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in input order
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The column carrying unique identifiers, if one can be detected
    pub fn identifier_column(&self) -> Option<&str> {
        detect_identifier_column(&self.columns)
    }

    /// True if some row has `id` in column `column`
    pub fn contains_id(&self, column: &str, id: &str) -> bool {
        let id = id.trim();
        self.rows
            .iter()
            .any(|row| row.get(column).map(|v| v.trim() == id).unwrap_or(false))
    }
}

/// Detect the identifier column by name
///
/// In order of preference: a column whose name contains `uuid`, a column
/// named exactly `id`, then a column with `id` as a separate word
/// (`topic_id`, `Topic ID`). Matching is case-insensitive.
///
/// # Examples
///
/// ```
/// use folio_domain::detect_identifier_column;
///
/// let cols = vec!["title".to_string(), "Topic UUID".to_string()];
/// assert_eq!(detect_identifier_column(&cols), Some("Topic UUID"));
///
/// let cols = vec!["guide".to_string(), "title".to_string()];
/// assert_eq!(detect_identifier_column(&cols), None);
/// ```
pub fn detect_identifier_column(columns: &[String]) -> Option<&str> {
    let lowered: Vec<String> = columns.iter().map(|c| c.trim().to_lowercase()).collect();

    let found = lowered
        .iter()
        .position(|c| c.contains("uuid"))
        .or_else(|| lowered.iter().position(|c| c == "id"))
        .or_else(|| {
            lowered.iter().position(|c| {
                c.split(|ch: char| !ch.is_alphanumeric())
                    .any(|word| word == "id")
            })
        });

    found.map(|idx| columns[idx].as_str())
}

/// An extracted record annotated with its best reference match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedRecord {
    /// The extracted record, unchanged
    #[serde(flatten)]
    pub record: Record,
    /// Identifier of the matching reference row, if any
    pub matched_id: Option<String>,
    /// Confidence of the match
    pub confidence: MatchConfidence,
    /// Why the match was made (or not)
    pub rationale: String,
    /// What the reference row lacks relative to the extracted record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_notes: Option<String>,
}

impl MatchedRecord {
    /// A record with no match
    pub fn unmatched(record: Record, rationale: impl Into<String>) -> Self {
        Self {
            record,
            matched_id: None,
            confidence: MatchConfidence::NONE,
            rationale: rationale.into(),
            gap_notes: None,
        }
    }
}
