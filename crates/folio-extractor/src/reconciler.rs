//! Match extracted records against a reference dataset
//!
//! Reconciliation is all-or-nothing: a response that does not parse fails
//! the whole job with the raw output attached. It is never cached, since
//! the result depends on the reference set supplied.

use crate::client::GenerationClient;
use crate::config::{PipelineConfig, ReconcileMode};
use crate::error::ExtractorError;
use crate::normalizer::normalize_records;
use crate::prompt::{ReconcilePromptBuilder, ITEM_INDEX_FIELD};
use crate::types::Reconciliation;
use folio_domain::traits::LlmProvider;
use folio_domain::{MatchConfidence, MatchedRecord, Record, ReferenceSet};
use std::fmt::Display;
use tracing::{debug, info, warn};

const ID_FIELDS: &[&str] = &["matched_uuid", "matched_id", "uuid"];
const CONFIDENCE_FIELDS: &[&str] = &["confidence_score", "match_confidence", "confidence"];
const RATIONALE_FIELDS: &[&str] = &["match_reason", "rationale", "reason"];
const GAP_FIELDS: &[&str] = &["why_lesser", "why_it_lesser", "gap_notes", "missing"];
const SUMMARY_FIELDS: &[&str] = &["pdf_summary", "summary", "overview"];

/// First non-empty value among `fields`
fn pick<'a>(row: &'a Record, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|f| row.get(*f))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
}

fn pick_id(row: &Record) -> Option<String> {
    pick(row, ID_FIELDS)
        .filter(|v| !matches!(v.to_ascii_lowercase().as_str(), "null" | "none" | "n/a"))
        .map(str::to_string)
}

fn item_index(row: &Record) -> Option<usize> {
    row.get(ITEM_INDEX_FIELD)
        .and_then(|v| v.trim().parse::<usize>().ok())
}

/// True for a row carrying the document summary rather than an answer
///
/// Padding such as `"confidence_score": "0%"` is tolerated; a row with an
/// item index or a usable identifier is an answer.
fn is_summary_row(row: &Record) -> bool {
    pick(row, SUMMARY_FIELDS).is_some() && item_index(row).is_none() && pick_id(row).is_none()
}

/// Reconciles extracted records with reference rows via the model
pub struct Reconciler<L: LlmProvider> {
    client: GenerationClient<L>,
    config: PipelineConfig,
}

impl<L> Reconciler<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a new reconciler
    pub fn new(provider: L, config: PipelineConfig) -> Self {
        let client = GenerationClient::new(provider, config.generation_timeout());
        Self::with_client(client, config)
    }

    /// Create a reconciler around an existing client
    pub fn with_client(client: GenerationClient<L>, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    /// Match every record against `reference`
    ///
    /// Fails before any model call when the reference set has no
    /// identifier column. Returns one `MatchedRecord` per input record, in
    /// input order.
    pub async fn reconcile(
        &self,
        records: &[Record],
        reference: &ReferenceSet,
    ) -> Result<Reconciliation, ExtractorError> {
        let identifier_column = reference
            .identifier_column()
            .ok_or_else(|| ExtractorError::MissingIdentifierColumn {
                columns: reference.columns().to_vec(),
            })?
            .to_string();

        let ref_limit = self.config.reference_row_limit.min(reference.len());
        if ref_limit < reference.len() {
            warn!(
                "Reference set truncated to {} of {} rows for matching",
                ref_limit,
                reference.len()
            );
        }
        let reference_rows = &reference.rows()[..ref_limit];

        let sent = self.config.extracted_record_limit.min(records.len());
        if sent < records.len() {
            warn!(
                "Only the first {} of {} records are sent for matching",
                sent,
                records.len()
            );
        }

        info!(
            "Reconciling {} records against {} reference rows (identifier column '{}', {:?} mode)",
            sent, ref_limit, identifier_column, self.config.reconcile_mode
        );

        let mut answers: Vec<Option<Record>> = vec![None; sent];
        let mut summary = None;

        if sent > 0 {
            match self.config.reconcile_mode {
                ReconcileMode::Batch => {
                    let indexed: Vec<(usize, &Record)> = records[..sent].iter().enumerate().collect();
                    let prompt = ReconcilePromptBuilder::new(&indexed, reference_rows, &identifier_column).build();
                    let rows = self.request_rows(&prompt).await?;
                    summary = assign_rows(rows, &mut answers);
                }
                ReconcileMode::PerRecord => {
                    for (idx, record) in records[..sent].iter().enumerate() {
                        debug!("Matching record {}/{}", idx + 1, sent);
                        let indexed = [(idx, record)];
                        let prompt = ReconcilePromptBuilder::new(&indexed, reference_rows, &identifier_column)
                            .with_summary(false)
                            .build();
                        let rows = self.request_rows(&prompt).await?;
                        answers[idx] = rows.into_iter().find(|row| !is_summary_row(row));
                    }
                }
            }
        }

        let mut discarded_ids = Vec::new();
        let mut matches = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            let matched = match answers.get_mut(idx).and_then(Option::take) {
                Some(row) => build_match(record.clone(), &row, reference, &identifier_column, &mut discarded_ids),
                None if idx < sent => MatchedRecord::unmatched(record.clone(), "No answer returned for this record"),
                None => MatchedRecord::unmatched(record.clone(), "Not sent for matching (record limit reached)"),
            };
            matches.push(matched);
        }

        let reconciliation = Reconciliation {
            matches,
            summary,
            identifier_column,
            reference_rows_sent: ref_limit,
            records_sent: sent,
            discarded_ids,
        };
        info!(
            "Reconciliation complete: {}/{} matched",
            reconciliation.matched_count(),
            records.len()
        );
        Ok(reconciliation)
    }

    async fn request_rows(&self, prompt: &str) -> Result<Vec<Record>, ExtractorError> {
        let raw = self.client.complete(prompt).await?;
        normalize_records(&raw).ok_or_else(|| ExtractorError::Matching {
            reason: "response is not a JSON array of objects".to_string(),
            raw_response: raw,
        })
    }
}

/// Place answer rows at their `item_index` (or position) and return the
/// trailing summary, if any
fn assign_rows(mut rows: Vec<Record>, answers: &mut [Option<Record>]) -> Option<String> {
    let summary = rows
        .last()
        .filter(|last| is_summary_row(last))
        .and_then(|last| pick(last, SUMMARY_FIELDS))
        .map(str::to_string);
    if summary.is_some() {
        rows.pop();
    }

    let mut unplaced = Vec::new();
    for (position, row) in rows.into_iter().enumerate() {
        let slot = item_index(&row).filter(|idx| *idx < answers.len() && answers[*idx].is_none());
        match slot {
            Some(idx) => answers[idx] = Some(row),
            None => unplaced.push((position, row)),
        }
    }

    // Rows without a usable index fall back to their position
    for (position, row) in unplaced {
        match answers.get_mut(position) {
            Some(slot) if slot.is_none() => *slot = Some(row),
            _ => warn!("Dropping answer row {} with no free slot", position),
        }
    }
    summary
}

fn build_match(
    record: Record,
    row: &Record,
    reference: &ReferenceSet,
    identifier_column: &str,
    discarded_ids: &mut Vec<String>,
) -> MatchedRecord {
    let mut rationale = pick(row, RATIONALE_FIELDS).unwrap_or_default().to_string();
    let gap_notes = pick(row, GAP_FIELDS).map(str::to_string);
    let mut confidence = pick(row, CONFIDENCE_FIELDS)
        .and_then(MatchConfidence::parse)
        .unwrap_or(MatchConfidence::NONE);

    let matched_id = match pick_id(row) {
        Some(id) if reference.contains_id(identifier_column, &id) => Some(id),
        Some(id) => {
            warn!("Discarding identifier '{}' not present in the reference set", id);
            if !rationale.is_empty() {
                rationale.push(' ');
            }
            rationale.push_str(&format!("(discarded unknown identifier '{}')", id));
            discarded_ids.push(id);
            None
        }
        None => None,
    };
    if matched_id.is_none() {
        confidence = MatchConfidence::NONE;
    }

    MatchedRecord {
        record,
        matched_id,
        confidence,
        rationale,
        gap_notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_summary_row_detection() {
        assert!(is_summary_row(&rec(&[("pdf_summary", "About cells")])));
        assert!(is_summary_row(&rec(&[("summary", "x"), ("matched_uuid", "")])));
        assert!(!is_summary_row(&rec(&[("pdf_summary", ""), ("matched_uuid", "A")])));
        assert!(!is_summary_row(&rec(&[("pdf_summary", "x"), ("matched_uuid", "A")])));
        assert!(!is_summary_row(&rec(&[("pdf_summary", "x"), (ITEM_INDEX_FIELD, "0")])));
        assert!(is_summary_row(&rec(&[
            ("pdf_summary", "x"),
            ("matched_uuid", "null"),
            ("confidence_score", "0%"),
        ])));
    }

    #[test]
    fn test_padded_summary_row_is_separated() {
        let rows = vec![
            rec(&[(ITEM_INDEX_FIELD, "0"), ("matched_uuid", "a")]),
            rec(&[(ITEM_INDEX_FIELD, "1"), ("matched_uuid", "b")]),
            rec(&[
                ("pdf_summary", "A biology text"),
                ("matched_uuid", ""),
                ("confidence_score", "0%"),
            ]),
        ];
        let mut answers = vec![None, None, None];

        let summary = assign_rows(rows, &mut answers);

        assert_eq!(summary.as_deref(), Some("A biology text"));
        assert_eq!(answers[0].as_ref().unwrap()["matched_uuid"], "a");
        assert_eq!(answers[1].as_ref().unwrap()["matched_uuid"], "b");
        assert!(answers[2].is_none());
    }

    #[test]
    fn test_pick_id_ignores_null_words() {
        assert_eq!(pick_id(&rec(&[("matched_uuid", "null")])), None);
        assert_eq!(pick_id(&rec(&[("matched_id", " R-1 ")])), Some("R-1".to_string()));
        assert_eq!(pick_id(&rec(&[("matched_uuid", ""), ("uuid", "U")])), Some("U".to_string()));
    }

    #[test]
    fn test_assign_rows_by_index_then_position() {
        let rows = vec![
            rec(&[(ITEM_INDEX_FIELD, "2"), ("matched_uuid", "c")]),
            rec(&[("matched_uuid", "a")]),
            rec(&[(ITEM_INDEX_FIELD, "9"), ("matched_uuid", "b")]),
            rec(&[("pdf_summary", "A biology text")]),
        ];
        let mut answers = vec![None, None, None];

        let summary = assign_rows(rows, &mut answers);

        assert_eq!(summary.as_deref(), Some("A biology text"));
        assert_eq!(answers[2].as_ref().unwrap()["matched_uuid"], "c");
        assert_eq!(answers[1].as_ref().unwrap()["matched_uuid"], "a");
        // Out-of-range index falls back to position 2, which is taken
        assert!(answers[0].is_none());
    }

    #[test]
    fn test_build_match_normalizes_field_variants() {
        let reference = ReferenceSet::new(
            vec!["uuid".to_string()],
            vec![rec(&[("uuid", "U1")])],
        );
        let row = rec(&[
            ("matched_id", "U1"),
            ("match_confidence", "0.85"),
            ("reason", "same topic"),
            ("missing", "no lab section"),
        ]);
        let mut discarded = Vec::new();

        let m = build_match(rec(&[("title", "Cells")]), &row, &reference, "uuid", &mut discarded);

        assert_eq!(m.matched_id.as_deref(), Some("U1"));
        assert_eq!(m.confidence.value(), 85);
        assert_eq!(m.rationale, "same topic");
        assert_eq!(m.gap_notes.as_deref(), Some("no lab section"));
        assert!(discarded.is_empty());
    }

    #[test]
    fn test_build_match_discards_unknown_id() {
        let reference = ReferenceSet::new(vec!["id".to_string()], vec![rec(&[("id", "R1")])]);
        let row = rec(&[("matched_uuid", "R999"), ("confidence_score", "90%"), ("match_reason", "close")]);
        let mut discarded = Vec::new();

        let m = build_match(Record::new(), &row, &reference, "id", &mut discarded);

        assert_eq!(m.matched_id, None);
        assert_eq!(m.confidence, MatchConfidence::NONE);
        assert!(m.rationale.starts_with("close"));
        assert!(m.rationale.contains("R999"));
        assert_eq!(discarded, vec!["R999".to_string()]);
    }
}
