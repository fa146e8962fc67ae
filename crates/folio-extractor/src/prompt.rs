//! Prompt construction for generation and reconciliation
//!
//! Prompts are pure functions of their inputs. Generation results are
//! cached by payload and instruction, so a builder must never mix in
//! anything else (timestamps, chunk positions, model names).

use folio_domain::{FormatContract, Record};
use serde_json::{json, Value};

/// Field carrying a record's position in a reconciliation prompt
pub const ITEM_INDEX_FIELD: &str = "item_index";

/// Builds generation prompts
pub struct PromptBuilder<'a> {
    text: &'a str,
    instruction: &'a str,
    contract: &'a FormatContract,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(text: &'a str, instruction: &'a str, contract: &'a FormatContract) -> Self {
        Self {
            text,
            instruction,
            contract,
        }
    }

    /// Build the complete generation prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(ROLE);
        prompt.push_str("\n\n");
        prompt.push_str(&format!("User request: \"{}\"\n\n", self.instruction.trim()));

        match self.contract {
            FormatContract::Csv => prompt.push_str(CSV_RULES),
            FormatContract::Records { fields } => {
                prompt.push_str(RECORD_RULES);
                prompt.push_str("\n\nRequired fields (every object must have all of them, as strings):\n");
                for field in fields {
                    prompt.push_str(&format!("- \"{}\"\n", field));
                }
                prompt.push_str(&format!("\nExample:\n{}", record_example(fields)));
            }
        }

        prompt.push_str("\n\n--- PDF Text ---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n--- End PDF Text ---\n");
        prompt
    }
}

fn record_example(fields: &[String]) -> String {
    let example: serde_json::Map<String, Value> = fields
        .iter()
        .map(|f| (f.clone(), Value::String("...".to_string())))
        .collect();
    Value::Array(vec![Value::Object(example)]).to_string()
}

const ROLE: &str = "You are an expert data analyst. Extract information from the provided PDF text \
and format it according to the user's request.";

const CSV_RULES: &str = r#"Rules:
1. CSV only: the entire output must be valid CSV (RFC 4180).
2. Header row: the first line must be a descriptive header row.
3. No extra text: no explanations, no notes, no markdown, no code fences such as ```csv. Output only the raw CSV data."#;

const RECORD_RULES: &str = r#"Rules:
1. JSON only: the entire output must be a single JSON array of objects.
2. No extra text: no explanations, no notes, no markdown, no code fences such as ```json.
3. Use an empty string for a field the text does not provide."#;

/// Builds reconciliation prompts
///
/// Each extracted record is sent with an `item_index` so answers can be
/// mapped back to their input even if the model reorders or drops rows.
pub struct ReconcilePromptBuilder<'a> {
    records: &'a [(usize, &'a Record)],
    reference: &'a [Record],
    identifier_column: &'a str,
    with_summary: bool,
}

impl<'a> ReconcilePromptBuilder<'a> {
    /// Create a new builder over indexed records and reference rows
    pub fn new(
        records: &'a [(usize, &'a Record)],
        reference: &'a [Record],
        identifier_column: &'a str,
    ) -> Self {
        Self {
            records,
            reference,
            identifier_column,
            with_summary: true,
        }
    }

    /// Ask (or not) for a trailing document summary row
    pub fn with_summary(mut self, with_summary: bool) -> Self {
        self.with_summary = with_summary;
        self
    }

    /// Build the complete reconciliation prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(MATCH_INSTRUCTIONS);
        prompt.push_str(&format!(
            "\n\nThe reference identifier column is \"{}\". \"matched_uuid\" must be copied \
             exactly from that column, or be null when nothing matches.\n",
            self.identifier_column
        ));

        if self.with_summary {
            prompt.push_str(SUMMARY_INSTRUCTIONS);
        }

        prompt.push_str("\nOutput format (JSON array only, no additional text, no code fences):\n");
        prompt.push_str(&self.output_example());

        prompt.push_str(&format!(
            "\n\nReference rows ({} rows):\n{}\n",
            self.reference.len(),
            pretty(&json!(self.reference))
        ));

        let indexed: Vec<Value> = self
            .records
            .iter()
            .map(|(idx, record)| {
                let mut obj = serde_json::Map::new();
                for (k, v) in record.iter() {
                    obj.insert(k.clone(), Value::String(v.clone()));
                }
                // Inserted last so a record's own item_index cannot replace it
                obj.insert(ITEM_INDEX_FIELD.to_string(), json!(idx));
                Value::Object(obj)
            })
            .collect();

        prompt.push_str(&format!(
            "\nExtracted records ({} records):\n{}\n",
            indexed.len(),
            pretty(&Value::Array(indexed))
        ));
        prompt
    }

    fn output_example(&self) -> String {
        let mut rows = vec![json!({
            ITEM_INDEX_FIELD: 0,
            "matched_uuid": "...",
            "confidence_score": 85,
            "match_reason": "...",
            "why_lesser": "..."
        })];
        if self.with_summary {
            rows.push(json!({ "pdf_summary": "This document covers ..." }));
        }
        pretty(&Value::Array(rows))
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

const MATCH_INSTRUCTIONS: &str = r#"You are matching records extracted from a PDF against a reference dataset.

Task:
1. For each extracted record, find the reference row that best matches it by meaning, comparing titles, topics and descriptions.
2. For each extracted record output one object with:
   - "item_index": the item_index of the extracted record, unchanged
   - "matched_uuid": identifier of the best reference row, or null
   - "confidence_score": how well it matched, from 0 to 100
   - "match_reason": a short reason for the match
   - "why_lesser": what the reference row is missing compared with the extracted record"#;

const SUMMARY_INSTRUCTIONS: &str = r#"3. Add at the end ONE extra object with the single key "pdf_summary": a very short (1-2 sentence) summary of what the document is about.
"#;
