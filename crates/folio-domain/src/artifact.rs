//! Generation requests and their normalized artifacts

use crate::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One structured record: field name to string value
pub type Record = BTreeMap<String, String>;

/// Output format a generation request must produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatContract {
    /// Raw CSV text with a header row
    Csv,
    /// JSON array of records carrying the named fields
    Records {
        /// Required field names, in prompt order
        fields: Vec<String>,
    },
}

impl FormatContract {
    /// Build a record contract from field names
    pub fn records<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FormatContract::Records {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Cache entry kind used to persist artifacts of this contract
    pub fn entry_kind(&self) -> EntryKind {
        match self {
            FormatContract::Csv => EntryKind::Csv,
            FormatContract::Records { .. } => EntryKind::Json,
        }
    }
}

/// Kinds of entries kept in the result cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Extracted document text
    Text,
    /// Generated CSV artifact
    Csv,
    /// Generated record artifact, serialized as JSON
    Json,
}

impl EntryKind {
    /// All entry kinds
    pub const ALL: [EntryKind; 3] = [EntryKind::Text, EntryKind::Csv, EntryKind::Json];

    /// File extension for this kind
    pub fn extension(self) -> &'static str {
        match self {
            EntryKind::Text => "txt",
            EntryKind::Csv => "csv",
            EntryKind::Json => "json",
        }
    }

    /// Reverse of [`EntryKind::extension`]
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.extension() == ext)
    }
}

/// A request to turn a text payload into an artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Text the instruction applies to
    pub payload: String,
    /// User instruction
    pub instruction: String,
    /// Required output format
    pub contract: FormatContract,
}

impl GenerationRequest {
    /// Create a new request
    pub fn new(
        payload: impl Into<String>,
        instruction: impl Into<String>,
        contract: FormatContract,
    ) -> Self {
        Self {
            payload: payload.into(),
            instruction: instruction.into(),
            contract,
        }
    }

    /// Cache key: fingerprint of payload and instruction
    ///
    /// The contract is not part of the key; it selects the entry kind instead.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_pair(self.payload.as_bytes(), self.instruction.as_bytes())
    }
}

/// Normalized output of a generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedArtifact {
    /// CSV text, fences removed
    Csv(String),
    /// Ordered structured records
    Records(Vec<Record>),
}

impl GeneratedArtifact {
    /// Data rows: CSV lines after the header, or the record count
    pub fn row_count(&self) -> usize {
        match self {
            GeneratedArtifact::Csv(csv) => csv
                .lines()
                .filter(|line| !line.trim().is_empty())
                .count()
                .saturating_sub(1),
            GeneratedArtifact::Records(records) => records.len(),
        }
    }

    /// Borrow the records, if this is a record artifact
    pub fn as_records(&self) -> Option<&[Record]> {
        match self {
            GeneratedArtifact::Records(records) => Some(records),
            GeneratedArtifact::Csv(_) => None,
        }
    }

    /// Borrow the CSV text, if this is a CSV artifact
    pub fn as_csv(&self) -> Option<&str> {
        match self {
            GeneratedArtifact::Csv(csv) => Some(csv),
            GeneratedArtifact::Records(_) => None,
        }
    }
}
