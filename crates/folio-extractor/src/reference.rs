//! CSV-backed reference datasets

use crate::error::ExtractorError;
use folio_domain::traits::TableSource;
use folio_domain::{Record, ReferenceSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// Loads a reference dataset from a CSV file with a header row
#[derive(Debug, Clone)]
pub struct CsvTableSource {
    path: PathBuf,
}

impl CsvTableSource {
    /// Create a source for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File being read
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for CsvTableSource {
    type Error = ExtractorError;

    fn load(&self) -> Result<ReferenceSet, Self::Error> {
        if !self.path.is_file() {
            return Err(ExtractorError::Reference(format!(
                "file not found: {}",
                self.path.display()
            )));
        }
        let file = std::fs::File::open(&self.path).map_err(|e| {
            ExtractorError::Reference(format!("{}: {}", self.path.display(), e))
        })?;
        let set = read_reference(file)?;
        info!(
            "Loaded {} reference rows ({} columns) from {}",
            set.len(),
            set.columns().len(),
            self.path.display()
        );
        Ok(set)
    }
}

/// Read a reference dataset from CSV
///
/// Header names are trimmed. Short rows are padded with empty values and
/// cells beyond the header are ignored.
pub fn read_reference<R: Read>(reader: R) -> Result<ReferenceSet, ExtractorError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let row = result?;
        let record: Record = columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty())
            .map(|(idx, name)| (name.clone(), row.get(idx).unwrap_or_default().to_string()))
            .collect();
        rows.push(record);
    }

    Ok(ReferenceSet::new(columns, rows))
}
