//! Extracted document text and its page-tagging convention

use crate::Fingerprint;
use serde::{Deserialize, Serialize};

/// Prefix written in place of OCR output when OCR itself fails
pub const OCR_FAILURE_MARKER: &str = "OCR processing failed";

/// Header line for a page taken from the PDF text layer
pub fn page_header(page: usize) -> String {
    format!("--- Page {} Content ---", page)
}

/// Header line for a page produced by OCR
pub fn ocr_page_header(page: usize) -> String {
    format!("--- OCR Page {} Content ---", page)
}

/// Concatenate page texts with one header per page
///
/// Pages are numbered from 1. An empty page contributes only its header.
pub fn tag_pages<S: AsRef<str>>(pages: &[S], ocr: bool) -> String {
    let mut text = String::new();
    for (idx, page) in pages.iter().enumerate() {
        let header = if ocr {
            ocr_page_header(idx + 1)
        } else {
            page_header(idx + 1)
        };
        text.push_str(&header);
        text.push('\n');
        text.push_str(page.as_ref());
        text.push_str("\n\n");
    }
    text
}

/// Why the OCR path was taken
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackReason {
    /// The text layer could not be read at all
    TextLayerError(String),
    /// The text layer was readable but failed the quality gate
    LowQuality,
}

/// Which path produced an [`ExtractedText`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextOrigin {
    /// Returned from the cache without any extraction work
    Cache,
    /// PDF text layer, judged usable
    TextLayer,
    /// OCR fallback succeeded
    Ocr {
        /// Why the text layer was abandoned
        reason: FallbackReason,
    },
    /// OCR fallback failed; the text is a failure marker
    OcrFailed {
        /// Why the text layer was abandoned
        reason: FallbackReason,
    },
}

/// Full text of one document, tagged by page
///
/// Produced once per distinct document fingerprint and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Fingerprint of the source PDF bytes
    pub fingerprint: Fingerprint,
    /// Concatenated page-tagged text
    pub text: String,
    /// How this text was obtained
    pub origin: TextOrigin,
}

/// One page recovered from page-tagged text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSegment {
    /// 1-based page number from the header
    pub page: usize,
    /// Whether the header marked the page as OCR output
    pub ocr: bool,
    /// Page body without the header
    pub text: String,
}

impl ExtractedText {
    /// True when the text has nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// True when the text carries the OCR failure marker
    pub fn ocr_failed(&self) -> bool {
        self.text.trim_start().starts_with(OCR_FAILURE_MARKER)
    }

    /// Split the text back into page segments
    ///
    /// Text before the first header (if any) is ignored.
    pub fn pages(&self) -> Vec<PageSegment> {
        let mut segments: Vec<PageSegment> = Vec::new();

        for line in self.text.lines() {
            if let Some((page, ocr)) = parse_header(line) {
                segments.push(PageSegment {
                    page,
                    ocr,
                    text: String::new(),
                });
                continue;
            }
            if let Some(current) = segments.last_mut() {
                current.text.push_str(line);
                current.text.push('\n');
            }
        }

        for segment in &mut segments {
            let trimmed = segment.text.trim_end_matches('\n').len();
            segment.text.truncate(trimmed);
        }
        segments
    }
}

fn parse_header(line: &str) -> Option<(usize, bool)> {
    let inner = line.trim().strip_prefix("--- ")?.strip_suffix(" Content ---")?;
    let (ocr, number) = match inner.strip_prefix("OCR Page ") {
        Some(rest) => (true, rest),
        None => (false, inner.strip_prefix("Page ")?),
    };
    number.trim().parse().ok().map(|page| (page, ocr))
}
