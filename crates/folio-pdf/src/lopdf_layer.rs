//! Text layer reader backed by lopdf

use crate::PdfError;
use folio_domain::traits::TextLayer;
use lopdf::Document;
use tracing::debug;

/// Reads the embedded text of each page with lopdf
///
/// Any page that fails to decode fails the whole read, so the caller falls
/// back to OCR for the document as a unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfTextLayer;

impl LopdfTextLayer {
    /// Create a reader
    pub fn new() -> Self {
        Self
    }
}

impl TextLayer for LopdfTextLayer {
    type Error = PdfError;

    fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>, Self::Error> {
        let doc = Document::load_mem(pdf).map_err(|e| PdfError::TextLayer(e.to_string()))?;

        let pages = doc.get_pages();
        let mut texts = Vec::with_capacity(pages.len());
        for page_num in pages.keys() {
            let text = doc
                .extract_text(&[*page_num])
                .map_err(|e| PdfError::TextLayer(format!("page {}: {}", page_num, e)))?;
            texts.push(text);
        }

        debug!("Text layer: {} pages", texts.len());
        Ok(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_are_an_error() {
        let result = LopdfTextLayer::new().page_texts(b"not a pdf at all");
        assert!(matches!(result, Err(PdfError::TextLayer(_))));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(LopdfTextLayer::new().page_texts(&[]).is_err());
    }
}
