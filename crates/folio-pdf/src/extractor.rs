//! Cache-first text extraction with OCR fallback

use crate::error::PdfError;
use crate::quality::{QualityGate, QualityVerdict};
use folio_domain::document::{tag_pages, OCR_FAILURE_MARKER};
use folio_domain::traits::{OcrEngine, ResultCache, TextLayer};
use folio_domain::{EntryKind, ExtractedText, FallbackReason, Fingerprint, TextOrigin};
use std::fmt::Display;
use std::path::Path;
use tracing::{debug, info, warn};

/// Extracts page-tagged text from PDF bytes
///
/// The extractor owns its capabilities; pass shared handles (for example a
/// cloned `FsCache`) when the same cache is used elsewhere.
pub struct TextExtractor<T, O, C>
where
    T: TextLayer,
    O: OcrEngine,
    C: ResultCache,
{
    text_layer: T,
    ocr: O,
    cache: C,
    gate: QualityGate,
}

impl<T, O, C> TextExtractor<T, O, C>
where
    T: TextLayer,
    O: OcrEngine,
    C: ResultCache,
    T::Error: Display,
    O::Error: Display,
    C::Error: Display,
{
    /// Create an extractor with the default quality gate
    pub fn new(text_layer: T, ocr: O, cache: C) -> Self {
        Self {
            text_layer,
            ocr,
            cache,
            gate: QualityGate::default(),
        }
    }

    /// Replace the quality gate
    pub fn with_quality_gate(mut self, gate: QualityGate) -> Self {
        self.gate = gate;
        self
    }

    /// Cache used for extracted text
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Extract text from a file on disk
    ///
    /// A missing file is reported immediately and nothing is cached.
    pub fn extract_file(&self, path: &Path) -> Result<ExtractedText, PdfError> {
        if !path.is_file() {
            return Err(PdfError::InputNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).map_err(|source| PdfError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Extracting text from {} ({} bytes)", path.display(), bytes.len());
        self.extract_bytes(&bytes)
    }

    /// Extract text from in-memory PDF bytes
    ///
    /// Only cache failures are returned as errors. Text-layer and OCR
    /// failures are recorded in the returned origin and text.
    pub fn extract_bytes(&self, pdf: &[u8]) -> Result<ExtractedText, PdfError> {
        let fingerprint = Fingerprint::of_bytes(pdf);

        if let Some(text) = self
            .cache
            .get(EntryKind::Text, &fingerprint)
            .map_err(|e| PdfError::Cache(e.to_string()))?
        {
            info!("Text cache hit for {}", fingerprint.short());
            return Ok(ExtractedText {
                fingerprint,
                text,
                origin: TextOrigin::Cache,
            });
        }

        let (text, origin) = match self.read_text_layer(pdf) {
            Ok(text) => {
                info!("Using text layer for {}", fingerprint.short());
                (text, TextOrigin::TextLayer)
            }
            Err(reason) => self.run_ocr(pdf, reason),
        };

        self.cache
            .put(EntryKind::Text, &fingerprint, &text)
            .map_err(|e| PdfError::Cache(e.to_string()))?;
        debug!("Cached {} chars of text for {}", text.len(), fingerprint.short());

        Ok(ExtractedText {
            fingerprint,
            text,
            origin,
        })
    }

    /// Tagged text-layer output, or the reason it was rejected
    fn read_text_layer(&self, pdf: &[u8]) -> Result<String, FallbackReason> {
        let pages = self.text_layer.page_texts(pdf).map_err(|e| {
            warn!("Text layer unreadable, falling back to OCR: {}", e);
            FallbackReason::TextLayerError(e.to_string())
        })?;

        // Headers are excluded so that empty pages cannot pass on their own
        let body = pages.join("\n");
        match self.gate.assess(&body) {
            QualityVerdict::Usable => Ok(tag_pages(&pages, false)),
            verdict => {
                warn!("Text layer rejected ({:?}), falling back to OCR", verdict);
                Err(FallbackReason::LowQuality)
            }
        }
    }

    fn run_ocr(&self, pdf: &[u8], reason: FallbackReason) -> (String, TextOrigin) {
        match self.ocr.recognize_pages(pdf) {
            Ok(pages) => {
                info!("OCR produced {} pages", pages.len());
                (tag_pages(&pages, true), TextOrigin::Ocr { reason })
            }
            Err(e) => {
                warn!("OCR failed: {}", e);
                (
                    format!("{}: {}", OCR_FAILURE_MARKER, e),
                    TextOrigin::OcrFailed { reason },
                )
            }
        }
    }
}
