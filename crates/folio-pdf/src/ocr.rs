//! OCR fallback using poppler's `pdftoppm` and the `tesseract` CLI
//!
//! Pages are rendered to PNG in a scratch directory, then recognized one
//! at a time. Both tools must be on `PATH` (or configured explicitly).

use crate::PdfError;
use folio_domain::traits::OcrEngine;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// OCR settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Render resolution
    pub dpi: u32,
    /// Tesseract language code
    pub lang: String,
    /// Renderer executable
    pub pdftoppm: PathBuf,
    /// Recognizer executable
    pub tesseract: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            lang: "eng".to_string(),
            pdftoppm: PathBuf::from("pdftoppm"),
            tesseract: PathBuf::from("tesseract"),
        }
    }
}

/// `OcrEngine` that shells out to pdftoppm and tesseract
#[derive(Debug, Clone, Default)]
pub struct TesseractOcr {
    config: OcrConfig,
}

impl TesseractOcr {
    /// Create an engine with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with explicit settings
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Settings in use
    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// True if both executables can be launched
    pub fn is_available(&self) -> bool {
        let pdftoppm = Command::new(&self.config.pdftoppm).arg("-v").output().is_ok();
        let tesseract = Command::new(&self.config.tesseract)
            .arg("--version")
            .output()
            .is_ok();
        pdftoppm && tesseract
    }

    fn render(&self, pdf_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, PdfError> {
        let output = Command::new(&self.config.pdftoppm)
            .arg("-png")
            .arg("-r")
            .arg(self.config.dpi.to_string())
            .arg(pdf_path)
            .arg(out_dir.join("page"))
            .output()
            .map_err(|e| PdfError::Ocr(format!("Failed to run pdftoppm: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PdfError::Ocr(format!("pdftoppm failed: {}", stderr.trim())));
        }

        // pdftoppm zero-pads page numbers to a fixed width per document
        let mut images: Vec<PathBuf> = fs::read_dir(out_dir)
            .map_err(|e| PdfError::Ocr(e.to_string()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map(|ext| ext == "png").unwrap_or(false))
            .collect();
        images.sort();

        if images.is_empty() {
            return Err(PdfError::Ocr("pdftoppm produced no images".to_string()));
        }
        Ok(images)
    }

    fn recognize(&self, image: &Path, page: usize) -> Result<String, PdfError> {
        let output = Command::new(&self.config.tesseract)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.lang)
            .output()
            .map_err(|e| PdfError::Ocr(format!("Failed to run tesseract on page {}: {}", page, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("tesseract reported an error on page {}: {}", page, stderr.trim());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractOcr {
    type Error = PdfError;

    fn recognize_pages(&self, pdf: &[u8]) -> Result<Vec<String>, Self::Error> {
        let scratch = tempfile::tempdir().map_err(|e| PdfError::Ocr(e.to_string()))?;
        let pdf_path = scratch.path().join("input.pdf");
        fs::File::create(&pdf_path)
            .and_then(|mut f| f.write_all(pdf))
            .map_err(|e| PdfError::Ocr(format!("Failed to stage PDF: {}", e)))?;

        let images = self.render(&pdf_path, scratch.path())?;
        info!(
            "OCR: rendered {} pages (dpi={}, lang={})",
            images.len(),
            self.config.dpi,
            self.config.lang
        );

        let mut pages = Vec::with_capacity(images.len());
        for (idx, image) in images.iter().enumerate() {
            let text = self.recognize(image, idx + 1)?;
            debug!("OCR page {}: {} chars", idx + 1, text.len());
            pages.push(text);
        }
        Ok(pages)
    }
}
