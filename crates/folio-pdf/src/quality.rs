//! Heuristic check for unusable text-layer output
//!
//! A text layer can exist and still be useless: scanned pages with a few
//! stray glyphs, or fonts without a usable encoding that decode to runs of
//! symbols. The gate rejects text that is too short or mostly symbols.
//! Both thresholds are tunable; the defaults are heuristics, not limits
//! derived from any format.

use serde::{Deserialize, Serialize};

/// Default minimum character count
pub const DEFAULT_MIN_CHARS: usize = 50;

/// Default maximum symbol ratio
pub const DEFAULT_MAX_SYMBOL_RATIO: f64 = 0.5;

/// Result of a quality assessment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QualityVerdict {
    /// Text looks usable
    Usable,
    /// Fewer than `min_chars` characters after trimming
    TooShort {
        /// Characters counted
        chars: usize,
    },
    /// Share of symbol characters above `max_symbol_ratio`
    Noisy {
        /// Observed ratio
        symbol_ratio: f64,
    },
}

impl QualityVerdict {
    /// True for anything other than `Usable`
    pub fn is_corrupted(&self) -> bool {
        !matches!(self, QualityVerdict::Usable)
    }
}

/// Text quality classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityGate {
    /// Minimum character count after trimming whitespace
    pub min_chars: usize,
    /// Maximum share of characters that are neither alphanumeric nor whitespace
    pub max_symbol_ratio: f64,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            max_symbol_ratio: DEFAULT_MAX_SYMBOL_RATIO,
        }
    }
}

impl QualityGate {
    /// Create a gate with explicit thresholds
    pub fn new(min_chars: usize, max_symbol_ratio: f64) -> Self {
        Self {
            min_chars,
            max_symbol_ratio,
        }
    }

    /// Classify `text`
    pub fn assess(&self, text: &str) -> QualityVerdict {
        let trimmed = text.trim();
        let total = trimmed.chars().count();
        if total < self.min_chars {
            return QualityVerdict::TooShort { chars: total };
        }

        let symbols = trimmed
            .chars()
            .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
            .count();
        let symbol_ratio = symbols as f64 / total as f64;
        if symbol_ratio > self.max_symbol_ratio {
            return QualityVerdict::Noisy { symbol_ratio };
        }

        QualityVerdict::Usable
    }

    /// True if `text` looks corrupted or too sparse
    pub fn is_corrupted(&self, text: &str) -> bool {
        self.assess(text).is_corrupted()
    }
}
