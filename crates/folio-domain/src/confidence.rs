//! Match confidence on a 0-100 scale

use serde::{Deserialize, Serialize};
use std::fmt;

/// How confident a reconciliation match is, as a percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchConfidence(u8);

impl MatchConfidence {
    /// No confidence at all
    pub const NONE: MatchConfidence = MatchConfidence(0);

    /// Create a confidence, clamping to 100
    pub fn new(percent: u8) -> Self {
        Self(percent.min(100))
    }

    /// Create a confidence from a float percentage, rounding and clamping to [0, 100]
    pub fn from_percent(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Self::NONE;
        }
        Self(value.round().min(100.0) as u8)
    }

    /// Parse the loose forms a language model emits
    ///
    /// Accepts `"85"`, `"85%"`, `"85.5 %"` and fractions such as `"0.85"`.
    /// A value written with a decimal point and at most 1.0 is read as a
    /// fraction of one.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_domain::MatchConfidence;
    ///
    /// assert_eq!(MatchConfidence::parse("85%").map(|c| c.value()), Some(85));
    /// assert_eq!(MatchConfidence::parse("0.9").map(|c| c.value()), Some(90));
    /// assert_eq!(MatchConfidence::parse("high"), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw.trim().trim_end_matches('%').trim();
        let value: f64 = cleaned.parse().ok()?;
        if cleaned.contains('.') && value <= 1.0 {
            return Some(Self::from_percent(value * 100.0));
        }
        Some(Self::from_percent(value))
    }

    /// Percentage value in [0, 100]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
