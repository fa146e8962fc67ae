//! Content fingerprints used as cache keys

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex-encoded SHA-256 digest of some content
///
/// Fingerprints are filesystem-safe (64 lowercase hex characters) and are
/// used directly as cache file stems.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a byte sequence
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_domain::Fingerprint;
    ///
    /// let a = Fingerprint::of_bytes(b"%PDF-1.7");
    /// let b = Fingerprint::of_bytes(b"%PDF-1.7");
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str().len(), 64);
    /// ```
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    /// Fingerprint a (payload, instruction) pair as one digest
    ///
    /// Both parts are fed into a single hasher. The payload is length-prefixed
    /// so that moving bytes across the boundary (`"ab" + "c"` versus
    /// `"a" + "bc"`) yields a different key.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_domain::Fingerprint;
    ///
    /// let a = Fingerprint::of_pair(b"page text", b"list all dates");
    /// let b = Fingerprint::of_pair(b"page text", b"list all names");
    /// assert_ne!(a, b);
    /// ```
    pub fn of_pair(payload: &[u8], instruction: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((payload.len() as u64).to_le_bytes());
        hasher.update(payload);
        hasher.update(instruction);
        Self(hex::encode(hasher.finalize()))
    }

    /// Parse a fingerprint from its hex form
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.len() != 64 {
            return Err(format!("Expected 64 hex characters, got {}", s.len()));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid fingerprint: {}", s));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// The full hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: distinct (text, instruction) pairs never share a key
        #[test]
        fn test_pair_fingerprint_sensitivity(
            text_a in ".{0,64}",
            instr_a in ".{0,32}",
            text_b in ".{0,64}",
            instr_b in ".{0,32}",
        ) {
            prop_assume!(text_a != text_b || instr_a != instr_b);
            let a = Fingerprint::of_pair(text_a.as_bytes(), instr_a.as_bytes());
            let b = Fingerprint::of_pair(text_b.as_bytes(), instr_b.as_bytes());
            prop_assert_ne!(a, b);
        }

        /// Property: fingerprinting is a pure function of the input
        #[test]
        fn test_fingerprint_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(Fingerprint::of_bytes(&bytes), Fingerprint::of_bytes(&bytes));
        }
    }
}
