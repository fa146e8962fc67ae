//! Positional text chunking for oversized payloads
//!
//! Chunks are cut every `max_chars` characters. Page headers already sit
//! on their own lines, so most cuts land inside page text; no attempt is
//! made to move a cut to a line or page boundary.

/// Lazy sequence of contiguous chunks of at most `max_chars` characters
///
/// Cloning yields an independent iterator from the same position, so a
/// sequence can be restarted by cloning it before consuming.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    max_chars: usize,
    offset: usize,
}

impl<'a> Chunks<'a> {
    /// Chunk `text` into pieces of at most `max_chars` characters
    ///
    /// A `max_chars` of zero is treated as one.
    pub fn new(text: &'a str, max_chars: usize) -> Self {
        Self {
            text,
            max_chars: max_chars.max(1),
            offset: 0,
        }
    }

    /// Total number of chunks the full sequence yields
    pub fn total(&self) -> usize {
        self.text.chars().count().div_ceil(self.max_chars)
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.offset..];
        if rest.is_empty() {
            return None;
        }

        let end = rest
            .char_indices()
            .nth(self.max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());

        self.offset += end;
        Some(&rest[..end])
    }
}

/// Chunk `text` into pieces of at most `max_chars` characters
pub fn chunk_text(text: &str, max_chars: usize) -> Chunks<'_> {
    Chunks::new(text, max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks: Vec<_> = chunk_text("hello", 10).collect();
        assert_eq!(chunks, vec!["hello"]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert_eq!(chunk_text("", 10).count(), 0);
        assert_eq!(chunk_text("", 10).total(), 0);
    }

    #[test]
    fn test_exact_multiple() {
        let chunks: Vec<_> = chunk_text("abcdef", 3).collect();
        assert_eq!(chunks, vec!["abc", "def"]);
    }

    #[test]
    fn test_remainder_chunk() {
        let chunks: Vec<_> = chunk_text("abcdefg", 3).collect();
        assert_eq!(chunks, vec!["abc", "def", "g"]);
    }

    #[test]
    fn test_multibyte_characters_not_split() {
        let chunks: Vec<_> = chunk_text("héllo wörld", 4).collect();
        assert_eq!(chunks, vec!["héll", "o wö", "rld"]);
    }

    #[test]
    fn test_clone_restarts() {
        let chunks = chunk_text("abcdefg", 2);
        let first: Vec<_> = chunks.clone().collect();
        let second: Vec<_> = chunks.collect();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn test_chunks_cover_input(text in "\\PC{0,400}", max in 1usize..64) {
            let chunks: Vec<&str> = chunk_text(&text, max).collect();
            let len = text.chars().count();

            prop_assert_eq!(chunks.len(), len.div_ceil(max));
            prop_assert_eq!(chunks.len(), chunk_text(&text, max).total());
            prop_assert_eq!(chunks.concat(), text.clone());
            for chunk in &chunks {
                let n = chunk.chars().count();
                prop_assert!(n >= 1 && n <= max);
            }
        }
    }
}
