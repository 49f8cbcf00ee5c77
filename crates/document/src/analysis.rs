use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// A single analysed term with its position and UTF-8 byte offsets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// Lowercased term text.
    pub text: String,
    /// Zero-based token position within the analysed value.
    pub position: u32,
    /// Byte offset (inclusive) in the original value.
    pub start: usize,
    /// Byte offset (exclusive) in the original value.
    pub end: usize,
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self.text.as_str()
    }
}

/// Splits `text` on Unicode word boundaries and lowercases each word.
///
/// Offsets point into `text` as given, so highlight spans can be mapped back
/// onto the caller's original value.
pub fn analyze(text: &str) -> Vec<Token> {
    text.unicode_word_indices()
        .enumerate()
        .map(|(position, (start, word))| Token {
            text: word.to_lowercase(),
            position: position as u32,
            start,
            end: start + word.len(),
        })
        .collect()
}

/// Normalizes a single query term the same way [`analyze`] normalizes
/// document text.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_lowercases_and_tracks_offsets() {
        let tokens = analyze("Hello, Rust World");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "rust", "world"]);
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[1].start, 7);
        assert_eq!(tokens[1].end, 11);
    }

    #[test]
    fn analyze_empty_text_yields_no_tokens() {
        assert!(analyze("   ,, ").is_empty());
    }

    #[test]
    fn normalize_term_matches_analysis() {
        assert_eq!(normalize_term("  RuSt "), analyze("RuSt")[0].text);
    }
}
