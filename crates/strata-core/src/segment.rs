//! Sentence segmentation for chunking and summarization.
//!
//! Splits raw text into sentences at sentence-final punctuation followed by
//! whitespace, after normalizing paragraph breaks. Fragments shorter than
//! [`MIN_SENTENCE_CHARS`](crate::defaults::MIN_SENTENCE_CHARS) are dropped
//! as noise.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::MIN_SENTENCE_CHARS;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("sentence regex is valid"));

/// Split text into an ordered sequence of trimmed sentence strings.
///
/// Returns an empty vector for empty input; never fails. Double newlines
/// are treated as sentence boundaries even without terminal punctuation,
/// single newlines as plain spacing.
pub fn segment(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let normalized = text.replace("\n\n", ". ").replace('\n', " ");

    let mut sentences = Vec::new();
    let mut last_end = 0;
    for mat in SENTENCE_END.find_iter(&normalized) {
        push_sentence(&mut sentences, &normalized[last_end..mat.end()]);
        last_end = mat.end();
    }
    if last_end < normalized.len() {
        push_sentence(&mut sentences, &normalized[last_end..]);
    }

    sentences
}

fn push_sentence(out: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.chars().count() >= MIN_SENTENCE_CHARS {
        out.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\n  ").is_empty());
    }

    #[test]
    fn test_splits_on_terminal_punctuation() {
        let sentences = segment("The deploy finished cleanly. The cache was warmed afterwards.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "The deploy finished cleanly.");
        assert_eq!(sentences[1], "The cache was warmed afterwards.");
    }

    #[test]
    fn test_question_and_exclamation_marks() {
        let sentences = segment("Was the handoff complete? It absolutely was complete!");
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn test_paragraph_break_acts_as_boundary() {
        let sentences = segment("First paragraph without punctuation\n\nSecond paragraph here");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].starts_with("First paragraph"));
    }

    #[test]
    fn test_single_newline_is_spacing() {
        let sentences = segment("A sentence split\nacross two lines ends here.");
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0], "A sentence split across two lines ends here.");
    }

    #[test]
    fn test_short_fragments_dropped() {
        let sentences = segment("Ok. This fragment is long enough to keep.");
        assert_eq!(sentences.len(), 1);
        assert!(sentences[0].contains("long enough"));
    }

    #[test]
    fn test_trailing_text_without_punctuation_kept() {
        let sentences = segment("A full sentence first. then a trailing fragment with no period");
        assert_eq!(sentences.len(), 2);
        assert_eq!(
            sentences[1],
            "then a trailing fragment with no period"
        );
    }

    #[test]
    fn test_order_preserved() {
        let sentences = segment("Alpha comes first here. Beta comes second here. Gamma is third here.");
        assert_eq!(sentences.len(), 3);
        assert!(sentences[0].contains("Alpha"));
        assert!(sentences[1].contains("Beta"));
        assert!(sentences[2].contains("Gamma"));
    }
}
