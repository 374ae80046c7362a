//! Extractive summarization.
//!
//! The default [`ExtractiveSummarizer`] is fully local and deterministic:
//! it scores sentences by position, keyword density, length, and
//! insight/causality signal words, then greedily selects within a token cap
//! and restores original document order. The [`Summarizer`] trait exists so
//! a model-backed implementation can be substituted without touching
//! callers.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::{LONG_SENTENCE_CHARS, MAX_CORPUS_KEYWORDS};
use crate::error::Result;
use crate::segment::segment;
use crate::signals::keywords;
use crate::tokens::estimate_tokens;

/// Strategy interface for summary generation.
///
/// Async only because a pluggable implementation may suspend; the default
/// implementation is pure computation.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce a summary of `text` within `max_tokens` estimated tokens.
    async fn summarize(&self, text: &str, max_tokens: usize) -> Result<String>;

    /// Human-readable name of this summarizer.
    fn name(&self) -> &str;
}

static SIGNAL_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(learned|realized|discovered|changed|important|key|critical|because|therefore|insight|pattern)\b",
    )
    .expect("signal-word regex is valid")
});

/// The default heuristic summarizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self
    }

    /// Score a sentence against the corpus keyword set.
    fn score_sentence(sentence: &str, index: usize, corpus_keywords: &[String]) -> f64 {
        let position_bonus = if index == 0 {
            0.3
        } else if index < 3 {
            0.15
        } else {
            0.0
        };

        let density = if corpus_keywords.is_empty() {
            0.0
        } else {
            let lowered = sentence.to_lowercase();
            let matched = corpus_keywords
                .iter()
                .filter(|kw| lowered.contains(kw.as_str()))
                .count();
            matched as f64 / corpus_keywords.len() as f64
        };

        let length_penalty = if sentence.chars().count() > LONG_SENTENCE_CHARS {
            -0.1
        } else {
            0.0
        };

        let signal_bonus = if SIGNAL_WORDS.is_match(sentence) {
            0.2
        } else {
            0.0
        };

        position_bonus + 0.5 * density + length_penalty + signal_bonus
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, text: &str, max_tokens: usize) -> Result<String> {
        let sentences = segment(text);

        // Degenerate input: nothing to rank, keep the text verbatim.
        if sentences.is_empty() {
            return Ok(text.trim().to_string());
        }
        if sentences.len() <= 2 {
            return Ok(sentences.join(" "));
        }

        let corpus_keywords = keywords(text, MAX_CORPUS_KEYWORDS);

        let mut ranked: Vec<(usize, f64)> = sentences
            .iter()
            .enumerate()
            .map(|(idx, s)| (idx, Self::score_sentence(s, idx, &corpus_keywords)))
            .collect();
        // Descending by score; original index breaks ties deterministically.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));

        let mut used = 0usize;
        let mut accepted: Vec<usize> = Vec::new();
        for (idx, _) in ranked {
            let cost = estimate_tokens(&sentences[idx]);
            if used + cost > max_tokens {
                continue;
            }
            used += cost;
            accepted.push(idx);
        }

        // Restore document order so the summary reads coherently, not as a
        // ranked list.
        accepted.sort_unstable();
        let summary = accepted
            .into_iter()
            .map(|idx| sentences[idx].as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(summary)
    }

    fn name(&self) -> &str {
        "extractive"
    }
}
