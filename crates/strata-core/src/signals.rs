//! Keyword and tag extraction over a text span.
//!
//! Both functions are deterministic and side-effect-free. Keywords are
//! frequency-ranked lowercase tokens with stop words removed; tags combine a
//! cheap capitalized-phrase heuristic with a fixed domain vocabulary.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

/// Common English function words excluded from keyword ranking.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "her", "was", "one", "our",
    "out", "day", "get", "has", "him", "his", "how", "man", "new", "now", "old", "see", "two",
    "way", "who", "boy", "did", "its", "let", "put", "say", "she", "too", "use", "that", "with",
    "have", "this", "will", "your", "from", "they", "know", "want", "been", "good", "much",
    "some", "time", "very", "when", "come", "here", "just", "like", "long", "make", "many",
    "more", "only", "over", "such", "take", "than", "them", "well", "were", "what", "which",
    "their", "would", "there", "could", "other", "after", "first", "never", "these", "think",
    "where", "being", "every", "great", "might", "shall", "still", "those", "while", "should",
    "about", "again", "before", "between", "both", "each", "into", "through", "under", "because",
];

/// Fixed vocabulary of domain terms always promoted to tags when present.
const DOMAIN_VOCABULARY: &[&str] = &[
    "lesson",
    "pattern",
    "handoff",
    "prototype",
    "insight",
    "anomaly",
    "synthesis",
    "protocol",
    "workflow",
    "experiment",
];

static WORD_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9]+").expect("token regex is valid"));

static CAPITALIZED_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)*").expect("capitalized-run regex is valid")
});

/// Extract frequency-ranked lowercase keywords from text.
///
/// Tokens are split on non-alphanumeric boundaries; stop words and tokens of
/// length ≤ 2 are dropped. Ties in frequency break by first occurrence so
/// the ranking is deterministic.
pub fn keywords(text: &str, max_keywords: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    for (idx, mat) in WORD_TOKEN.find_iter(text).enumerate() {
        let token = mat.as_str().to_lowercase();
        if token.chars().count() <= 2 || STOP_WORDS.contains(&token.as_str()) {
            continue;
        }
        let entry = counts.entry(token).or_insert((0, idx));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(token, (count, first))| (token, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(max_keywords);
    ranked.into_iter().map(|(token, _, _)| token).collect()
}

/// Extract up to `max_tags` tags from text.
///
/// Tags are the union of capitalized word/phrase runs longer than two
/// characters (a cheap named-entity heuristic) and any domain-vocabulary
/// member found case-insensitively. Only set membership matters.
pub fn tags(text: &str, max_tags: usize) -> Vec<String> {
    let mut set = BTreeSet::new();

    for mat in CAPITALIZED_RUN.find_iter(text) {
        let run = mat.as_str().trim();
        if run.chars().count() > 2 {
            set.insert(run.to_string());
        }
    }

    let lowered = text.to_lowercase();
    for term in DOMAIN_VOCABULARY {
        if lowered.contains(term) {
            set.insert(term.to_string());
        }
    }

    set.into_iter().take(max_tags).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_ranked_by_frequency() {
        let text = "deploy deploy deploy rollback rollback cache";
        let kw = keywords(text, 20);
        assert_eq!(kw, vec!["deploy", "rollback", "cache"]);
    }

    #[test]
    fn test_keywords_drop_stop_words_and_short_tokens() {
        let text = "the server and the db is up, ok";
        let kw = keywords(text, 20);
        assert_eq!(kw, vec!["server"]);
    }

    #[test]
    fn test_keywords_lowercased() {
        let kw = keywords("Deploy DEPLOY deploy", 20);
        assert_eq!(kw, vec!["deploy"]);
    }

    #[test]
    fn test_keywords_truncated() {
        let text = "alpha beta gamma delta epsilon";
        let kw = keywords(text, 3);
        assert_eq!(kw.len(), 3);
    }

    #[test]
    fn test_keywords_deterministic_tie_break() {
        // Equal frequency: first occurrence wins.
        let kw = keywords("zebra apple zebra apple", 20);
        assert_eq!(kw, vec!["zebra", "apple"]);
    }

    #[test]
    fn test_keywords_empty_input() {
        assert!(keywords("", 20).is_empty());
    }

    #[test]
    fn test_tags_capitalized_runs() {
        let found = tags("Met with Alice Johnson near the Docking Bay today", 15);
        assert!(found.contains(&"Alice Johnson".to_string()));
        assert!(found.contains(&"Docking Bay".to_string()));
    }

    #[test]
    fn test_tags_domain_vocabulary_case_insensitive() {
        let found = tags("captured a useful PATTERN during the handoff", 15);
        assert!(found.contains(&"pattern".to_string()));
        assert!(found.contains(&"handoff".to_string()));
    }

    #[test]
    fn test_tags_capped() {
        let text = "Aaa x Bbb x Ccc x Ddd x Eee x Fff x Ggg x Hhh x Iii x Jjj x Kkk x \
                    Lll x Mmm x Nnn x Ooo x Ppp x Qqq";
        let found = tags(text, 15);
        assert_eq!(found.len(), 15);
    }

    #[test]
    fn test_tags_set_semantics() {
        let found = tags("Reactor online. Reactor nominal. Reactor stable.", 15);
        assert_eq!(found, vec!["Reactor".to_string()]);
    }

    #[test]
    fn test_adjacent_capitalized_words_form_one_phrase() {
        let found = tags("We visited Engine Room Two yesterday", 15);
        assert!(found.contains(&"Engine Room Two".to_string()));
    }
}
