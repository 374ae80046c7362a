//! Centralized default constants for the strata memory engine.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// TOKEN ESTIMATION
// =============================================================================

/// Characters per estimated token. Every budget check in the engine uses
/// this single ratio; substituting a different cost model breaks the budget
/// invariants downstream callers rely on.
pub const CHARS_PER_TOKEN: usize = 4;

// =============================================================================
// CHUNKING
// =============================================================================

/// Default chunk size in estimated tokens for document indexing.
pub const CHUNK_SIZE_TOKENS: usize = 500;

/// Minimum sentence length in characters; shorter fragments are noise.
pub const MIN_SENTENCE_CHARS: usize = 10;

// =============================================================================
// SUMMARIZATION & SIGNALS
// =============================================================================

/// Token cap for per-chunk summaries generated at index time.
pub const SUMMARY_MAX_TOKENS: usize = 80;

/// Maximum keywords extracted for a corpus-level ranking pass.
pub const MAX_CORPUS_KEYWORDS: usize = 20;

/// Maximum keywords stored per chunk.
pub const MAX_CHUNK_KEYWORDS: usize = 10;

/// Maximum tags stored per chunk.
pub const MAX_CHUNK_TAGS: usize = 15;

/// Sentence length above which the summarizer applies a penalty.
pub const LONG_SENTENCE_CHARS: usize = 300;

// =============================================================================
// SEARCH
// =============================================================================

/// Default result limit for keyword search.
pub const SEARCH_LIMIT: i64 = 10;

/// Result limit for the context assembler's summary-search stage.
pub const CONTEXT_SEARCH_LIMIT: i64 = 20;

/// Internal cap on candidate chunks fetched for scoring.
pub const SEARCH_CANDIDATE_CAP: i64 = 200;

/// Query terms of this length or shorter are discarded before matching.
pub const MIN_TERM_CHARS: usize = 2;

// =============================================================================
// CONTEXT ASSEMBLY
// =============================================================================

/// Percentage of the token budget reserved for active context injections.
pub const INJECTION_BUDGET_PCT: usize = 30;

/// Percentage of the token budget the summary stage may fill up to.
pub const SUMMARY_BUDGET_PCT: usize = 70;

/// Escalation to full content only happens below this percentage of budget.
pub const ESCALATION_THRESHOLD_PCT: usize = 50;

/// Number of hot-tier hits considered for full-content escalation.
pub const ESCALATION_CANDIDATES: usize = 3;

// =============================================================================
// TIER COMPACTION
// =============================================================================

/// Age in milliseconds after which a hot document is promoted to warm.
pub const HOT_AGE_MS: i64 = 3_600_000;

/// Age in milliseconds after which a warm document is promoted to cold.
pub const WARM_AGE_MS: i64 = 86_400_000;

/// Content stored for a cold chunk whose summary was never generated.
pub const ELIDED_PLACEHOLDER: &str = "[content elided]";
