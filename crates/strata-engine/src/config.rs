//! Engine configuration.
//!
//! All defaults come from `strata_core::defaults`; construct with
//! `EngineConfig::default()` and override fields as needed.

use chrono::Duration;

use strata_core::defaults;

/// Tunables for the memory engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Target chunk size in estimated tokens.
    pub chunk_size_tokens: usize,
    /// Token cap for per-chunk summaries.
    pub summary_max_tokens: usize,
    /// Maximum keywords stored per chunk.
    pub chunk_keywords: usize,
    /// Maximum tags stored per chunk.
    pub chunk_tags: usize,
    /// Default result limit for search.
    pub search_limit: i64,
    /// Result limit for the context assembler's summary stage.
    pub context_search_limit: i64,
    /// Internal cap on candidate chunks fetched for scoring.
    pub candidate_cap: i64,
    /// Percentage of the context budget reserved for injections.
    pub injection_budget_pct: usize,
    /// Percentage of the context budget the summary stage may fill.
    pub summary_budget_pct: usize,
    /// Escalation only happens below this percentage of budget.
    pub escalation_threshold_pct: usize,
    /// Number of hot-tier hits considered for full-content escalation.
    pub escalation_candidates: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size_tokens: defaults::CHUNK_SIZE_TOKENS,
            summary_max_tokens: defaults::SUMMARY_MAX_TOKENS,
            chunk_keywords: defaults::MAX_CHUNK_KEYWORDS,
            chunk_tags: defaults::MAX_CHUNK_TAGS,
            search_limit: defaults::SEARCH_LIMIT,
            context_search_limit: defaults::CONTEXT_SEARCH_LIMIT,
            candidate_cap: defaults::SEARCH_CANDIDATE_CAP,
            injection_budget_pct: defaults::INJECTION_BUDGET_PCT,
            summary_budget_pct: defaults::SUMMARY_BUDGET_PCT,
            escalation_threshold_pct: defaults::ESCALATION_THRESHOLD_PCT,
            escalation_candidates: defaults::ESCALATION_CANDIDATES,
        }
    }
}

/// Age thresholds driving the tier compactor.
#[derive(Debug, Clone, Copy)]
pub struct CompressionPolicy {
    /// Hot documents older than this are promoted to warm.
    pub hot_after: Duration,
    /// Warm documents older than this are promoted to cold.
    pub warm_after: Duration,
}

impl Default for CompressionPolicy {
    fn default() -> Self {
        Self {
            hot_after: Duration::milliseconds(defaults::HOT_AGE_MS),
            warm_after: Duration::milliseconds(defaults::WARM_AGE_MS),
        }
    }
}
