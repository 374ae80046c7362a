//! Deterministic, length-based token cost model.
//!
//! Every budget check in the engine goes through [`estimate_tokens`]. The
//! ratio is intentionally crude; what matters is that indexing, search,
//! context assembly, and compaction all agree on the same arithmetic, so
//! budget invariants hold end to end.

use crate::defaults::CHARS_PER_TOKEN;

/// Estimate the token cost of a text span.
///
/// Defined as `ceil(char_count / 4)`. Pure function, never fails.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Check whether text fits within a token limit under estimation.
pub fn fits_within(text: &str, limit: usize) -> bool {
    estimate_tokens(text) <= limit
}
