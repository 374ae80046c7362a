//! Keyword search over chunk summaries.
//!
//! The store does the cheap recall pass (any-term match over summaries and
//! keyword sets); scoring and ranking happen here so every backend ranks
//! identically. Search never reads chunk content, which keeps it equally
//! cheap across tiers.

use std::time::Instant;

use tracing::{debug, info};

use strata_core::defaults::MIN_TERM_CHARS;
use strata_core::{ChunkCandidate, Result, SearchFilter, SearchHit};

use crate::engine::MemoryEngine;
use crate::requests::SearchRequest;

impl MemoryEngine {
    /// Rank chunks whose summary or keywords contain any query term.
    ///
    /// A query with no usable terms returns an empty result, never an error.
    pub async fn search(&self, req: SearchRequest) -> Result<Vec<SearchHit>> {
        let start = Instant::now();
        let terms = query_terms(&req.query);
        if terms.is_empty() {
            debug!(
                subsystem = "engine",
                component = "search",
                op = "search",
                query = %req.query,
                "No usable query terms"
            );
            return Ok(Vec::new());
        }

        let filter = SearchFilter {
            agent_id: req.agent_id,
            visibility: req.visibility,
            tier: req.tier,
            include_shared: false,
        };
        let candidates = self
            .chunks
            .search_candidates(&filter, &terms, self.config.candidate_cap)
            .await?;

        let mut hits = rank_candidates(candidates, &terms);
        hits.truncate(req.limit.unwrap_or(self.config.search_limit).max(0) as usize);

        info!(
            subsystem = "engine",
            component = "search",
            op = "search",
            query = %req.query,
            result_count = hits.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search completed"
        );
        Ok(hits)
    }
}

/// Split a query on whitespace, lowercase, and drop short tokens.
pub(crate) fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|t| t.chars().count() > MIN_TERM_CHARS)
        .map(|t| t.to_lowercase())
        .collect()
}

/// Score candidates by the count of distinct query terms found in their
/// summary, descending; recency breaks ties.
pub(crate) fn rank_candidates(candidates: Vec<ChunkCandidate>, terms: &[String]) -> Vec<SearchHit> {
    let mut scored: Vec<(u32, ChunkCandidate)> = candidates
        .into_iter()
        .map(|c| {
            let summary_lower = c.summary.to_lowercase();
            let score = terms
                .iter()
                .filter(|term| summary_lower.contains(term.as_str()))
                .count() as u32;
            (score, c)
        })
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .cmp(score_a)
            .then(b.document_created_at.cmp(&a.document_created_at))
    });

    scored
        .into_iter()
        .map(|(score, c)| SearchHit {
            document_id: c.document_id,
            chunk_id: c.chunk_id,
            summary: c.summary,
            tags: c.tags,
            score,
            tier: c.tier,
            source: c.source,
        })
        .collect()
}
