//! The budgeted context-assembly protocol.
//!
//! Three strictly ordered stages share one cumulative budget:
//!
//! 1. Active injections, up to 30% of the budget. The reservation keeps
//!    standing instructions from being starved out by search results.
//! 2. Search-ranked summaries, up to 70% of the budget.
//! 3. Full-content escalation for the first few hot-tier hits, only when the
//!    running total is still below 50% of the budget.
//!
//! Running out of budget is never an error: the assembler returns whatever
//! fits and reports the true token usage, always within the budget.

use std::time::Instant;

use tracing::{debug, info};

use strata_core::{
    estimate_tokens, fits_within, AssembledContext, ContextStrategy, MemoryTier, Result,
    SearchFilter,
};

use crate::engine::MemoryEngine;
use crate::requests::ContextRequest;
use crate::search::{query_terms, rank_candidates};

impl MemoryEngine {
    /// Assemble a context string for an agent within a token budget.
    pub async fn get_context(&self, req: ContextRequest) -> Result<AssembledContext> {
        let start = Instant::now();
        let budget = req.token_budget;
        let injection_cap = budget * self.config.injection_budget_pct / 100;
        let summary_cap = budget * self.config.summary_budget_pct / 100;
        let escalation_floor = budget * self.config.escalation_threshold_pct / 100;

        let mut blocks: Vec<String> = Vec::new();
        let mut tokens_used: usize = 0;
        let mut docs_accessed: usize = 0;
        let mut strategy = ContextStrategy::SummariesOnly;

        // Stage 1: active injections within the 30% reservation.
        let active = self.injections.list_active(req.agent_id).await?;
        for injection in &active {
            let block = format!("[{}] {}", injection.context_type, injection.content);
            let cost = estimate_tokens(&block);
            if tokens_used + cost > injection_cap {
                break;
            }
            blocks.push(block);
            tokens_used += cost;
        }
        debug!(
            subsystem = "engine",
            component = "context",
            op = "get_context",
            agent_id = %req.agent_id,
            active_injections = active.len(),
            tokens_used,
            "Injection stage complete"
        );

        // Stage 2: ranked summaries up to the 70% line.
        let terms = query_terms(&req.query);
        let hits = if terms.is_empty() {
            Vec::new()
        } else {
            let filter = SearchFilter {
                agent_id: Some(req.agent_id),
                visibility: None,
                tier: None,
                include_shared: req.include_shared,
            };
            let candidates = self
                .chunks
                .search_candidates(&filter, &terms, self.config.candidate_cap)
                .await?;
            let mut ranked = rank_candidates(candidates, &terms);
            ranked.truncate(self.config.context_search_limit.max(0) as usize);
            ranked
        };

        for hit in &hits {
            let block = format!("[{}] {}", hit.source, hit.summary);
            let cost = estimate_tokens(&block);
            if tokens_used + cost > summary_cap {
                break;
            }
            blocks.push(block);
            tokens_used += cost;
            docs_accessed += 1;
        }
        debug!(
            subsystem = "engine",
            component = "context",
            op = "get_context",
            agent_id = %req.agent_id,
            result_count = hits.len(),
            docs_accessed,
            tokens_used,
            "Summary stage complete"
        );

        // Stage 3: full-content escalation for hot hits, additive to the
        // summaries already appended.
        let hot_hits: Vec<_> = hits
            .iter()
            .filter(|h| h.tier == MemoryTier::Hot)
            .take(self.config.escalation_candidates)
            .collect();

        if tokens_used < escalation_floor && !hot_hits.is_empty() {
            strategy = ContextStrategy::SummariesPlusHot;
            for hit in hot_hits {
                let Some(retrieved) = self.retrieve(hit.document_id).await? else {
                    continue;
                };
                let block = format!(
                    "=== {} (full) ===\n{}",
                    retrieved.document.source, retrieved.full_content
                );
                // tokens_used never exceeds budget, so the subtraction holds.
                if !fits_within(&block, budget - tokens_used) {
                    continue;
                }
                tokens_used += estimate_tokens(&block);
                blocks.push(block);
                strategy = ContextStrategy::FullRetrieval;
            }
        }

        info!(
            subsystem = "engine",
            component = "context",
            op = "get_context",
            agent_id = %req.agent_id,
            query = %req.query,
            token_budget = budget,
            tokens_used,
            docs_accessed,
            strategy = %strategy,
            duration_ms = start.elapsed().as_millis() as u64,
            "Context assembled"
        );

        Ok(AssembledContext {
            context: blocks.join("\n\n"),
            tokens_used,
            docs_accessed,
            strategy,
        })
    }
}
