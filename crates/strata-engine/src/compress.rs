//! Age-driven tier compaction.
//!
//! Pass 1 (hot → warm) backfills missing chunk summaries, then promotes the
//! document. Content is untouched.
//!
//! Pass 2 (warm → cold) claims the document with a tier compare-and-set
//! before eliding any content. Claiming first means a concurrent compactor
//! that loses the CAS skips the document entirely and cannot double-count
//! reclaimed tokens. Elision is the only irreversible operation in the
//! engine: once a chunk is compacted its original content is gone.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, trace};

use strata_core::defaults::ELIDED_PLACEHOLDER;
use strata_core::{estimate_tokens, CompressionReport, MemoryTier, Result};

use crate::config::CompressionPolicy;
use crate::engine::MemoryEngine;

impl MemoryEngine {
    /// Run both compaction passes over every eligible document.
    pub async fn compress(&self, policy: CompressionPolicy) -> Result<CompressionReport> {
        let start = Instant::now();
        let now = Utc::now();
        let mut report = CompressionReport::default();

        // Pass 1: hot -> warm. Guarantee summaries, keep content.
        let hot_docs = self
            .documents
            .list_tier_older_than(MemoryTier::Hot, now - policy.hot_after)
            .await?;
        for doc in &hot_docs {
            let chunks = self.chunks.list_for_document(doc.id).await?;
            for chunk in &chunks {
                if chunk.summary.is_some() {
                    continue;
                }
                // Backstop for chunks indexed before a summarizer was
                // available or whose summary generation failed.
                let summary = self
                    .summarizer
                    .summarize(&chunk.content, self.config.summary_max_tokens)
                    .await?;
                let summary_tokens = estimate_tokens(&summary) as i64;
                self.chunks
                    .set_summary(chunk.id, &summary, summary_tokens)
                    .await?;
                trace!(
                    subsystem = "engine",
                    component = "compactor",
                    document_id = %doc.id,
                    position = chunk.position,
                    "Backfilled chunk summary"
                );
            }
            if self
                .documents
                .set_tier_if(doc.id, MemoryTier::Hot, MemoryTier::Warm)
                .await?
            {
                report.hot_to_warm += 1;
            }
        }
        debug!(
            subsystem = "engine",
            component = "compactor",
            op = "compress",
            tier = "warm",
            promoted = report.hot_to_warm,
            candidates = hot_docs.len(),
            "Hot pass complete"
        );

        // Pass 2: warm -> cold. Claim via CAS, then elide content.
        let warm_docs = self
            .documents
            .list_tier_older_than(MemoryTier::Warm, now - policy.warm_after)
            .await?;
        for doc in &warm_docs {
            if !self
                .documents
                .set_tier_if(doc.id, MemoryTier::Warm, MemoryTier::Cold)
                .await?
            {
                continue;
            }
            let chunks = self.chunks.list_for_document(doc.id).await?;
            for chunk in &chunks {
                let (summary, summary_tokens) = match (&chunk.summary, chunk.summary_tokens) {
                    (Some(s), Some(t)) => (s.clone(), t),
                    (Some(s), None) => {
                        let t = estimate_tokens(s) as i64;
                        (s.clone(), t)
                    }
                    _ => (
                        ELIDED_PLACEHOLDER.to_string(),
                        estimate_tokens(ELIDED_PLACEHOLDER) as i64,
                    ),
                };
                report.tokens_reclaimed += chunk.content_tokens - summary_tokens;
                self.chunks
                    .replace_content(chunk.id, &summary, summary_tokens)
                    .await?;
            }
            report.warm_to_cold += 1;
        }

        info!(
            subsystem = "engine",
            component = "compactor",
            op = "compress",
            hot_to_warm = report.hot_to_warm,
            warm_to_cold = report.warm_to_cold,
            tokens_reclaimed = report.tokens_reclaimed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Compaction complete"
        );
        Ok(report)
    }
}
