//! Structured logging schema and field name constants for strata.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Operation completions (index, compress, context assembly) |
//! | DEBUG | Decision points, stage transitions, budget arithmetic |
//! | TRACE | Per-chunk iteration, high-volume data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "engine", "db", "core"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "indexer", "search", "context", "compactor", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "index", "search", "get_context", "compress"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Document UUID being operated on.
pub const DOCUMENT_ID: &str = "document_id";

/// Owning agent UUID.
pub const AGENT_ID: &str = "agent_id";

/// Storage tier of the document ("hot", "warm", "cold").
pub const TIER: &str = "tier";

/// Search or context query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of chunks processed.
pub const CHUNK_COUNT: &str = "chunk_count";

/// Estimated tokens consumed by an assembled context.
pub const TOKENS_USED: &str = "tokens_used";

/// Caller-supplied token budget.
pub const TOKEN_BUDGET: &str = "token_budget";

/// Estimated tokens reclaimed by compaction.
pub const TOKENS_RECLAIMED: &str = "tokens_reclaimed";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
