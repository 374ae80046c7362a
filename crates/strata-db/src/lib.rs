//! # strata-db
//!
//! PostgreSQL persistence layer for the strata memory engine.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for documents, chunks, extracts, and injections
//! - An in-memory store with identical semantics for deterministic tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/strata").await?;
//!     let counts = db.documents.count_by_tier(None).await?;
//!     println!("hot documents: {}", counts.hot);
//!     Ok(())
//! }
//! ```

pub mod chunks;
pub mod documents;
pub mod extracts;
pub mod injections;
pub mod mem;
pub mod pool;

// Re-export core types
pub use strata_core::*;

pub use chunks::{escape_like, PgChunkRepository};
pub use documents::PgDocumentRepository;
pub use extracts::PgExtractRepository;
pub use injections::PgInjectionRepository;
pub use mem::MemStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Aggregate of all repositories sharing one connection pool.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Document header repository.
    pub documents: PgDocumentRepository,
    /// Chunk repository, including candidate search.
    pub chunks: PgChunkRepository,
    /// Compression extract repository.
    pub extracts: PgExtractRepository,
    /// Context injection repository.
    pub injections: PgInjectionRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            documents: PgDocumentRepository::new(pool.clone()),
            chunks: PgChunkRepository::new(pool.clone()),
            extracts: PgExtractRepository::new(pool.clone()),
            injections: PgInjectionRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
