//! # jobscout-db
//!
//! PostgreSQL database layer for jobscout.
//!
//! This crate provides:
//! - Connection pool management
//! - Store implementations for jobs, refresh runs, and preference profiles
//! - Embedded schema migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use jobscout_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/jobscout").await?;
//!     db.migrate().await?;
//!
//!     let total = db.jobs.count_all().await?;
//!     println!("{total} jobs stored");
//!     Ok(())
//! }
//! ```

pub mod jobs;
pub mod pool;
pub mod profiles;
pub mod refresh_runs;

use std::sync::Arc;

use sqlx::PgPool;

// Re-export core types
pub use jobscout_core::*;

pub use jobs::PgJobStore;
pub use pool::{connect, PoolConfig};
pub use profiles::PgProfileReader;
pub use refresh_runs::PgRefreshRunStore;

/// Handle bundling all store implementations over one pool.
#[derive(Clone)]
pub struct Database {
    pub jobs: Arc<PgJobStore>,
    pub runs: Arc<PgRefreshRunStore>,
    pub profiles: Arc<PgProfileReader>,
    pool: PgPool,
}

impl Database {
    /// Connect with default pool settings.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with(database_url, PoolConfig::default()).await
    }

    /// Connect with explicit pool settings.
    pub async fn connect_with(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = pool::connect(database_url, config).await?;
        Ok(Self::from_pool(pool))
    }

    /// Build the store handles over an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            jobs: Arc::new(PgJobStore::new(pool.clone())),
            runs: Arc::new(PgRefreshRunStore::new(pool.clone())),
            profiles: Arc::new(PgProfileReader::new(pool.clone())),
            pool,
        }
    }

    /// Apply embedded schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
