//! # jobscout-jobs
//!
//! Refresh orchestration for jobscout.
//!
//! This crate provides:
//! - [`RefreshPipeline`]: the scrape → normalize → dedupe → persist →
//!   retire-stale cycle, runnable on demand
//! - [`RefreshScheduler`]: a timer loop running unforced cycles on a fixed
//!   cadence with graceful shutdown
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use jobscout_jobs::{PassthroughScorer, RefreshPipeline, RefreshScheduler, SchedulerConfig};
//! use jobscout_db::Database;
//! use jobscout_core::ScrapeConfig;
//!
//! let db = Database::connect("postgres://...").await?;
//! let config = Arc::new(ScrapeConfig::from_env());
//!
//! let mut pipeline = RefreshPipeline::new(
//!     db.jobs.clone(), db.runs.clone(), db.profiles.clone(),
//!     Arc::new(PassthroughScorer), config,
//! );
//! pipeline.add_driver(Arc::new(my_driver));
//! let pipeline = Arc::new(pipeline);
//!
//! // Timer-driven cycles, plus a manual trigger whenever needed:
//! let handle = RefreshScheduler::new(pipeline.clone(), SchedulerConfig::from_env()).start();
//! let outcome = pipeline.run(true).await;
//!
//! handle.shutdown().await?;
//! ```

pub mod refresh;
pub mod scheduler;

// Re-export core types
pub use jobscout_core::*;

pub use refresh::{PassthroughScorer, RefreshPipeline};
pub use scheduler::{RefreshScheduler, SchedulerConfig, SchedulerHandle, DEFAULT_REFRESH_INTERVAL_SECS};
