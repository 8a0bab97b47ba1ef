//! # jobscout-scrape
//!
//! Source drivers and aggregation for the jobscout ingestion pipeline.
//!
//! This crate provides:
//! - The [`SourceDriver`] capability trait
//! - A RemoteOK JSON API driver
//! - An HTTP job-board driver with configurable CSS selectors
//! - A browser-automated board driver (headless Chrome) for sources that
//!   block plain fetches
//! - The [`Aggregator`], which normalizes, dedupes, and upserts driver
//!   output

pub mod aggregate;
pub mod board;
pub mod browser;
pub mod driver;
pub mod remoteok;

// Driver doubles for dependent crates' tests.
// Note: Always compiled so integration tests (in tests/) can use them.
pub mod test_support;

// Re-export core types
pub use jobscout_core::*;

pub use aggregate::{Aggregator, IngestReport, SourceBatch};
pub use board::{BoardSelectors, HttpBoardDriver};
pub use browser::BrowserBoardDriver;
pub use driver::{Discovery, SourceDriver};
pub use remoteok::RemoteOkDriver;
