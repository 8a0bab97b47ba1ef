//! The source driver capability interface.
//!
//! Each external source implements [`SourceDriver`] independently — an API
//! client, an HTTP board scraper, and a browser-automated scraper are
//! peers behind the same trait, with the shared normalization helpers
//! composed in rather than inherited.

use async_trait::async_trait;

use jobscout_core::{RawCandidate, Result};

/// What one driver harvested in one cycle.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub candidates: Vec<RawCandidate>,
    /// Candidate-level extraction failures (malformed cards) that were
    /// logged and skipped without aborting the batch.
    pub failed: u64,
}

impl Discovery {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A single external job source.
#[async_trait]
pub trait SourceDriver: Send + Sync {
    /// Stable source identifier, recorded on every candidate.
    fn source(&self) -> &str;

    /// Whether the driver can operate at all. Drivers that found their
    /// runtime dependency missing at construction report `false` and
    /// short-circuit [`discover`](Self::discover) to an empty result.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Query the source for the given terms and location.
    ///
    /// Empty `search_terms` / absent `location` fall back to the configured
    /// defaults. Implementations apply the relevance pre-filter before
    /// returning and never let one malformed result fragment abort its
    /// siblings. A returned `Err` means the whole source failed this cycle;
    /// the caller isolates it.
    async fn discover(&self, search_terms: &[String], location: Option<&str>)
        -> Result<Discovery>;
}
