//! Driver doubles for tests.
//!
//! Always compiled so integration tests in dependent crates (the
//! orchestrator's in particular) can use them.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use jobscout_core::{Error, RawCandidate, Result};

use crate::driver::{Discovery, SourceDriver};

/// Driver returning a fixed candidate set and counting invocations, so
/// tests can assert the freshness gate never touched it.
pub struct StaticDriver {
    source: String,
    candidates: Vec<RawCandidate>,
    failed: u64,
    calls: AtomicU64,
}

impl StaticDriver {
    pub fn new(source: impl Into<String>, candidates: Vec<RawCandidate>) -> Self {
        Self {
            source: source.into(),
            candidates,
            failed: 0,
            calls: AtomicU64::new(0),
        }
    }

    /// Also report `failed` candidate-level skips per discovery.
    pub fn with_failed(mut self, failed: u64) -> Self {
        self.failed = failed;
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceDriver for StaticDriver {
    fn source(&self) -> &str {
        &self.source
    }

    async fn discover(
        &self,
        _search_terms: &[String],
        _location: Option<&str>,
    ) -> Result<Discovery> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Discovery {
            candidates: self.candidates.clone(),
            failed: self.failed,
        })
    }
}

/// Driver whose every discovery fails at source level.
pub struct FailingDriver {
    source: String,
}

impl FailingDriver {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

#[async_trait]
impl SourceDriver for FailingDriver {
    fn source(&self) -> &str {
        &self.source
    }

    async fn discover(
        &self,
        _search_terms: &[String],
        _location: Option<&str>,
    ) -> Result<Discovery> {
        Err(Error::Driver("search page failed to load".to_string()))
    }
}
