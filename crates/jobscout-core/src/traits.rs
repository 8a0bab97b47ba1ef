//! Core traits for jobscout abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability. The Postgres
//! implementations live in `jobscout-db`; in-memory versions for tests live
//! in [`crate::test_fixtures`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

/// Persistent job store.
///
/// The aggregator is the sole writer during a refresh cycle. Upserts key on
/// the content fingerprint and must be atomic per record.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert the job, or — when its fingerprint (or `(source,
    /// external_id)` pair) is already present — bump `last_seen_at` and
    /// `times_seen` on the existing row, leaving first-written content
    /// untouched.
    async fn upsert(&self, job: NewJob) -> Result<UpsertOutcome>;

    /// Fetch a job by its dedup fingerprint.
    async fn fetch_by_fingerprint(&self, fingerprint: &str) -> Result<Option<NormalizedJob>>;

    /// Count rows whose `last_seen_at` is older than `cutoff`.
    async fn count_stale(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    /// Delete rows whose `last_seen_at` is older than `cutoff`, returning
    /// how many were removed. Irreversible.
    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    /// Count all stored jobs.
    async fn count_all(&self) -> Result<i64>;
}

/// Store for refresh-cycle execution records.
///
/// The latest successful run is the freshness reference for the next cycle;
/// there is no process-global "last refresh" signal.
#[async_trait]
pub trait RefreshRunStore: Send + Sync {
    /// Record the start of a cycle, returning its id.
    async fn begin(&self) -> Result<Uuid>;

    /// Write the finalized run. Runs are immutable afterwards.
    async fn finalize(&self, run: &RefreshRun) -> Result<()>;

    /// The most recent run that finished with data (success or partial).
    async fn latest_successful(&self) -> Result<Option<RefreshRun>>;
}

/// Read access to the single active preference profile.
#[async_trait]
pub trait ProfileReader: Send + Sync {
    /// The currently active profile, or `None` when none is configured.
    /// Treated as an immutable snapshot for the duration of a cycle.
    async fn active_profile(&self) -> Result<Option<UserPreferenceProfile>>;
}

/// Downstream scoring collaborator.
///
/// Invoked with the ids of jobs freshly added this cycle; returns how many
/// survived scoring. Scoring internals are outside this crate.
#[async_trait]
pub trait JobScorer: Send + Sync {
    async fn score_new_jobs(&self, job_ids: &[Uuid]) -> Result<u64>;
}
