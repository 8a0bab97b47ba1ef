//! In-memory store implementations for tests.
//!
//! Always compiled so integration tests in dependent crates (aggregator,
//! orchestrator) can use them without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::traits::*;

/// HashMap-backed [`JobStore`] keyed by fingerprint.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<HashMap<String, NormalizedJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored jobs, for assertions.
    pub fn all(&self) -> Vec<NormalizedJob> {
        self.jobs.lock().unwrap().values().cloned().collect()
    }

    /// Backdate a job's `last_seen_at`, for retention tests.
    pub fn set_last_seen(&self, fingerprint: &str, last_seen_at: DateTime<Utc>) {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(fingerprint) {
            job.last_seen_at = last_seen_at;
        }
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn upsert(&self, job: NewJob) -> Result<UpsertOutcome> {
        let now = Utc::now();
        let mut jobs = self.jobs.lock().unwrap();

        if let Some(existing) = jobs.get_mut(&job.fingerprint) {
            existing.last_seen_at = now;
            existing.times_seen += 1;
            return Ok(UpsertOutcome::Refreshed(existing.id));
        }

        // (source, external_id) uniqueness backs fingerprint dedup.
        if let Some(existing) = jobs
            .values_mut()
            .find(|j| j.source == job.source && j.external_id == job.external_id)
        {
            existing.last_seen_at = now;
            existing.times_seen += 1;
            return Ok(UpsertOutcome::Refreshed(existing.id));
        }

        let id = Uuid::new_v4();
        jobs.insert(
            job.fingerprint.clone(),
            NormalizedJob {
                id,
                title: job.title,
                company: job.company,
                description: job.description,
                location: job.location,
                location_type: job.location_type,
                salary_min: job.salary_min,
                salary_max: job.salary_max,
                salary_currency: job.salary_currency,
                experience_level: job.experience_level,
                job_type: job.job_type,
                skills: job.skills,
                posted_date: job.posted_date,
                source: job.source,
                external_id: job.external_id,
                source_url: job.source_url,
                fingerprint: job.fingerprint,
                first_seen_at: now,
                last_seen_at: now,
                times_seen: 1,
            },
        );
        Ok(UpsertOutcome::Inserted(id))
    }

    async fn fetch_by_fingerprint(&self, fingerprint: &str) -> Result<Option<NormalizedJob>> {
        Ok(self.jobs.lock().unwrap().get(fingerprint).cloned())
    }

    async fn count_stale(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let jobs = self.jobs.lock().unwrap();
        Ok(jobs.values().filter(|j| j.last_seen_at < cutoff).count() as u64)
    }

    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut jobs = self.jobs.lock().unwrap();
        let before = jobs.len();
        jobs.retain(|_, j| j.last_seen_at >= cutoff);
        Ok((before - jobs.len()) as u64)
    }

    async fn count_all(&self) -> Result<i64> {
        Ok(self.jobs.lock().unwrap().len() as i64)
    }
}

/// Vec-backed [`RefreshRunStore`].
#[derive(Default)]
pub struct InMemoryRunStore {
    runs: Mutex<Vec<RefreshRun>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a finished run, for freshness-gate tests.
    pub fn push(&self, run: RefreshRun) {
        self.runs.lock().unwrap().push(run);
    }

    pub fn all(&self) -> Vec<RefreshRun> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl RefreshRunStore for InMemoryRunStore {
    async fn begin(&self) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.runs.lock().unwrap().push(RefreshRun {
            id,
            started_at: Utc::now(),
            finished_at: None,
            status: RefreshStatus::Running,
            source_counts: Vec::new(),
            deleted_stale: 0,
            error: None,
        });
        Ok(id)
    }

    async fn finalize(&self, run: &RefreshRun) -> Result<()> {
        let mut runs = self.runs.lock().unwrap();
        if let Some(slot) = runs.iter_mut().find(|r| r.id == run.id) {
            *slot = run.clone();
        } else {
            runs.push(run.clone());
        }
        Ok(())
    }

    async fn latest_successful(&self) -> Result<Option<RefreshRun>> {
        let runs = self.runs.lock().unwrap();
        Ok(runs
            .iter()
            .filter(|r| {
                matches!(r.status, RefreshStatus::Success | RefreshStatus::Partial)
                    && r.finished_at.is_some()
            })
            .max_by_key(|r| r.finished_at)
            .cloned())
    }
}

/// [`ProfileReader`] returning a fixed snapshot.
pub struct StaticProfileReader {
    profile: Option<UserPreferenceProfile>,
}

impl StaticProfileReader {
    pub fn new(profile: Option<UserPreferenceProfile>) -> Self {
        Self { profile }
    }

    pub fn empty() -> Self {
        Self { profile: None }
    }
}

#[async_trait]
impl ProfileReader for StaticProfileReader {
    async fn active_profile(&self) -> Result<Option<UserPreferenceProfile>> {
        Ok(self.profile.clone())
    }
}

/// [`JobScorer`] that keeps every job and counts invocations.
#[derive(Default)]
pub struct CountingScorer {
    calls: AtomicU64,
}

impl CountingScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobScorer for CountingScorer {
    async fn score_new_jobs(&self, job_ids: &[Uuid]) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(job_ids.len() as u64)
    }
}

/// Convenience builder for a candidate with sensible defaults.
pub fn candidate(source: &str, external_id: &str, title: &str, description: &str) -> RawCandidate {
    RawCandidate {
        title: title.to_string(),
        company: Some("Initech".to_string()),
        description: description.to_string(),
        location: Some("New York, NY".to_string()),
        salary_text: None,
        posted_at: None,
        source: source.to_string(),
        external_id: external_id.to_string(),
        source_url: format!("https://{source}.example/jobs/{external_id}"),
        discovered_at: Utc::now(),
    }
}
