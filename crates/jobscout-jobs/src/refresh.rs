//! The refresh cycle orchestrator.
//!
//! One cycle is: freshness gate → retention sweep → scrape every source →
//! aggregate/upsert → hand new jobs to the scorer → finalize a
//! [`RefreshRun`]. The structured [`RefreshOutcome`] it returns is the only
//! contract surfaced to callers; what downstream systems do with it is
//! theirs to decide.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use jobscout_core::{
    JobScorer, JobStore, ProfileReader, RefreshOutcome, RefreshRun, RefreshRunStore,
    RefreshStatus, Result, ScrapeConfig,
};
use jobscout_scrape::aggregate::{Aggregator, SourceBatch};
use jobscout_scrape::driver::SourceDriver;

/// Scorer that keeps every new job, for deployments without a scoring
/// service wired in.
pub struct PassthroughScorer;

#[async_trait]
impl JobScorer for PassthroughScorer {
    async fn score_new_jobs(&self, job_ids: &[Uuid]) -> Result<u64> {
        Ok(job_ids.len() as u64)
    }
}

/// Mutable progress a cycle has made, kept outside the fallible path so a
/// failure outcome can still report committed work.
#[derive(Default)]
struct CycleState {
    deleted: u64,
    run: Option<(Uuid, DateTime<Utc>)>,
}

pub struct RefreshPipeline {
    jobs: Arc<dyn JobStore>,
    runs: Arc<dyn RefreshRunStore>,
    profiles: Arc<dyn ProfileReader>,
    scorer: Arc<dyn JobScorer>,
    drivers: Vec<Arc<dyn SourceDriver>>,
    aggregator: Aggregator,
    config: Arc<ScrapeConfig>,
    /// One cycle at a time against the shared store.
    cycle_lock: Mutex<()>,
}

impl RefreshPipeline {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        runs: Arc<dyn RefreshRunStore>,
        profiles: Arc<dyn ProfileReader>,
        scorer: Arc<dyn JobScorer>,
        config: Arc<ScrapeConfig>,
    ) -> Self {
        let aggregator = Aggregator::new(jobs.clone(), config.clone());
        Self {
            jobs,
            runs,
            profiles,
            scorer,
            drivers: Vec::new(),
            aggregator,
            config,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Register a source. Drivers run sequentially in registration order,
    /// so output order is deterministic for identical inputs.
    pub fn add_driver(&mut self, driver: Arc<dyn SourceDriver>) -> &mut Self {
        self.drivers.push(driver);
        self
    }

    /// Execute one refresh cycle.
    ///
    /// Never panics and never escapes an error: a cycle-level failure is
    /// folded into a `success: false` outcome whose `deleted_old_jobs`
    /// reflects retention work already committed.
    pub async fn run(&self, force: bool) -> RefreshOutcome {
        let _guard = self.cycle_lock.lock().await;

        let mut state = CycleState::default();
        match self.cycle(force, &mut state).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, deleted = state.deleted, "Refresh cycle failed");
                if let Some((run_id, started_at)) = state.run {
                    self.finalize_failure(run_id, started_at, state.deleted, &e.to_string())
                        .await;
                }
                RefreshOutcome::failed(e.to_string(), state.deleted)
            }
        }
    }

    async fn cycle(&self, force: bool, state: &mut CycleState) -> Result<RefreshOutcome> {
        // Fast no-op path: recent successful run and no force flag. Must
        // not touch drivers.
        if !force {
            if let Some(last) = self.runs.latest_successful().await? {
                if let Some(finished) = last.finished_at {
                    if Utc::now() - finished < self.config.freshness_window() {
                        debug!(last_refresh = %finished, "Jobs are fresh, skipping refresh");
                        let total = self.jobs.count_all().await?;
                        return Ok(RefreshOutcome::fresh(total, finished));
                    }
                }
            }
        }

        let started_at = Utc::now();
        let run_id = self.runs.begin().await?;
        state.run = Some((run_id, started_at));

        // Retention sweep: count and log before the delete commits.
        let cutoff = started_at - self.config.staleness_window();
        let stale = self.jobs.count_stale(cutoff).await?;
        if stale > 0 {
            info!(count = stale, %cutoff, "Retention sweep removing stale jobs");
        }
        state.deleted = self.jobs.delete_stale(cutoff).await?;

        // Profile snapshot for this cycle; drivers fall back to configured
        // defaults when it supplies nothing.
        let profile = self.profiles.active_profile().await?;
        let terms: Vec<String> = profile
            .as_ref()
            .map(|p| p.search_terms.clone())
            .unwrap_or_default();
        let location = profile
            .as_ref()
            .and_then(|p| p.preferred_locations.first().cloned());

        let mut batches = Vec::with_capacity(self.drivers.len());
        let mut any_source_failed = false;
        for driver in &self.drivers {
            let source = driver.source().to_string();
            match driver.discover(&terms, location.as_deref()).await {
                Ok(discovery) => batches.push(SourceBatch::ok(source, discovery)),
                Err(e) => {
                    // Source-level isolation: this source contributes
                    // nothing, the cycle continues.
                    warn!(source = %source, error = %e,
                          "Source failed, contributing zero candidates this cycle");
                    any_source_failed = true;
                    batches.push(SourceBatch::failed(source));
                }
            }
        }

        let report = self.aggregator.ingest(batches).await?;
        let kept = self.scorer.score_new_jobs(&report.new_job_ids).await?;
        let total = self.jobs.count_all().await?;
        let finished_at = Utc::now();

        let status = if any_source_failed {
            RefreshStatus::Partial
        } else {
            RefreshStatus::Success
        };
        self.runs
            .finalize(&RefreshRun {
                id: run_id,
                started_at,
                finished_at: Some(finished_at),
                status,
                source_counts: report.counts.clone(),
                deleted_stale: state.deleted,
                error: None,
            })
            .await?;

        info!(
            fetched = report.fetched_total(),
            new = report.new_total(),
            kept,
            deleted = state.deleted,
            total,
            status = status.as_str(),
            "Refresh cycle complete"
        );
        Ok(RefreshOutcome::completed(
            format!("Refresh completed: {kept} new jobs added"),
            state.deleted,
            kept,
            total,
            finished_at,
        ))
    }

    /// Best effort: make the failure observable alongside the successes.
    async fn finalize_failure(
        &self,
        run_id: Uuid,
        started_at: DateTime<Utc>,
        deleted: u64,
        error_summary: &str,
    ) {
        let run = RefreshRun {
            id: run_id,
            started_at,
            finished_at: Some(Utc::now()),
            status: RefreshStatus::Failure,
            source_counts: Vec::new(),
            deleted_stale: deleted,
            error: Some(error_summary.to_string()),
        };
        if let Err(e) = self.runs.finalize(&run).await {
            error!(error = %e, "Could not record failed refresh run");
        }
    }
}
