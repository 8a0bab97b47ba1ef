//! End-to-end refresh cycle behavior against in-memory stores.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use jobscout_core::test_fixtures::{
    candidate, CountingScorer, InMemoryJobStore, InMemoryRunStore, StaticProfileReader,
};
use jobscout_core::{
    fingerprint, EmploymentType, Error, ExperienceLevel, JobScorer, JobStore, LocationType,
    NewJob, RefreshRun, RefreshStatus, Result, ScrapeConfig,
};
use jobscout_jobs::{PassthroughScorer, RefreshPipeline};
use jobscout_scrape::test_support::{FailingDriver, StaticDriver};

struct FailingScorer;

#[async_trait]
impl JobScorer for FailingScorer {
    async fn score_new_jobs(&self, _job_ids: &[Uuid]) -> Result<u64> {
        Err(Error::Scoring("scoring backend unreachable".to_string()))
    }
}

struct Harness {
    jobs: Arc<InMemoryJobStore>,
    runs: Arc<InMemoryRunStore>,
    scorer: Arc<CountingScorer>,
}

impl Harness {
    fn new() -> Self {
        Self {
            jobs: Arc::new(InMemoryJobStore::new()),
            runs: Arc::new(InMemoryRunStore::new()),
            scorer: Arc::new(CountingScorer::new()),
        }
    }

    fn pipeline(&self, drivers: Vec<Arc<dyn jobscout_scrape::SourceDriver>>) -> RefreshPipeline {
        let mut pipeline = RefreshPipeline::new(
            self.jobs.clone(),
            self.runs.clone(),
            Arc::new(StaticProfileReader::empty()),
            self.scorer.clone(),
            Arc::new(ScrapeConfig::default()),
        );
        for driver in drivers {
            pipeline.add_driver(driver);
        }
        pipeline
    }

    fn seed_successful_run(&self, finished_ago: Duration) {
        let finished = Utc::now() - finished_ago;
        self.runs.push(RefreshRun {
            id: Uuid::new_v4(),
            started_at: finished - Duration::minutes(5),
            finished_at: Some(finished),
            status: RefreshStatus::Success,
            source_counts: Vec::new(),
            deleted_stale: 0,
            error: None,
        });
    }
}

fn stale_job(title: &str) -> NewJob {
    NewJob {
        title: title.to_string(),
        company: None,
        description: "An old posting.".to_string(),
        location: None,
        location_type: LocationType::Unspecified,
        salary_min: None,
        salary_max: None,
        salary_currency: "USD".to_string(),
        experience_level: ExperienceLevel::Unspecified,
        job_type: EmploymentType::Unspecified,
        skills: Vec::new(),
        posted_date: None,
        source: "remoteok".to_string(),
        external_id: title.to_string(),
        source_url: format!("https://remoteok.example/{title}"),
        fingerprint: fingerprint(title, "An old posting.", 200),
    }
}

#[tokio::test]
async fn freshness_gate_skips_without_touching_drivers() {
    let h = Harness::new();
    h.seed_successful_run(Duration::hours(1));

    let driver = Arc::new(StaticDriver::new(
        "remoteok",
        vec![candidate("remoteok", "1", "Python Developer", "Django work.")],
    ));
    let pipeline = h.pipeline(vec![driver.clone()]);

    let outcome = pipeline.run(false).await;

    assert!(outcome.success);
    assert_eq!(outcome.added_new_jobs, Some(0));
    assert_eq!(driver.calls(), 0);
    assert_eq!(h.scorer.calls(), 0);
}

#[tokio::test]
async fn force_flag_bypasses_freshness_gate() {
    let h = Harness::new();
    h.seed_successful_run(Duration::hours(1));

    let driver = Arc::new(StaticDriver::new(
        "remoteok",
        vec![candidate("remoteok", "1", "Python Developer", "Django work.")],
    ));
    let pipeline = h.pipeline(vec![driver.clone()]);

    let outcome = pipeline.run(true).await;

    assert!(outcome.success);
    assert_eq!(outcome.added_new_jobs, Some(1));
    assert_eq!(outcome.total_jobs, Some(1));
    assert_eq!(driver.calls(), 1);
}

#[tokio::test]
async fn stale_gate_allows_unforced_refresh() {
    let h = Harness::new();
    h.seed_successful_run(Duration::hours(7));

    let driver = Arc::new(StaticDriver::new(
        "remoteok",
        vec![candidate("remoteok", "1", "Python Developer", "Django work.")],
    ));
    let pipeline = h.pipeline(vec![driver.clone()]);

    let outcome = pipeline.run(false).await;

    assert!(outcome.success);
    assert_eq!(driver.calls(), 1);
    assert_eq!(outcome.added_new_jobs, Some(1));
}

#[tokio::test]
async fn running_twice_is_idempotent() {
    let h = Harness::new();
    let driver = Arc::new(StaticDriver::new(
        "remoteok",
        vec![
            candidate("remoteok", "1", "Python Developer", "Django work."),
            candidate("remoteok", "2", "Backend Developer", "Python APIs."),
        ],
    ));
    let pipeline = h.pipeline(vec![driver.clone()]);

    let first = pipeline.run(true).await;
    let second = pipeline.run(true).await;

    assert_eq!(first.added_new_jobs, Some(2));
    assert_eq!(second.added_new_jobs, Some(0));
    assert_eq!(second.total_jobs, Some(2));
    assert_eq!(h.jobs.count_all().await.unwrap(), 2);
}

#[tokio::test]
async fn retention_sweep_deletes_and_reports() {
    let h = Harness::new();

    // A posting last observed 45 days ago, past the 30-day window.
    let old = stale_job("dusty-role");
    let old_fp = old.fingerprint.clone();
    h.jobs.upsert(old).await.unwrap();
    h.jobs
        .set_last_seen(&old_fp, Utc::now() - Duration::days(45));

    // And one observed recently.
    let fresh = stale_job("fresh-role");
    let fresh_fp = fresh.fingerprint.clone();
    h.jobs.upsert(fresh).await.unwrap();
    h.jobs
        .set_last_seen(&fresh_fp, Utc::now() - Duration::days(2));

    let pipeline = h.pipeline(vec![Arc::new(StaticDriver::new("remoteok", Vec::new()))]);
    let outcome = pipeline.run(true).await;

    assert!(outcome.success);
    assert_eq!(outcome.deleted_old_jobs, 1);
    assert_eq!(h.jobs.count_all().await.unwrap(), 1);
    assert!(h
        .jobs
        .fetch_by_fingerprint(&fresh_fp)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn source_failure_is_isolated_and_marked_partial() {
    let h = Harness::new();
    let good = Arc::new(StaticDriver::new(
        "remoteok",
        vec![candidate("remoteok", "1", "Python Developer", "Django work.")],
    ));
    let pipeline = h.pipeline(vec![Arc::new(FailingDriver::new("board")), good.clone()]);

    let outcome = pipeline.run(true).await;

    // The failing source never becomes a cycle failure.
    assert!(outcome.success);
    assert_eq!(outcome.added_new_jobs, Some(1));

    let runs = h.runs.all();
    let finished = runs.iter().find(|r| r.finished_at.is_some()).unwrap();
    assert_eq!(finished.status, RefreshStatus::Partial);
    let board = finished
        .source_counts
        .iter()
        .find(|c| c.source == "board")
        .unwrap();
    assert_eq!(board.fetched, 0);
    assert_eq!(board.failed, 1);
}

#[tokio::test]
async fn scoring_failure_reports_committed_deletes() {
    let h = Harness::new();

    let old = stale_job("doomed-role");
    let old_fp = old.fingerprint.clone();
    h.jobs.upsert(old).await.unwrap();
    h.jobs
        .set_last_seen(&old_fp, Utc::now() - Duration::days(45));

    let mut pipeline = RefreshPipeline::new(
        h.jobs.clone(),
        h.runs.clone(),
        Arc::new(StaticProfileReader::empty()),
        Arc::new(FailingScorer),
        Arc::new(ScrapeConfig::default()),
    );
    pipeline.add_driver(Arc::new(StaticDriver::new(
        "remoteok",
        vec![candidate("remoteok", "1", "Python Developer", "Django work.")],
    )));

    let outcome = pipeline.run(true).await;

    assert!(!outcome.success);
    assert!(outcome.error.as_deref().unwrap().contains("scoring"));
    // Retention had already committed before scoring blew up.
    assert_eq!(outcome.deleted_old_jobs, 1);

    let runs = h.runs.all();
    let failed = runs.iter().find(|r| r.finished_at.is_some()).unwrap();
    assert_eq!(failed.status, RefreshStatus::Failure);
    assert!(failed.error.is_some());
}

#[tokio::test]
async fn scorer_counts_pass_through_to_outcome() {
    struct HalfScorer;

    #[async_trait]
    impl JobScorer for HalfScorer {
        async fn score_new_jobs(&self, job_ids: &[Uuid]) -> Result<u64> {
            Ok((job_ids.len() / 2) as u64)
        }
    }

    let h = Harness::new();
    let mut pipeline = RefreshPipeline::new(
        h.jobs.clone(),
        h.runs.clone(),
        Arc::new(StaticProfileReader::empty()),
        Arc::new(HalfScorer),
        Arc::new(ScrapeConfig::default()),
    );
    pipeline.add_driver(Arc::new(StaticDriver::new(
        "remoteok",
        vec![
            candidate("remoteok", "1", "Python Developer", "Django work."),
            candidate("remoteok", "2", "Backend Developer", "Python APIs."),
        ],
    )));

    let outcome = pipeline.run(true).await;

    // added_new_jobs is what the scorer reported, not the raw insert count.
    assert_eq!(outcome.added_new_jobs, Some(1));
}

#[tokio::test]
async fn passthrough_scorer_keeps_everything() {
    let scorer = PassthroughScorer;
    let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
    assert_eq!(scorer.score_new_jobs(&ids).await.unwrap(), 2);
}
