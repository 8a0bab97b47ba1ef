//! Live-database store tests.
//!
//! These run against a real PostgreSQL instance and are ignored by default:
//! `DATABASE_URL=postgres://localhost/jobscout_test cargo test -- --ignored`

use chrono::{Duration, Utc};
use jobscout_db::{
    fingerprint, Database, EmploymentType, ExperienceLevel, JobStore, LocationType, NewJob,
};

fn test_job(source: &str, external_id: &str, title: &str, description: &str) -> NewJob {
    NewJob {
        title: title.to_string(),
        company: Some("Initech".to_string()),
        description: description.to_string(),
        location: Some("Remote".to_string()),
        location_type: LocationType::Remote,
        salary_min: Some(90000),
        salary_max: Some(120000),
        salary_currency: "USD".to_string(),
        experience_level: ExperienceLevel::Mid,
        job_type: EmploymentType::FullTime,
        skills: vec!["Rust".to_string()],
        posted_date: None,
        source: source.to_string(),
        external_id: external_id.to_string(),
        source_url: format!("https://{source}.example/jobs/{external_id}"),
        fingerprint: fingerprint(title, description, 200),
    }
}

async fn connect() -> Database {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for ignored tests");
    let db = Database::connect(&url).await.expect("connect");
    db.migrate().await.expect("migrate");
    sqlx::query("TRUNCATE jobs, refresh_runs, preference_profiles")
        .execute(db.pool())
        .await
        .expect("truncate");
    db
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn upsert_is_idempotent_per_fingerprint() {
    let db = connect().await;

    let job = test_job("remoteok", "101", "Backend Engineer", "Build services in Rust.");
    let first = db.jobs.upsert(job.clone()).await.unwrap();
    let second = db.jobs.upsert(job).await.unwrap();

    assert!(first.is_new());
    assert!(!second.is_new());
    assert_eq!(first.id(), second.id());
    assert_eq!(db.jobs.count_all().await.unwrap(), 1);

    let stored = db
        .jobs
        .fetch_by_fingerprint(&fingerprint(
            "Backend Engineer",
            "Build services in Rust.",
            200,
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.times_seen, 2);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn cross_source_duplicate_collapses_and_first_write_wins() {
    let db = connect().await;

    let mut original = test_job("remoteok", "201", "Data Engineer", "Pipelines all day.");
    original.company = Some("Hooli".to_string());
    let mut duplicate = test_job("board", "999", "Data Engineer", "Pipelines all day.");
    duplicate.company = Some("Pied Piper".to_string());

    db.jobs.upsert(original).await.unwrap();
    let outcome = db.jobs.upsert(duplicate).await.unwrap();

    assert!(!outcome.is_new());
    let stored = db
        .jobs
        .fetch_by_fingerprint(&fingerprint("Data Engineer", "Pipelines all day.", 200))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.company.as_deref(), Some("Hooli"));
    assert_eq!(stored.source, "remoteok");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn delete_stale_removes_only_old_rows() {
    let db = connect().await;

    db.jobs
        .upsert(test_job("remoteok", "301", "Old Role", "Dusty description."))
        .await
        .unwrap();
    db.jobs
        .upsert(test_job("remoteok", "302", "New Role", "Fresh description."))
        .await
        .unwrap();

    // Backdate one row past the staleness window.
    sqlx::query("UPDATE jobs SET last_seen_at = $1 WHERE external_id = '301'")
        .bind(Utc::now() - Duration::days(45))
        .execute(db.pool())
        .await
        .unwrap();

    let cutoff = Utc::now() - Duration::days(30);
    assert_eq!(db.jobs.count_stale(cutoff).await.unwrap(), 1);
    assert_eq!(db.jobs.delete_stale(cutoff).await.unwrap(), 1);
    assert_eq!(db.jobs.count_all().await.unwrap(), 1);
}
