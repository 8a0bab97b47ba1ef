//! Job store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use jobscout_core::{
    EmploymentType, ExperienceLevel, JobStore, LocationType, NewJob, NormalizedJob, Result,
    UpsertOutcome,
};

/// PostgreSQL implementation of [`JobStore`].
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn parse_job_row(row: sqlx::postgres::PgRow) -> NormalizedJob {
        NormalizedJob {
            id: row.get("id"),
            title: row.get("title"),
            company: row.get("company"),
            description: row.get("description"),
            location: row.get("location"),
            location_type: LocationType::parse(row.get("location_type")),
            salary_min: row.get("salary_min"),
            salary_max: row.get("salary_max"),
            salary_currency: row.get("salary_currency"),
            experience_level: ExperienceLevel::parse(row.get("experience_level")),
            job_type: EmploymentType::parse(row.get("job_type")),
            skills: row.get::<Json<Vec<String>>, _>("skills").0,
            posted_date: row.get("posted_date"),
            source: row.get("source"),
            external_id: row.get("external_id"),
            source_url: row.get("source_url"),
            fingerprint: row.get("fingerprint"),
            first_seen_at: row.get("first_seen_at"),
            last_seen_at: row.get("last_seen_at"),
            times_seen: row.get("times_seen"),
        }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    /// Atomic insert-or-refresh keyed on the content fingerprint.
    ///
    /// On conflict only `last_seen_at` and `times_seen` move; first-written
    /// content is preserved. A conflict on `(source, external_id)` with a
    /// *different* fingerprint (description drifted past the prefix) falls
    /// back to refreshing that row instead of duplicating the posting.
    async fn upsert(&self, job: NewJob) -> Result<UpsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (
                id, title, company, description, location, location_type,
                salary_min, salary_max, salary_currency, experience_level,
                job_type, skills, posted_date, source, external_id,
                source_url, fingerprint, first_seen_at, last_seen_at, times_seen
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, now(), now(), 1)
            ON CONFLICT (fingerprint) DO UPDATE
                SET last_seen_at = now(),
                    times_seen = jobs.times_seen + 1
            RETURNING id, (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.description)
        .bind(&job.location)
        .bind(job.location_type.as_str())
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(&job.salary_currency)
        .bind(job.experience_level.as_str())
        .bind(job.job_type.as_str())
        .bind(Json(&job.skills))
        .bind(job.posted_date)
        .bind(&job.source)
        .bind(&job.external_id)
        .bind(&job.source_url)
        .bind(&job.fingerprint)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => {
                let id: Uuid = row.get("id");
                if row.get::<bool, _>("inserted") {
                    Ok(UpsertOutcome::Inserted(id))
                } else {
                    Ok(UpsertOutcome::Refreshed(id))
                }
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                debug!(
                    source = %job.source,
                    external_id = %job.external_id,
                    "Fingerprint drifted for known posting, refreshing by source id"
                );
                let row = sqlx::query(
                    r#"
                    UPDATE jobs
                    SET last_seen_at = now(), times_seen = times_seen + 1
                    WHERE source = $1 AND external_id = $2
                    RETURNING id
                    "#,
                )
                .bind(&job.source)
                .bind(&job.external_id)
                .fetch_one(&self.pool)
                .await?;
                Ok(UpsertOutcome::Refreshed(row.get("id")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_by_fingerprint(&self, fingerprint: &str) -> Result<Option<NormalizedJob>> {
        let row = sqlx::query("SELECT * FROM jobs WHERE fingerprint = $1")
            .bind(fingerprint)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Self::parse_job_row))
    }

    async fn count_stale(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM jobs WHERE last_seen_at < $1")
            .bind(cutoff)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n") as u64)
    }

    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM jobs WHERE last_seen_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count_all(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM jobs")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}
