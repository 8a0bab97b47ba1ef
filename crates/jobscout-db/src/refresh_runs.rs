//! Refresh run store implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use jobscout_core::{RefreshRun, RefreshRunStore, RefreshStatus, Result, SourceCounts};

/// PostgreSQL implementation of [`RefreshRunStore`].
pub struct PgRefreshRunStore {
    pool: PgPool,
}

impl PgRefreshRunStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn parse_run_row(row: sqlx::postgres::PgRow) -> RefreshRun {
        RefreshRun {
            id: row.get("id"),
            started_at: row.get("started_at"),
            finished_at: row.get("finished_at"),
            status: RefreshStatus::parse(row.get("status")),
            source_counts: row.get::<Json<Vec<SourceCounts>>, _>("source_counts").0,
            deleted_stale: row.get::<i64, _>("deleted_stale") as u64,
            error: row.get("error"),
        }
    }
}

#[async_trait]
impl RefreshRunStore for PgRefreshRunStore {
    async fn begin(&self) -> Result<Uuid> {
        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO refresh_runs (id, started_at, status) VALUES ($1, $2, 'running')",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn finalize(&self, run: &RefreshRun) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE refresh_runs
            SET finished_at = $2,
                status = $3,
                source_counts = $4,
                deleted_stale = $5,
                error = $6
            WHERE id = $1
            "#,
        )
        .bind(run.id)
        .bind(run.finished_at)
        .bind(run.status.as_str())
        .bind(Json(&run.source_counts))
        .bind(run.deleted_stale as i64)
        .bind(&run.error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn latest_successful(&self) -> Result<Option<RefreshRun>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM refresh_runs
            WHERE status IN ('success', 'partial') AND finished_at IS NOT NULL
            ORDER BY finished_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Self::parse_run_row))
    }
}
