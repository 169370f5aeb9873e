use crate::StoreError;
use chrono::{DateTime, Duration, Utc};
use core_types::{
    Benchmark, BenchmarkKey, CommonSizeStatement, EnqueueOutcome, Job, PeriodType, StatementType,
};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::collections::BTreeMap;

/// What happened to a failed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobDisposition {
    /// The job went back to pending with a delayed visibility time.
    Requeued,
    /// The job exhausted its attempts and was removed; its key is open for
    /// re-enqueueing again.
    Dropped,
}

/// The `BenchmarkStore` provides a high-level interface to the benchmark
/// cache and the job queue. It encapsulates all SQL and guarantees that the
/// dedup check-and-enqueue and the per-key cache replacement are atomic.
#[derive(Debug, Clone)]
pub struct BenchmarkStore {
    pool: SqlitePool,
}

impl BenchmarkStore {
    /// Creates a new `BenchmarkStore` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // --- Benchmark cache ---

    /// Fetches the cached benchmark for `key`, if any. The store imposes no
    /// expiry; staleness is the caller's policy via `invalidate`.
    pub async fn get_benchmark(&self, key: &BenchmarkKey) -> Result<Option<Benchmark>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT base_concept, ratios, peers_used, failed_count, computed_at
            FROM benchmarks
            WHERE sic = ?1 AND statement = ?2 AND period = ?3 AND peer_count = ?4
            "#,
        )
        .bind(&key.sic)
        .bind(key.statement_type.as_str())
        .bind(key.period_type.as_str())
        .bind(key.peer_count as i64)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| benchmark_from_row(key.clone(), &row))
            .transpose()
    }

    /// Persists `benchmark`, replacing any prior entry for its key. Readers
    /// racing with this observe either the old row or the new one, never a
    /// partial write.
    pub async fn put_benchmark(&self, benchmark: &Benchmark) -> Result<(), StoreError> {
        if benchmark.peers_used.is_empty() {
            return Err(StoreError::EmptyBenchmark);
        }

        let ratios = serde_json::to_string(&benchmark.ratios.ratios)?;
        let peers_used = serde_json::to_string(&benchmark.peers_used)?;

        sqlx::query(
            r#"
            INSERT INTO benchmarks (
                sic, statement, period, peer_count,
                base_concept, ratios, peers_used, failed_count, computed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(sic, statement, period, peer_count)
            DO UPDATE SET
                base_concept = excluded.base_concept,
                ratios = excluded.ratios,
                peers_used = excluded.peers_used,
                failed_count = excluded.failed_count,
                computed_at = excluded.computed_at
            "#,
        )
        .bind(&benchmark.key.sic)
        .bind(benchmark.key.statement_type.as_str())
        .bind(benchmark.key.period_type.as_str())
        .bind(benchmark.key.peer_count as i64)
        .bind(&benchmark.ratios.base_concept)
        .bind(ratios)
        .bind(peers_used)
        .bind(benchmark.failed_count as i64)
        .bind(benchmark.computed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Drops the cached benchmark for `key` so the next `get_benchmark`
    /// misses, regardless of how recently it was computed.
    pub async fn invalidate(&self, key: &BenchmarkKey) -> Result<(), StoreError> {
        sqlx::query(
            "DELETE FROM benchmarks WHERE sic = ?1 AND statement = ?2 AND period = ?3 AND peer_count = ?4",
        )
        .bind(&key.sic)
        .bind(key.statement_type.as_str())
        .bind(key.period_type.as_str())
        .bind(key.peer_count as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // --- Job queue ---

    /// Queues a benchmark computation for `key` unless one is already pending
    /// or running. The jobs table's primary key makes the check-and-insert a
    /// single atomic statement: of N concurrent callers exactly one observes
    /// `Enqueued`.
    pub async fn enqueue_job(
        &self,
        key: &BenchmarkKey,
        subject_cik: &str,
    ) -> Result<EnqueueOutcome, StoreError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO benchmark_jobs (
                sic, statement, period, peer_count,
                subject_cik, status, queued_at, visible_at, attempts
            ) VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6, ?6, 0)
            ON CONFLICT(sic, statement, period, peer_count) DO NOTHING
            "#,
        )
        .bind(&key.sic)
        .bind(key.statement_type.as_str())
        .bind(key.period_type.as_str())
        .bind(key.peer_count as i64)
        .bind(subject_cik)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            Ok(EnqueueOutcome::Enqueued)
        } else {
            Ok(EnqueueOutcome::AlreadyPending)
        }
    }

    /// Claims the oldest visible pending job, transitioning it to running and
    /// bumping its attempt count in one atomic statement so that two workers
    /// can never claim the same job.
    pub async fn claim_next_job(&self) -> Result<Option<Job>, StoreError> {
        let now = Utc::now();
        let row = sqlx::query(
            r#"
            UPDATE benchmark_jobs
            SET status = 'running', started_at = ?1, attempts = attempts + 1
            WHERE rowid = (
                SELECT rowid FROM benchmark_jobs
                WHERE status = 'pending' AND visible_at <= ?1
                ORDER BY queued_at ASC
                LIMIT 1
            )
            RETURNING sic, statement, period, peer_count, subject_cik, queued_at, attempts
            "#,
        )
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| job_from_row(&row)).transpose()
    }

    /// Removes a finished job, clearing the dedup entry for its key so later
    /// cache misses can enqueue again.
    pub async fn complete_job(&self, key: &BenchmarkKey) -> Result<(), StoreError> {
        sqlx::query(
            "DELETE FROM benchmark_jobs WHERE sic = ?1 AND statement = ?2 AND period = ?3 AND peer_count = ?4",
        )
        .bind(&key.sic)
        .bind(key.statement_type.as_str())
        .bind(key.period_type.as_str())
        .bind(key.peer_count as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Records a failed attempt: the job is either requeued with a
    /// backoff-delayed visibility time, or dropped once `max_attempts` claims
    /// have been used up. Dropping also clears the dedup entry.
    pub async fn fail_job(
        &self,
        job: &Job,
        backoff: Duration,
        max_attempts: u32,
    ) -> Result<JobDisposition, StoreError> {
        if job.attempts >= max_attempts {
            self.complete_job(&job.key).await?;
            return Ok(JobDisposition::Dropped);
        }

        let visible_at = Utc::now() + backoff * job.attempts as i32;
        sqlx::query(
            r#"
            UPDATE benchmark_jobs
            SET status = 'pending', visible_at = ?1
            WHERE sic = ?2 AND statement = ?3 AND period = ?4 AND peer_count = ?5
            "#,
        )
        .bind(visible_at)
        .bind(&job.key.sic)
        .bind(job.key.statement_type.as_str())
        .bind(job.key.period_type.as_str())
        .bind(job.key.peer_count as i64)
        .execute(&self.pool)
        .await?;
        Ok(JobDisposition::Requeued)
    }

    /// Fetches the queued or running job for `key`, if any. Used to report
    /// progress to callers and to inspect the queue without mutating it.
    pub async fn get_job(&self, key: &BenchmarkKey) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT sic, statement, period, peer_count, subject_cik, queued_at, attempts
            FROM benchmark_jobs
            WHERE sic = ?1 AND statement = ?2 AND period = ?3 AND peer_count = ?4
            "#,
        )
        .bind(&key.sic)
        .bind(key.statement_type.as_str())
        .bind(key.period_type.as_str())
        .bind(key.peer_count as i64)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| job_from_row(&row)).transpose()
    }
}

fn benchmark_from_row(key: BenchmarkKey, row: &SqliteRow) -> Result<Benchmark, StoreError> {
    let base_concept: String = row.try_get("base_concept")?;
    let ratios_json: String = row.try_get("ratios")?;
    let peers_json: String = row.try_get("peers_used")?;
    let failed_count: i64 = row.try_get("failed_count")?;
    let computed_at: DateTime<Utc> = row.try_get("computed_at")?;

    let ratios: BTreeMap<String, f64> = serde_json::from_str(&ratios_json)?;
    let peers_used: Vec<String> = serde_json::from_str(&peers_json)?;

    Ok(Benchmark {
        key,
        ratios: CommonSizeStatement {
            base_concept,
            ratios,
        },
        peers_used,
        failed_count: failed_count as u32,
        computed_at,
    })
}

fn job_from_row(row: &SqliteRow) -> Result<Job, StoreError> {
    let sic: String = row.try_get("sic")?;
    let statement: String = row.try_get("statement")?;
    let period: String = row.try_get("period")?;
    let peer_count: i64 = row.try_get("peer_count")?;

    Ok(Job {
        key: BenchmarkKey {
            sic,
            statement_type: statement.parse::<StatementType>()?,
            period_type: period.parse::<PeriodType>()?,
            peer_count: peer_count as u32,
        },
        subject_cik: row.try_get("subject_cik")?,
        queued_at: row.try_get("queued_at")?,
        attempts: row.try_get::<i64, _>("attempts")? as u32,
    })
}
