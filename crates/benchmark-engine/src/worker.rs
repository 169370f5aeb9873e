use crate::computer::BenchmarkComputer;
use benchmark_store::{BenchmarkStore, JobDisposition};
use configuration::WorkerSettings;
use core_types::Job;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A background worker: claims queued benchmark jobs, computes them, and
/// writes results into the cache.
///
/// The loop polls the queue on a fixed interval and watches a shutdown
/// signal; it reacts to the signal within one interval even while idle. A
/// job that is already being computed runs to completion, shutdown or not.
pub struct Worker {
    id: usize,
    store: BenchmarkStore,
    computer: Arc<BenchmarkComputer>,
    poll_interval: Duration,
    backoff: chrono::Duration,
    max_attempts: u32,
}

impl Worker {
    pub fn new(
        id: usize,
        store: BenchmarkStore,
        computer: Arc<BenchmarkComputer>,
        settings: &WorkerSettings,
    ) -> Self {
        Self {
            id,
            store,
            computer,
            poll_interval: Duration::from_secs(settings.poll_interval_secs),
            backoff: chrono::Duration::seconds(settings.backoff_secs as i64),
            max_attempts: settings.max_attempts,
        }
    }

    /// Runs until `stop` flips to true. Drains all claimable jobs on each
    /// tick, then sleeps for the poll interval or until shutdown.
    pub async fn run(self, mut stop: watch::Receiver<bool>) {
        tracing::info!(worker = self.id, "Worker started");
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = stop.changed() => {
                    // A dropped sender counts as shutdown; otherwise this
                    // branch is instantly ready on every iteration.
                    if changed.is_err() {
                        break;
                    }
                }
                _ = interval.tick() => {}
            }
            if *stop.borrow() {
                break;
            }

            loop {
                let job = match self.store.claim_next_job().await {
                    Ok(Some(job)) => job,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(worker = self.id, error = %e, "Failed to poll the job queue");
                        break;
                    }
                };
                self.process(job).await;
                if *stop.borrow() {
                    break;
                }
            }
            if *stop.borrow() {
                break;
            }
        }
        tracing::info!(worker = self.id, "Worker stopped");
    }

    async fn process(&self, job: Job) {
        tracing::info!(
            worker = self.id,
            sic = %job.key.sic,
            statement = %job.key.statement_type,
            attempt = job.attempts,
            "Computing benchmark"
        );

        match self.computer.compute(&job.key, &job.subject_cik).await {
            Ok(benchmark) => {
                let peers = benchmark.peers_used_count();
                let failed = benchmark.failed_count;
                let result = async {
                    self.store.put_benchmark(&benchmark).await?;
                    self.store.complete_job(&job.key).await
                }
                .await;
                match result {
                    Ok(()) => tracing::info!(
                        worker = self.id,
                        sic = %job.key.sic,
                        peers,
                        failed,
                        "Benchmark cached"
                    ),
                    Err(e) => {
                        tracing::error!(worker = self.id, error = %e, "Failed to store benchmark");
                        // The row is still 'running'; retire it so the dedup
                        // entry cannot dangle with no claimable job behind it.
                        self.retire(&job).await;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(worker = self.id, sic = %job.key.sic, error = %e, "Benchmark computation failed");
                self.retire(&job).await;
            }
        }
    }

    /// Moves a job that did not complete out of `running`: back to pending
    /// with backoff, or gone once its attempts are spent.
    async fn retire(&self, job: &Job) {
        match self.store.fail_job(job, self.backoff, self.max_attempts).await {
            Ok(JobDisposition::Requeued) => {
                tracing::info!(worker = self.id, sic = %job.key.sic, "Job requeued with backoff")
            }
            Ok(JobDisposition::Dropped) => {
                tracing::warn!(worker = self.id, sic = %job.key.sic, "Job dropped after final attempt")
            }
            Err(e) => {
                tracing::error!(worker = self.id, error = %e, "Failed to record job failure")
            }
        }
    }
}

/// Spawns `count` worker loops sharing the store and computer, all observing
/// the same stop signal.
pub fn spawn_workers(
    count: usize,
    store: BenchmarkStore,
    computer: Arc<BenchmarkComputer>,
    settings: &WorkerSettings,
    stop: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    (0..count.max(1))
        .map(|id| {
            let worker = Worker::new(id, store.clone(), computer.clone(), settings);
            tokio::spawn(worker.run(stop.clone()))
        })
        .collect()
}
