use crate::computer::BenchmarkComputer;
use crate::error::BenchmarkError;
use benchmark_store::BenchmarkStore;
use core_types::{BenchmarkKey, BenchmarkOutcome, EnqueueOutcome};

/// The front door of the benchmark subsystem, called by the CLI and the web
/// layer. Wraps the cache-hit / inline-compute / enqueue decision so callers
/// only choose a policy (`allow_async`) and never touch the queue directly.
pub struct BenchmarkService {
    store: BenchmarkStore,
    computer: BenchmarkComputer,
}

impl BenchmarkService {
    pub fn new(store: BenchmarkStore, computer: BenchmarkComputer) -> Self {
        Self { store, computer }
    }

    pub fn store(&self) -> &BenchmarkStore {
        &self.store
    }

    /// Returns a cached benchmark on a hit. On a miss, either computes inline
    /// and returns the result (`allow_async = false`, the caller blocks), or
    /// enqueues a job and returns `Pending` (`allow_async = true`, the caller
    /// returns immediately and a worker fills the cache for later requests).
    pub async fn get_or_queue_benchmark(
        &self,
        key: &BenchmarkKey,
        subject_cik: &str,
        allow_async: bool,
    ) -> Result<BenchmarkOutcome, BenchmarkError> {
        if let Some(benchmark) = self.store.get_benchmark(key).await? {
            tracing::debug!(sic = %key.sic, "Benchmark cache hit");
            return Ok(BenchmarkOutcome::Ready(benchmark));
        }

        if allow_async {
            match self.store.enqueue_job(key, subject_cik).await? {
                EnqueueOutcome::Enqueued => {
                    tracing::info!(sic = %key.sic, "Benchmark queued for background computation")
                }
                EnqueueOutcome::AlreadyPending => {
                    tracing::debug!(sic = %key.sic, "Benchmark already pending")
                }
            }
            return Ok(BenchmarkOutcome::Pending);
        }

        let benchmark = self.computer.compute(key, subject_cik).await?;
        self.store.put_benchmark(&benchmark).await?;
        Ok(BenchmarkOutcome::Ready(benchmark))
    }

    /// Invalidates the cache entry for `key` and triggers recomputation,
    /// inline or queued per the caller's policy. The next `get` for this key
    /// misses regardless of how recently the entry was computed.
    pub async fn force_refresh(
        &self,
        key: &BenchmarkKey,
        subject_cik: &str,
        allow_async: bool,
    ) -> Result<BenchmarkOutcome, BenchmarkError> {
        self.store.invalidate(key).await?;
        self.get_or_queue_benchmark(key, subject_cik, allow_async)
            .await
    }
}
