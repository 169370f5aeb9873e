use crate::error::BenchmarkError;
use crate::peers::PeerSelector;
use chrono::Utc;
use common_size::{average_ratios, base_concept, normalize};
use core_types::{Benchmark, BenchmarkKey, CommonSizeStatement};
use filings_client::{build_statement, FilingsApi};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// The outcome of one peer's fetch-and-normalize attempt. Failures are data,
/// not control flow: they end up in the benchmark's `failed_count` rather
/// than aborting the computation.
enum PeerOutcome {
    Usable(String, CommonSizeStatement),
    Failed(String, String),
}

/// Computes one industry benchmark: the unit of work a queued job executes,
/// also invoked directly on the synchronous (inline) path.
pub struct BenchmarkComputer {
    api: Arc<dyn FilingsApi>,
    selector: PeerSelector,
    /// Upper bound on concurrent peer fetches; the upstream rate limit is a
    /// shared resource, so peer fan-out must not be unbounded.
    fetch_concurrency: usize,
}

impl BenchmarkComputer {
    pub fn new(api: Arc<dyn FilingsApi>, fetch_concurrency: usize) -> Self {
        let selector = PeerSelector::new(api.clone());
        Self {
            api,
            selector,
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    /// Runs the full benchmark pipeline for `key`: resolve peers, fetch and
    /// normalize each peer's filing, and average the survivors per concept.
    ///
    /// Partial peer failure is tolerated and recorded; only a completely
    /// unusable peer set fails the benchmark. Per-peer fetches are never
    /// retried here; retry happens at the job level for the whole benchmark.
    pub async fn compute(
        &self,
        key: &BenchmarkKey,
        subject_cik: &str,
    ) -> Result<Benchmark, BenchmarkError> {
        let peers = self
            .selector
            .select_peers(subject_cik, &key.sic, key.peer_count)
            .await?;
        tracing::debug!(sic = %key.sic, peers = peers.len(), "Selected benchmark peers");

        let outcomes: Vec<PeerOutcome> = stream::iter(peers)
            .map(|peer| self.peer_common_size(key, peer.cik))
            .buffer_unordered(self.fetch_concurrency)
            .collect()
            .await;

        let mut usable = Vec::new();
        let mut peers_used = Vec::new();
        let mut failed_count = 0u32;
        for outcome in outcomes {
            match outcome {
                PeerOutcome::Usable(cik, common) => {
                    peers_used.push(cik);
                    usable.push(common);
                }
                PeerOutcome::Failed(cik, reason) => {
                    tracing::warn!(cik = %cik, reason = %reason, "Peer excluded from benchmark");
                    failed_count += 1;
                }
            }
        }

        if usable.is_empty() {
            return Err(BenchmarkError::Unavailable);
        }

        // Keep the used-peer set in the same stable order peers were selected
        // in, independent of fetch completion order.
        peers_used.sort();

        let base = base_concept(key.statement_type);
        Ok(Benchmark {
            key: key.clone(),
            ratios: CommonSizeStatement {
                base_concept: base.to_string(),
                ratios: average_ratios(&usable),
            },
            peers_used,
            failed_count,
            computed_at: Utc::now(),
        })
    }

    async fn peer_common_size(&self, key: &BenchmarkKey, cik: String) -> PeerOutcome {
        let facts = match self.api.fetch_company_facts(&cik).await {
            Ok(facts) => facts,
            Err(e) => return PeerOutcome::Failed(cik, e.to_string()),
        };
        let statement = build_statement(&cik, &facts, key.statement_type, key.period_type);
        match normalize(&statement, base_concept(key.statement_type)) {
            Ok(common) => PeerOutcome::Usable(cik, common),
            Err(e) => PeerOutcome::Failed(cik, e.to_string()),
        }
    }
}
