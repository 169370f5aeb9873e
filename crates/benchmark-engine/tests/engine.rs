//! End-to-end tests for the benchmark engine against a mock filings API:
//! peer selection, partial failure handling, the inline and queued request
//! paths, and worker retry/shutdown behavior.

use async_trait::async_trait;
use benchmark_engine::{BenchmarkComputer, BenchmarkError, BenchmarkService, PeerSelector, Worker};
use benchmark_store::{connect, run_migrations, BenchmarkStore};
use configuration::WorkerSettings;
use core_types::{BenchmarkKey, BenchmarkOutcome, EnqueueOutcome, PeriodType, StatementType};
use filings_client::error::ApiError;
use filings_client::responses::{
    CompanyFacts, CompanyRecord, FactItem, FactsSection, IndustryInfo, TagFacts,
};
use filings_client::FilingsApi;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;

const SIC_SOFTWARE: &str = "7372";
const SUBJECT: &str = "0000000001";

#[derive(Default)]
struct MockApi {
    index: Vec<CompanyRecord>,
    industries: HashMap<String, IndustryInfo>,
    facts: HashMap<String, CompanyFacts>,
    failing: HashSet<String>,
    fact_fetches: AtomicUsize,
}

impl MockApi {
    fn builder() -> MockApiBuilder {
        MockApiBuilder::default()
    }
}

#[derive(Default)]
struct MockApiBuilder {
    api: MockApi,
}

impl MockApiBuilder {
    /// Registers a company with the given revenue/operating-income facts.
    /// `operating_income: None` models a peer that never reports that line.
    fn company(mut self, cik: &str, sic: &str, revenue: f64, operating_income: Option<f64>) -> Self {
        self.api.index.push(CompanyRecord {
            cik: cik.to_string(),
            ticker: format!("T{cik}"),
            title: format!("Company {cik}"),
        });
        self.api.industries.insert(
            cik.to_string(),
            IndustryInfo {
                sic: Some(sic.to_string()),
                description: None,
            },
        );
        self.api
            .facts
            .insert(cik.to_string(), income_facts(revenue, operating_income));
        self
    }

    fn failing(mut self, cik: &str) -> Self {
        self.api.failing.insert(cik.to_string());
        self
    }

    fn build(mut self) -> Arc<MockApi> {
        self.api.index.sort_by(|a, b| a.cik.cmp(&b.cik));
        Arc::new(self.api)
    }
}

fn income_facts(revenue: f64, operating_income: Option<f64>) -> CompanyFacts {
    let mut us_gaap = HashMap::new();
    us_gaap.insert("Revenues".to_string(), usd_tag(revenue));
    if let Some(value) = operating_income {
        us_gaap.insert("OperatingIncomeLoss".to_string(), usd_tag(value));
    }
    CompanyFacts {
        facts: FactsSection { us_gaap },
    }
}

fn usd_tag(value: f64) -> TagFacts {
    let mut units = HashMap::new();
    units.insert(
        "USD".to_string(),
        vec![FactItem {
            val: Some(value),
            form: Some("10-K".to_string()),
            fp: Some("FY".to_string()),
            end: Some("2023-12-31".to_string()),
        }],
    );
    TagFacts { units }
}

#[async_trait]
impl FilingsApi for MockApi {
    async fn fetch_company_facts(&self, cik: &str) -> Result<CompanyFacts, ApiError> {
        self.fact_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(cik) {
            return Err(ApiError::Status(503, format!("mock outage for {cik}")));
        }
        self.facts
            .get(cik)
            .cloned()
            .ok_or_else(|| ApiError::Status(404, cik.to_string()))
    }

    async fn fetch_company_index(&self, _force_refresh: bool) -> Result<Vec<CompanyRecord>, ApiError> {
        Ok(self.index.clone())
    }

    async fn company_industry(&self, cik: &str) -> Result<IndustryInfo, ApiError> {
        Ok(self.industries.get(cik).cloned().unwrap_or_default())
    }
}

async fn test_store() -> (TempDir, BenchmarkStore) {
    let dir = tempfile::tempdir().unwrap();
    let pool = connect(&dir.path().join("engine.sqlite3")).await.unwrap();
    run_migrations(&pool).await.unwrap();
    (dir, BenchmarkStore::new(pool))
}

fn income_key(peer_count: u32) -> BenchmarkKey {
    BenchmarkKey::new(SIC_SOFTWARE, StatementType::Income, PeriodType::Annual, peer_count)
}

fn worker_settings() -> WorkerSettings {
    WorkerSettings {
        count: 1,
        poll_interval_secs: 1,
        max_attempts: 1,
        backoff_secs: 0,
    }
}

async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("condition not reached within timeout");
}

#[tokio::test]
async fn peer_selection_is_deterministic_and_excludes_subject() {
    let api = MockApi::builder()
        .company(SUBJECT, SIC_SOFTWARE, 500.0, None)
        .company("0000000005", SIC_SOFTWARE, 100.0, None)
        .company("0000000003", SIC_SOFTWARE, 100.0, None)
        .company("0000000004", "2834", 100.0, None)
        .company("0000000002", SIC_SOFTWARE, 100.0, None)
        .build();

    let selector = PeerSelector::new(api.clone());
    let peers = selector.select_peers(SUBJECT, SIC_SOFTWARE, 2).await.unwrap();
    let ciks: Vec<&str> = peers.iter().map(|p| p.cik.as_str()).collect();
    // Ascending CIK order, subject and other industries skipped, truncated
    // to the requested count.
    assert_eq!(ciks, vec!["0000000002", "0000000003"]);

    let again = selector.select_peers(SUBJECT, SIC_SOFTWARE, 2).await.unwrap();
    assert_eq!(peers, again);
}

#[tokio::test]
async fn empty_peer_pool_is_reported() {
    let api = MockApi::builder()
        .company(SUBJECT, SIC_SOFTWARE, 500.0, None)
        .build();
    let selector = PeerSelector::new(api);
    assert!(matches!(
        selector.select_peers(SUBJECT, SIC_SOFTWARE, 5).await,
        Err(BenchmarkError::NoPeersFound(_))
    ));
}

#[tokio::test]
async fn compute_tolerates_partial_peer_failure() {
    // Peer 2 reports a margin, peer 3 does not, peer 4 is unreachable.
    let api = MockApi::builder()
        .company(SUBJECT, SIC_SOFTWARE, 500.0, None)
        .company("0000000002", SIC_SOFTWARE, 100.0, Some(10.0))
        .company("0000000003", SIC_SOFTWARE, 200.0, None)
        .company("0000000004", SIC_SOFTWARE, 300.0, Some(30.0))
        .failing("0000000004")
        .build();

    let computer = BenchmarkComputer::new(api, 4);
    let benchmark = computer.compute(&income_key(5), SUBJECT).await.unwrap();

    assert_eq!(benchmark.peers_used, vec!["0000000002", "0000000003"]);
    assert_eq!(benchmark.failed_count, 1);
    // Revenue averaged across both usable peers, the margin only from the
    // peer that reported it.
    assert_eq!(benchmark.ratios.ratio("Revenues"), Some(1.0));
    assert_eq!(benchmark.ratios.ratio("OperatingIncomeLoss"), Some(0.1));
}

#[tokio::test]
async fn compute_fails_when_every_peer_fails() {
    let api = MockApi::builder()
        .company(SUBJECT, SIC_SOFTWARE, 500.0, None)
        .company("0000000002", SIC_SOFTWARE, 100.0, None)
        .failing("0000000002")
        .build();

    let computer = BenchmarkComputer::new(api, 2);
    assert!(matches!(
        computer.compute(&income_key(5), SUBJECT).await,
        Err(BenchmarkError::Unavailable)
    ));
}

#[tokio::test]
async fn inline_path_computes_and_caches() {
    let api = MockApi::builder()
        .company(SUBJECT, SIC_SOFTWARE, 500.0, None)
        .company("0000000002", SIC_SOFTWARE, 100.0, Some(10.0))
        .build();
    let (_dir, store) = test_store().await;
    let service = BenchmarkService::new(store.clone(), BenchmarkComputer::new(api, 2));

    let key = income_key(5);
    let outcome = service.get_or_queue_benchmark(&key, SUBJECT, false).await.unwrap();
    let BenchmarkOutcome::Ready(benchmark) = outcome else {
        panic!("inline path must return a benchmark");
    };
    assert_eq!(benchmark.peers_used_count(), 1);

    // Cached for the next caller.
    assert!(store.get_benchmark(&key).await.unwrap().is_some());
}

#[tokio::test]
async fn async_path_queues_once_without_duplicate_fetches() {
    let api = MockApi::builder()
        .company(SUBJECT, SIC_SOFTWARE, 500.0, None)
        .company("0000000002", SIC_SOFTWARE, 100.0, None)
        .build();
    let (_dir, store) = test_store().await;
    let service =
        BenchmarkService::new(store.clone(), BenchmarkComputer::new(api.clone(), 2));

    let key = income_key(5);
    let first = service.get_or_queue_benchmark(&key, SUBJECT, true).await.unwrap();
    assert_eq!(first, BenchmarkOutcome::Pending);

    // A second request before any worker runs observes the pending job and
    // triggers no peer fetch burst of its own.
    let second = service.get_or_queue_benchmark(&key, SUBJECT, true).await.unwrap();
    assert_eq!(second, BenchmarkOutcome::Pending);
    assert_eq!(
        store.enqueue_job(&key, SUBJECT).await.unwrap(),
        EnqueueOutcome::AlreadyPending
    );
    assert_eq!(api.fact_fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn worker_processes_queued_job_and_clears_dedup() {
    let api = MockApi::builder()
        .company(SUBJECT, SIC_SOFTWARE, 500.0, None)
        .company("0000000002", SIC_SOFTWARE, 100.0, Some(10.0))
        .build();
    let (_dir, store) = test_store().await;
    let computer = Arc::new(BenchmarkComputer::new(api, 2));

    let key = income_key(5);
    store.enqueue_job(&key, SUBJECT).await.unwrap();

    let (stop_tx, stop_rx) = watch::channel(false);
    let worker = Worker::new(0, store.clone(), computer, &worker_settings());
    let handle = tokio::spawn(worker.run(stop_rx));

    let probe = store.clone();
    let probe_key = key.clone();
    wait_until(move || {
        let store = probe.clone();
        let key = probe_key.clone();
        async move { store.get_benchmark(&key).await.unwrap().is_some() }
    })
    .await;

    // Success removed the dedup entry.
    assert!(store.get_job(&key).await.unwrap().is_none());

    stop_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(3), handle)
        .await
        .expect("worker must stop within one poll interval")
        .unwrap();
}

#[tokio::test]
async fn exhausted_job_leaves_no_dangling_dedup_entry() {
    let api = MockApi::builder()
        .company(SUBJECT, SIC_SOFTWARE, 500.0, None)
        .company("0000000002", SIC_SOFTWARE, 100.0, None)
        .failing("0000000002")
        .build();
    let (_dir, store) = test_store().await;
    let computer = Arc::new(BenchmarkComputer::new(api, 2));

    let key = income_key(5);
    store.enqueue_job(&key, SUBJECT).await.unwrap();

    let (stop_tx, stop_rx) = watch::channel(false);
    let worker = Worker::new(0, store.clone(), computer, &worker_settings());
    let handle = tokio::spawn(worker.run(stop_rx));

    let probe = store.clone();
    let probe_key = key.clone();
    wait_until(move || {
        let store = probe.clone();
        let key = probe_key.clone();
        async move { store.get_job(&key).await.unwrap().is_none() }
    })
    .await;

    // Nothing was cached and the key is open for a fresh enqueue.
    assert!(store.get_benchmark(&key).await.unwrap().is_none());
    assert_eq!(
        store.enqueue_job(&key, SUBJECT).await.unwrap(),
        EnqueueOutcome::Enqueued
    );

    stop_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(3), handle)
        .await
        .expect("worker must stop within one poll interval")
        .unwrap();
}

#[tokio::test]
async fn storage_failure_after_compute_does_not_strand_the_job() {
    let api = MockApi::builder()
        .company(SUBJECT, SIC_SOFTWARE, 500.0, None)
        .company("0000000002", SIC_SOFTWARE, 100.0, None)
        .build();
    let dir = tempfile::tempdir().unwrap();
    let pool = connect(&dir.path().join("engine.sqlite3")).await.unwrap();
    run_migrations(&pool).await.unwrap();
    // The cache table is gone but the queue is intact, so the compute
    // succeeds and only the benchmark write fails.
    sqlx::query("DROP TABLE benchmarks")
        .execute(&pool)
        .await
        .unwrap();
    let store = BenchmarkStore::new(pool);
    let computer = Arc::new(BenchmarkComputer::new(api, 2));

    let key = income_key(5);
    store.enqueue_job(&key, SUBJECT).await.unwrap();

    let (stop_tx, stop_rx) = watch::channel(false);
    let worker = Worker::new(0, store.clone(), computer, &worker_settings());
    let handle = tokio::spawn(worker.run(stop_rx));

    // The job must not stay stuck in 'running': with its single attempt
    // spent it is dropped and the key re-opens.
    let probe = store.clone();
    let probe_key = key.clone();
    wait_until(move || {
        let store = probe.clone();
        let key = probe_key.clone();
        async move { store.get_job(&key).await.unwrap().is_none() }
    })
    .await;
    assert_eq!(
        store.enqueue_job(&key, SUBJECT).await.unwrap(),
        EnqueueOutcome::Enqueued
    );

    stop_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(3), handle)
        .await
        .expect("worker must stop within one poll interval")
        .unwrap();
}

#[tokio::test]
async fn idle_worker_stops_within_one_poll_interval() {
    let api = MockApi::builder().build();
    let (_dir, store) = test_store().await;
    let computer = Arc::new(BenchmarkComputer::new(api, 1));

    let (stop_tx, stop_rx) = watch::channel(false);
    let worker = Worker::new(0, store, computer, &worker_settings());
    let handle = tokio::spawn(worker.run(stop_rx));

    tokio::time::sleep(Duration::from_millis(50)).await;
    stop_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("worker must stop within one poll interval")
        .unwrap();
}

#[tokio::test]
async fn worker_exits_when_stop_sender_is_dropped() {
    let api = MockApi::builder().build();
    let (_dir, store) = test_store().await;
    let computer = Arc::new(BenchmarkComputer::new(api, 1));

    let (stop_tx, stop_rx) = watch::channel(false);
    let worker = Worker::new(0, store, computer, &worker_settings());
    let handle = tokio::spawn(worker.run(stop_rx));

    // No explicit signal: losing the sender must read as shutdown, not as a
    // permanently-ready branch that starves the poll interval.
    drop(stop_tx);
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("worker must exit once the stop channel closes")
        .unwrap();
}

#[tokio::test]
async fn force_refresh_invalidates_before_recomputing() {
    let api = MockApi::builder()
        .company(SUBJECT, SIC_SOFTWARE, 500.0, None)
        .company("0000000002", SIC_SOFTWARE, 100.0, None)
        .build();
    let (_dir, store) = test_store().await;
    let service = BenchmarkService::new(store.clone(), BenchmarkComputer::new(api, 2));

    let key = income_key(5);
    service.get_or_queue_benchmark(&key, SUBJECT, false).await.unwrap();
    let first = store.get_benchmark(&key).await.unwrap().unwrap();

    // Async force-refresh: the old entry is gone immediately, the work queued.
    let outcome = service.force_refresh(&key, SUBJECT, true).await.unwrap();
    assert_eq!(outcome, BenchmarkOutcome::Pending);
    assert!(store.get_benchmark(&key).await.unwrap().is_none());
    assert!(store.get_job(&key).await.unwrap().is_some());

    // Inline force-refresh recomputes on the spot.
    store.complete_job(&key).await.unwrap();
    let outcome = service.force_refresh(&key, SUBJECT, false).await.unwrap();
    let BenchmarkOutcome::Ready(second) = outcome else {
        panic!("inline force refresh must return a benchmark");
    };
    assert!(second.computed_at >= first.computed_at);
}
