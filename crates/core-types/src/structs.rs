use crate::enums::{PeriodType, StatementType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single reported figure from a filing, keyed by its taxonomy concept
/// (e.g. `Assets`, `Revenues`). Values are USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub concept: String,
    pub value: f64,
}

/// One company's reported figures for one statement and one fiscal period.
///
/// Concepts are held in a `BTreeMap`, which gives us the invariant of at most
/// one value per concept for free and a deterministic iteration order.
/// Not every company reports every concept; absent concepts are simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub cik: String,
    pub statement_type: StatementType,
    pub period_type: PeriodType,
    /// The fiscal period end date of the reference fact, e.g. "2023-12-31".
    pub fiscal_period: String,
    pub items: BTreeMap<String, f64>,
}

impl Statement {
    pub fn new(
        cik: impl Into<String>,
        statement_type: StatementType,
        period_type: PeriodType,
        fiscal_period: impl Into<String>,
    ) -> Self {
        Self {
            cik: cik.into(),
            statement_type,
            period_type,
            fiscal_period: fiscal_period.into(),
            items: BTreeMap::new(),
        }
    }

    pub fn value(&self, concept: &str) -> Option<f64> {
        self.items.get(concept).copied()
    }

    pub fn set(&mut self, concept: impl Into<String>, value: f64) {
        self.items.insert(concept.into(), value);
    }

    pub fn line_items(&self) -> impl Iterator<Item = LineItem> + '_ {
        self.items.iter().map(|(concept, value)| LineItem {
            concept: concept.clone(),
            value: *value,
        })
    }
}

/// A statement with every reported value replaced by its ratio to a base
/// concept (total revenue for income statements, total assets for balance
/// sheets). The base concept itself always maps to exactly 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonSizeStatement {
    pub base_concept: String,
    pub ratios: BTreeMap<String, f64>,
}

impl CommonSizeStatement {
    pub fn ratio(&self, concept: &str) -> Option<f64> {
        self.ratios.get(concept).copied()
    }
}

/// The identity of one industry benchmark: which peer group, which statement,
/// which period granularity, and how many peers were requested. Used verbatim
/// as the cache lookup key and the job dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BenchmarkKey {
    /// SEC Standard Industrial Classification code, e.g. "7372".
    pub sic: String,
    pub statement_type: StatementType,
    pub period_type: PeriodType,
    pub peer_count: u32,
}

impl BenchmarkKey {
    pub fn new(
        sic: impl Into<String>,
        statement_type: StatementType,
        period_type: PeriodType,
        peer_count: u32,
    ) -> Self {
        Self {
            sic: sic.into(),
            statement_type,
            period_type,
            peer_count,
        }
    }
}

/// An averaged common-size statement across a company's industry peers,
/// plus enough metadata to inspect how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub key: BenchmarkKey,
    pub ratios: CommonSizeStatement,
    /// CIKs of the peers whose statements contributed to the average.
    pub peers_used: Vec<String>,
    /// Peers that failed to fetch or normalize. Tolerated, but recorded.
    pub failed_count: u32,
    pub computed_at: DateTime<Utc>,
}

impl Benchmark {
    pub fn peers_used_count(&self) -> u32 {
        self.peers_used.len() as u32
    }
}

/// A queued benchmark computation. Owned by the job queue until a worker
/// claims it; ownership then transfers to that worker for the attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub key: BenchmarkKey,
    /// The company whose request queued this benchmark. Excluded from its
    /// own peer pool when the benchmark is computed.
    pub subject_cik: String,
    pub queued_at: DateTime<Utc>,
    /// How many times a worker has claimed this job, including the current claim.
    pub attempts: u32,
}
