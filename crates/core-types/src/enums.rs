use crate::error::CoreError;
use crate::structs::Benchmark;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementType {
    Income,
    Balance,
}

impl StatementType {
    /// The stable string form used in cache keys and CLI arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementType::Income => "income",
            StatementType::Balance => "balance",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(StatementType::Income),
            "balance" => Ok(StatementType::Balance),
            other => Err(CoreError::InvalidStatementType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Annual,
    Quarterly,
}

impl PeriodType {
    /// The stable string form used in cache keys and CLI arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Annual => "annual",
            PeriodType::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "annual" => Ok(PeriodType::Annual),
            "quarterly" => Ok(PeriodType::Quarterly),
            other => Err(CoreError::InvalidPeriodType(other.to_string())),
        }
    }
}

/// The outcome of asking the queue to schedule a benchmark computation.
/// `AlreadyPending` is a normal outcome, not an error: it means another
/// request already queued the same key and the work must not be duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Enqueued,
    AlreadyPending,
}

/// What a caller gets back when requesting a benchmark for a key.
#[derive(Debug, Clone, PartialEq)]
pub enum BenchmarkOutcome {
    /// A benchmark was found in the cache or computed inline.
    Ready(Benchmark),
    /// The cache missed and a background job now owns the computation.
    Pending,
}
