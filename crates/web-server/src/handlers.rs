use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use common_size::{base_concept, build_lines, normalize, StatementLine};
use core_types::{BenchmarkKey, BenchmarkOutcome, PeriodType, StatementType};
use filings_client::{build_statement, resolve_company};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct StatementQuery {
    #[serde(default = "default_statement")]
    statement: StatementType,
    #[serde(default = "default_period")]
    period: PeriodType,
    /// Peer count for the industry benchmark; 0 disables benchmarking.
    /// Absent means the server's configured default.
    peers: Option<u32>,
}

fn default_statement() -> StatementType {
    StatementType::Income
}
fn default_period() -> PeriodType {
    PeriodType::Annual
}

#[derive(Debug, Serialize)]
pub struct StatementResponse {
    pub ticker: String,
    pub cik: String,
    pub statement: StatementType,
    pub period: PeriodType,
    pub fiscal_period: String,
    pub lines: Vec<StatementLine>,
    pub industry: IndustrySection,
}

/// The benchmark side of the response. The web path never blocks on a cold
/// cache: a miss queues a background job and reports `pending`, and a
/// benchmark failure degrades this section without failing the company
/// statement.
#[derive(Debug, Serialize)]
pub struct IndustrySection {
    pub sic: Option<String>,
    pub description: Option<String>,
    pub status: IndustryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peers_used: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndustryStatus {
    /// Benchmarking was not requested or the company carries no SIC code.
    Disabled,
    Ready,
    Pending,
    Unavailable,
}

/// # GET /api/statement/:ticker
pub async fn get_statement(
    Path(ticker): Path<String>,
    Query(query): Query<StatementQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatementResponse>, AppError> {
    let company = resolve_company(state.api.as_ref(), &ticker, false).await?;
    let facts = state.api.fetch_company_facts(&company.cik).await?;
    let statement = build_statement(&company.cik, &facts, query.statement, query.period);
    let common = normalize(&statement, base_concept(query.statement))?;

    let mut industry = IndustrySection {
        sic: None,
        description: None,
        status: IndustryStatus::Disabled,
        peers_used: None,
        failed_count: None,
        computed_at: None,
    };
    let mut benchmark_ratios = None;

    let peers = query.peers.unwrap_or(state.default_peer_count);
    if peers > 0 {
        let info = state.api.company_industry(&company.cik).await?;
        industry.sic = info.sic.clone();
        industry.description = info.description;

        if let Some(sic) = info.sic {
            let key = BenchmarkKey::new(sic, query.statement, query.period, peers);
            match state
                .service
                .get_or_queue_benchmark(&key, &company.cik, true)
                .await
            {
                Ok(BenchmarkOutcome::Ready(benchmark)) => {
                    industry.status = IndustryStatus::Ready;
                    industry.peers_used = Some(benchmark.peers_used.clone());
                    industry.failed_count = Some(benchmark.failed_count);
                    industry.computed_at = Some(benchmark.computed_at);
                    benchmark_ratios = Some(benchmark.ratios);
                }
                Ok(BenchmarkOutcome::Pending) => industry.status = IndustryStatus::Pending,
                Err(e) => {
                    // The benchmark and the company statement are independent
                    // failure domains; the statement is still returned.
                    tracing::warn!(error = %e, "Benchmark unavailable for request");
                    industry.status = IndustryStatus::Unavailable;
                }
            }
        }
    }

    let lines = build_lines(&statement, &common, benchmark_ratios.as_ref());
    Ok(Json(StatementResponse {
        ticker: company.ticker,
        cik: company.cik,
        statement: query.statement,
        period: query.period,
        fiscal_period: statement.fiscal_period.clone(),
        lines,
        industry,
    }))
}
