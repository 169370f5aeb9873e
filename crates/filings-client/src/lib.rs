use crate::error::ApiError;
use crate::responses::{
    CompanyFacts, CompanyRecord, CompanyTickerEntry, IndustryInfo, SubmissionsResponse,
};
use async_trait::async_trait;
use configuration::Settings;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

pub mod error;
pub mod facts;
pub mod responses;

// --- Public API ---
pub use facts::{build_statement, fact_value, select_fact};

const TICKER_INDEX_URL: &str = "https://www.sec.gov/files/company_tickers.json";
const DATA_BASE_URL: &str = "https://data.sec.gov";

const TICKER_CACHE_FILE: &str = "ticker_cik_map.json";
const SIC_CACHE_FILE: &str = "cik_sic_map.json";

/// Zero-pads a CIK to the ten digits the SEC data endpoints expect.
pub fn pad_cik(raw: &str) -> String {
    format!("{:0>10}", raw.trim())
}

/// The generic, abstract interface to the filings data source.
/// This trait is the contract the benchmark engine uses, allowing the
/// underlying implementation (live or mock) to be swapped out.
#[async_trait]
pub trait FilingsApi: Send + Sync {
    /// Fetches every reported fact for a company.
    async fn fetch_company_facts(&self, cik: &str) -> Result<CompanyFacts, ApiError>;

    /// Fetches the full ticker index, ordered by ascending CIK.
    async fn fetch_company_index(&self, force_refresh: bool) -> Result<Vec<CompanyRecord>, ApiError>;

    /// Fetches a company's industry classification.
    async fn company_industry(&self, cik: &str) -> Result<IndustryInfo, ApiError>;
}

/// Resolves a ticker symbol or raw CIK to a company record via the index.
pub async fn resolve_company(
    api: &dyn FilingsApi,
    query: &str,
    force_refresh: bool,
) -> Result<CompanyRecord, ApiError> {
    let candidate = query.trim().to_uppercase();
    if candidate.chars().all(|c| c.is_ascii_digit()) && candidate.len() <= 10 {
        return Ok(CompanyRecord {
            cik: pad_cik(&candidate),
            ticker: candidate,
            title: String::new(),
        });
    }

    let index = api.fetch_company_index(force_refresh).await?;
    index
        .into_iter()
        .find(|record| record.ticker == candidate)
        .ok_or(ApiError::UnknownTicker(candidate))
}

/// A concrete implementation of `FilingsApi` for the SEC EDGAR data APIs.
///
/// Fetches are bounded by a semaphore so that a benchmark computation
/// fanning out across peers stays within the SEC's fair-use rate limits.
/// The ticker index and per-company SIC codes change rarely, so both are
/// cached as JSON files in the configured cache directory.
pub struct EdgarClient {
    client: reqwest::Client,
    limiter: Semaphore,
    ticker_cache_path: PathBuf,
    sic_cache_path: PathBuf,
    sic_cache: Mutex<Option<HashMap<String, IndustryInfo>>>,
}

impl EdgarClient {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        fs::create_dir_all(&settings.cache_dir)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent)
                .map_err(|e| ApiError::InvalidConfig(e.to_string()))?,
        );
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));

        Ok(Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .build()?,
            limiter: Semaphore::new(settings.fetch_concurrency.max(1)),
            ticker_cache_path: settings.cache_file(TICKER_CACHE_FILE),
            sic_cache_path: settings.cache_file(SIC_CACHE_FILE),
            sic_cache: Mutex::new(None),
        })
    }

    async fn request_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        // Closing the semaphore is not part of this type's lifecycle, so
        // acquisition can only fail if the client itself is gone.
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|e| ApiError::InvalidConfig(e.to_string()))?;

        tracing::debug!(url, "Requesting SEC endpoint");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16(), url.to_string()));
        }
        let text = response.text().await?;
        serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    fn load_sic_cache_file(&self) -> HashMap<String, IndustryInfo> {
        match fs::read_to_string(&self.sic_cache_path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    fn persist_sic_cache(&self, cache: &HashMap<String, IndustryInfo>) -> Result<(), ApiError> {
        let raw = serde_json::to_string(cache).map_err(|e| ApiError::Deserialization(e.to_string()))?;
        fs::write(&self.sic_cache_path, raw)?;
        Ok(())
    }
}

#[async_trait]
impl FilingsApi for EdgarClient {
    async fn fetch_company_facts(&self, cik: &str) -> Result<CompanyFacts, ApiError> {
        let url = format!("{DATA_BASE_URL}/api/xbrl/companyfacts/CIK{}.json", pad_cik(cik));
        self.request_json(&url).await
    }

    async fn fetch_company_index(&self, force_refresh: bool) -> Result<Vec<CompanyRecord>, ApiError> {
        if !force_refresh {
            if let Ok(raw) = fs::read_to_string(&self.ticker_cache_path) {
                if let Ok(cached) = serde_json::from_str::<Vec<CompanyRecord>>(&raw) {
                    if !cached.is_empty() {
                        return Ok(cached);
                    }
                }
            }
        }

        let entries: HashMap<String, CompanyTickerEntry> =
            self.request_json(TICKER_INDEX_URL).await?;
        let mut records: Vec<CompanyRecord> = entries
            .into_values()
            .map(|entry| CompanyRecord {
                cik: pad_cik(&entry.cik_str.to_string()),
                ticker: entry.ticker.to_uppercase(),
                title: entry.title,
            })
            .collect();
        // CIK order is the stable total order peer selection relies on.
        records.sort_by(|a, b| a.cik.cmp(&b.cik));

        let raw = serde_json::to_string(&records)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        fs::write(&self.ticker_cache_path, raw)?;
        Ok(records)
    }

    async fn company_industry(&self, cik: &str) -> Result<IndustryInfo, ApiError> {
        let cik = pad_cik(cik);
        let mut guard = self.sic_cache.lock().await;
        let cache = guard.get_or_insert_with(|| self.load_sic_cache_file());
        if let Some(info) = cache.get(&cik) {
            return Ok(info.clone());
        }

        let url = format!("{DATA_BASE_URL}/submissions/CIK{cik}.json");
        let submissions: SubmissionsResponse = self.request_json(&url).await?;
        let info = IndustryInfo {
            sic: submissions.sic.filter(|s| !s.is_empty()),
            description: submissions.sic_description,
        };
        cache.insert(cik, info.clone());
        self.persist_sic_cache(cache)?;
        Ok(info)
    }
}
