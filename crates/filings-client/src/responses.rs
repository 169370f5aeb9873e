use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The `companyfacts` payload: every fact a company has ever reported,
/// grouped by taxonomy tag and then by unit of measure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyFacts {
    #[serde(default)]
    pub facts: FactsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FactsSection {
    #[serde(rename = "us-gaap", default)]
    pub us_gaap: HashMap<String, TagFacts>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagFacts {
    /// Unit of measure (e.g. "USD") to the facts reported in that unit.
    #[serde(default)]
    pub units: HashMap<String, Vec<FactItem>>,
}

/// A single reported fact. Fields mirror the SEC payload; anything the SEC
/// omits deserializes to `None` rather than failing the whole company.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FactItem {
    pub val: Option<f64>,
    /// Form the fact was filed on, e.g. "10-K".
    pub form: Option<String>,
    /// Fiscal period, e.g. "FY", "Q2".
    pub fp: Option<String>,
    /// Period end date, e.g. "2023-12-31".
    pub end: Option<String>,
}

/// One entry of the SEC's `company_tickers.json` index.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyTickerEntry {
    pub cik_str: u64,
    pub ticker: String,
    pub title: String,
}

/// The slice of a company's `submissions` record we care about.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionsResponse {
    #[serde(default)]
    pub sic: Option<String>,
    #[serde(default)]
    pub sic_description: Option<String>,
}

/// A company as listed in the ticker index, with its CIK zero-padded to the
/// ten digits the data APIs expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub cik: String,
    pub ticker: String,
    pub title: String,
}

/// A company's industry classification as recorded in its submissions.
/// Not every registrant carries a SIC code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryInfo {
    pub sic: Option<String>,
    pub description: Option<String>,
}
