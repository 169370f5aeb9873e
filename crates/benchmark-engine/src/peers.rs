use crate::error::BenchmarkError;
use filings_client::responses::CompanyRecord;
use filings_client::FilingsApi;
use std::sync::Arc;

/// Selects the peer companies for a benchmark: registrants sharing the
/// subject's SIC code, excluding the subject itself.
///
/// Candidates are walked in ascending CIK order (the order the company index
/// is returned in), which makes the selection a stable total order: repeated
/// calls with the same inputs pick the same peers, so cached benchmarks are
/// reproducible.
pub struct PeerSelector {
    api: Arc<dyn FilingsApi>,
}

impl PeerSelector {
    pub fn new(api: Arc<dyn FilingsApi>) -> Self {
        Self { api }
    }

    pub async fn select_peers(
        &self,
        subject_cik: &str,
        sic: &str,
        max_count: u32,
    ) -> Result<Vec<CompanyRecord>, BenchmarkError> {
        let index = self.api.fetch_company_index(false).await?;

        let mut peers = Vec::new();
        for candidate in index {
            if peers.len() as u32 >= max_count {
                break;
            }
            if candidate.cik == subject_cik {
                continue;
            }
            // Industry lookups are cached by the client, so this walk only
            // pays for companies it has never seen before.
            let industry = match self.api.company_industry(&candidate.cik).await {
                Ok(industry) => industry,
                Err(e) => {
                    tracing::debug!(cik = %candidate.cik, error = %e, "Skipping candidate with unreadable submissions");
                    continue;
                }
            };
            if industry.sic.as_deref() == Some(sic) {
                peers.push(candidate);
            }
        }

        if peers.is_empty() {
            return Err(BenchmarkError::NoPeersFound(sic.to_string()));
        }
        Ok(peers)
    }
}
