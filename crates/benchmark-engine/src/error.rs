use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("No peer companies found for SIC code '{0}'")]
    NoPeersFound(String),

    #[error("Benchmark unavailable: none of the selected peers produced a usable statement")]
    Unavailable,

    #[error("Filings API error: {0}")]
    Api(#[from] filings_client::error::ApiError),

    #[error("Store error: {0}")]
    Store(#[from] benchmark_store::StoreError),
}
