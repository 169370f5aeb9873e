use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to perform the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("SEC request failed with status {0}: {1}")]
    Status(u16, String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Failed to read or write a metadata cache file: {0}")]
    Cache(#[from] std::io::Error),

    #[error("Unknown ticker symbol '{0}'")]
    UnknownTicker(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}
