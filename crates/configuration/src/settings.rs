use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Directory holding the benchmark database and the SEC metadata caches.
    pub cache_dir: PathBuf,
    /// File name of the SQLite database inside `cache_dir`.
    pub database_file: String,
    /// User-Agent sent on every SEC request; the SEC requires a contact address.
    pub user_agent: String,
    /// Maximum number of peer filings fetched concurrently. This is the
    /// throttle that keeps a benchmark computation within the SEC's fair-use
    /// rate limits.
    pub fetch_concurrency: usize,
    pub worker: WorkerSettings,
    pub server: ServerSettings,
}

/// Contains parameters for the background benchmark workers.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    /// How many worker loops to run in the `worker` subcommand.
    pub count: usize,
    /// How long an idle worker sleeps between queue polls. Shutdown is
    /// observed within one such interval.
    pub poll_interval_secs: u64,
    /// Total claims a job gets before it is dropped from the queue.
    pub max_attempts: u32,
    /// Base delay before a failed job becomes claimable again; scaled by the
    /// attempt count.
    pub backoff_secs: u64,
}

/// Contains parameters for the web server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Socket address the API listens on, e.g. "127.0.0.1:8080".
    pub addr: String,
}

impl Settings {
    /// Full path of the SQLite database backing the benchmark cache and queue.
    pub fn database_path(&self) -> PathBuf {
        self.cache_dir.join(&self.database_file)
    }

    /// Full path of an auxiliary JSON cache file (ticker map, SIC map).
    pub fn cache_file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.cache_dir.join(name)
    }
}
