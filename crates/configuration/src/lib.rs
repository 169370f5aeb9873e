use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{ServerSettings, Settings, WorkerSettings};

/// Loads the application configuration.
///
/// Defaults are applied first, then an optional `commonize.toml` in the
/// working directory, then `COMMONIZE_*` environment variables (e.g.
/// `COMMONIZE_USER_AGENT`, `COMMONIZE_WORKER__COUNT`), so every field can be
/// overridden without a config file being present at all.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("cache_dir", "./.commonize-cache")?
        .set_default("database_file", "industry_benchmarks.sqlite3")?
        .set_default("user_agent", "Commonize/0.1 (your_email@example.com)")?
        .set_default("fetch_concurrency", 3)?
        .set_default("worker.count", 1)?
        .set_default("worker.poll_interval_secs", 2)?
        .set_default("worker.max_attempts", 3)?
        .set_default("worker.backoff_secs", 5)?
        .set_default("server.addr", "127.0.0.1:8080")?
        .add_source(config::File::with_name("commonize").required(false))
        .add_source(config::Environment::with_prefix("COMMONIZE").separator("__"))
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    Ok(settings)
}
