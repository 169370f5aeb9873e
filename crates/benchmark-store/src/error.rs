use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to create the cache directory: {0}")]
    CacheDir(#[from] std::io::Error),

    #[error("Database operation failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("An error occurred during JSON serialization/deserialization: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored row is corrupt: {0}")]
    Corrupt(#[from] core_types::CoreError),

    #[error("Refusing to cache a benchmark with zero usable peers")]
    EmptyBenchmark,
}
