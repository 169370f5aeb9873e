//! Durable storage for the benchmark subsystem: the cache of computed
//! industry averages and the deduplicated job queue, both backed by a single
//! SQLite database so that neither survives-restart concern leaks into the
//! engine. All check-and-set operations are single SQL statements, atomic
//! under concurrent callers.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::StoreError;
pub use store::{BenchmarkStore, JobDisposition};
