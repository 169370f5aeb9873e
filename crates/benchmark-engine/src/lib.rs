//! The industry benchmark engine: selects peer companies, computes averaged
//! common-size statements across them, and runs the background workers that
//! populate the durable benchmark cache.

pub mod computer;
pub mod error;
pub mod peers;
pub mod service;
pub mod worker;

// Re-export the key components to create a clean, public-facing API.
pub use computer::BenchmarkComputer;
pub use error::BenchmarkError;
pub use peers::PeerSelector;
pub use service::BenchmarkService;
pub use worker::{spawn_workers, Worker};
