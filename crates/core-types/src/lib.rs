pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{BenchmarkOutcome, EnqueueOutcome, PeriodType, StatementType};
pub use error::CoreError;
pub use structs::{Benchmark, BenchmarkKey, CommonSizeStatement, Job, LineItem, Statement};
