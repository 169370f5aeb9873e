//! Pure common-size statement math: normalization against a base concept,
//! derived-line reconciliation, statement layouts, and peer averaging.
//! No I/O lives here; everything is safe to call concurrently.

pub mod average;
pub mod derive;
pub mod error;
pub mod layout;
pub mod normalize;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use average::average_ratios;
pub use derive::fill_derived_lines;
pub use error::CommonSizeError;
pub use layout::{balance_layout, base_concept, income_layout, layout_for, LayoutRow};
pub use normalize::normalize;
pub use report::{build_lines, StatementLine};
