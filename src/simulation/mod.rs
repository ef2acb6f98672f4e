//! Simulation engine for migration previews
//!
//! Answers "what would this SQL do?" without touching a database: per
//! statement classification, touched objects, reversibility, and an overall
//! risk estimate.

pub mod dry_run;

pub use dry_run::{analyze_dry_run, DryRunOperation, DryRunReport, OperationType};
