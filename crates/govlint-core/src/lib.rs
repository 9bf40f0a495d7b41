//! # govlint-core
//!
//! Foundation crate for the govlint Apex analyzer.
//! Defines config, errors, tracing setup, and shared collection types.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::{AnalysisConfig, GovlintConfig, ScanConfig};
pub use errors::error_code::GovlintErrorCode;
pub use types::collections::{FxHashMap, FxHashSet};
