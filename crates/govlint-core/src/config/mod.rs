//! Configuration system for govlint.
//! TOML-based, layered resolution: overrides > env > project > user > defaults.

pub mod analysis_config;
pub mod govlint_config;
pub mod scan_config;

pub use analysis_config::AnalysisConfig;
pub use govlint_config::{ConfigOverrides, GovlintConfig};
pub use scan_config::ScanConfig;
