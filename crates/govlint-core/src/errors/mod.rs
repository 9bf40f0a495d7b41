//! Error handling for govlint.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod detection_error;
pub mod error_code;
pub mod scan_error;

pub use config_error::ConfigError;
pub use detection_error::DetectionError;
pub use error_code::GovlintErrorCode;
pub use scan_error::ScanError;
