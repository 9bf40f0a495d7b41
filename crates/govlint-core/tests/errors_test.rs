//! Error codes and display strings.

use std::path::PathBuf;

use govlint_core::errors::{ConfigError, DetectionError, ScanError};
use govlint_core::GovlintErrorCode;

#[test]
fn every_subsystem_has_a_code() {
    let config = ConfigError::InvalidValue {
        field: "scan.threads".into(),
        message: "negative".into(),
    };
    assert_eq!(config.error_code(), "CONFIG_ERROR");
    assert_eq!(
        config.coded_string(),
        "[CONFIG_ERROR] Invalid config value for scan.threads: negative"
    );

    let panic = DetectionError::DetectorPanic {
        id: "query-in-loop".into(),
        message: "boom".into(),
    };
    assert_eq!(panic.error_code(), "DETECTION_ERROR");
    assert!(panic.to_string().contains("query-in-loop"));
}

#[test]
fn cancellation_has_its_own_code() {
    assert_eq!(ScanError::Cancelled.error_code(), "CANCELLED");
    let missing = ScanError::RootNotFound {
        path: PathBuf::from("/nowhere"),
    };
    assert_eq!(missing.error_code(), "SCAN_ERROR");
    assert_eq!(missing.to_string(), "Scan root not found: /nowhere");
}

#[test]
fn io_errors_keep_their_source() {
    use std::error::Error;

    let err = ScanError::IoError {
        path: PathBuf::from("a.cls"),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    };
    assert!(err.source().is_some());
    assert!(err.coded_string().starts_with("[SCAN_ERROR] IO error scanning a.cls"));
}
