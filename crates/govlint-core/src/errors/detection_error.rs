//! Detection errors.

use super::error_code::{self, GovlintErrorCode};

/// Errors recorded while running detectors. Never fatal to a file scan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectionError {
    #[error("Detector {id} panicked: {message}")]
    DetectorPanic { id: String, message: String },
}

impl GovlintErrorCode for DetectionError {
    fn error_code(&self) -> &'static str {
        error_code::DETECTION_ERROR
    }
}
