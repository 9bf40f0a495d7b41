//! Workspace scan errors.

use std::path::PathBuf;

use super::error_code::{self, GovlintErrorCode};

/// Errors that abort a workspace scan. Per-file read failures are not
/// represented here; they are collected on the report instead.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("IO error scanning {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scan root not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Scan cancelled")]
    Cancelled,
}

impl GovlintErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => error_code::CANCELLED,
            _ => error_code::SCAN_ERROR,
        }
    }
}
