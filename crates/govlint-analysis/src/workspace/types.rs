//! Workspace scan data types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::detectors::Issue;

/// A file found by the walker, before it is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub file_size: u64,
}

/// Analysis output for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// File stem, which names the class or trigger.
    pub name: Option<String>,
    pub content_hash: u64,
    pub issues: Vec<Issue>,
    pub issue_count: usize,
}

/// A file that was discovered but could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceStats {
    pub total_files: usize,
    pub total_size_bytes: u64,
    pub total_issues: usize,
    pub discovery_ms: u64,
    pub analysis_ms: u64,
}

/// Result of a workspace scan. `files` is sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceReport {
    pub files: Vec<FileReport>,
    pub errors: Vec<ReadFailure>,
    pub stats: WorkspaceStats,
}

impl WorkspaceReport {
    pub fn issue_count(&self) -> usize {
        self.files.iter().map(|f| f.issue_count).sum()
    }

    pub fn file(&self, path: &std::path::Path) -> Option<&FileReport> {
        self.files.iter().find(|f| f.path == path)
    }
}
