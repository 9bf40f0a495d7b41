//! Workspace batch scan: walk, read, and analyze every Apex file under a
//! root in parallel. Files are independent; the only cross-file input is
//! the companion test lookup, served from the texts loaded by this scan.

pub mod cancellation;
pub mod companion;
pub mod hasher;
pub mod types;
pub mod walker;

use std::path::{Path, PathBuf};
use std::time::Instant;

use govlint_core::errors::ScanError;
use govlint_core::{AnalysisConfig, GovlintConfig};
use rayon::prelude::*;

pub use cancellation::ScanCancellation;
pub use companion::CompanionIndex;
pub use types::{DiscoveredFile, FileReport, ReadFailure, WorkspaceReport, WorkspaceStats};

use crate::engine::analyze_source;

struct LoadedFile {
    path: PathBuf,
    text: String,
}

/// Scan every matching file under `root`.
///
/// Unreadable files are logged and collected on the report. The scan
/// only fails when the root is missing or unreadable, or `cancellation`
/// fires.
pub fn scan_workspace(
    root: &Path,
    config: &GovlintConfig,
    cancellation: &ScanCancellation,
) -> Result<WorkspaceReport, ScanError> {
    let discovery_start = Instant::now();
    let discovered = walker::walk_directory(root, &config.scan, cancellation)?;
    let discovery_ms = discovery_start.elapsed().as_millis() as u64;

    let analysis_start = Instant::now();
    let threads = config.scan.effective_threads();
    let outcome = if threads > 0 {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| load_and_analyze(&discovered, &config.analysis, cancellation)),
            Err(e) => {
                tracing::warn!(error = %e, "falling back to the global thread pool");
                load_and_analyze(&discovered, &config.analysis, cancellation)
            }
        }
    } else {
        load_and_analyze(&discovered, &config.analysis, cancellation)
    };
    let (files, errors) = outcome?;

    let stats = WorkspaceStats {
        total_files: files.len(),
        total_size_bytes: discovered.iter().map(|f| f.file_size).sum(),
        total_issues: files.iter().map(|f| f.issue_count).sum(),
        discovery_ms,
        analysis_ms: analysis_start.elapsed().as_millis() as u64,
    };
    tracing::info!(
        root = %root.display(),
        files = stats.total_files,
        issues = stats.total_issues,
        unreadable = errors.len(),
        discovery_ms = stats.discovery_ms,
        analysis_ms = stats.analysis_ms,
        "workspace scan complete"
    );

    Ok(WorkspaceReport {
        files,
        errors,
        stats,
    })
}

fn load_and_analyze(
    discovered: &[DiscoveredFile],
    config: &AnalysisConfig,
    cancellation: &ScanCancellation,
) -> Result<(Vec<FileReport>, Vec<ReadFailure>), ScanError> {
    let loaded: Vec<Result<LoadedFile, ReadFailure>> = discovered
        .par_iter()
        .map(|file| read_file(&file.path))
        .collect();
    if cancellation.is_cancelled() {
        return Err(ScanError::Cancelled);
    }

    let mut texts = Vec::with_capacity(loaded.len());
    let mut errors = Vec::new();
    for result in loaded {
        match result {
            Ok(file) => texts.push(file),
            Err(failure) => errors.push(failure),
        }
    }

    let companions = CompanionIndex::new(texts.iter().map(|f| (f.path.as_path(), f.text.as_str())));
    let reports: Vec<Option<FileReport>> = texts
        .par_iter()
        .map(|file| {
            if cancellation.is_cancelled() {
                return None;
            }
            let result = analyze_source(&file.text, config, &companions);
            Some(FileReport {
                path: file.path.clone(),
                name: file_stem(&file.path),
                content_hash: hasher::content_hash(file.text.as_bytes()),
                issue_count: result.issue_count,
                issues: result.issues,
            })
        })
        .collect();
    if cancellation.is_cancelled() {
        return Err(ScanError::Cancelled);
    }

    // `discovered` is path-sorted and `collect` preserves order.
    Ok((reports.into_iter().flatten().collect(), errors))
}

fn read_file(path: &Path) -> Result<LoadedFile, ReadFailure> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(LoadedFile {
            path: path.to_path_buf(),
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read file");
            Err(ReadFailure {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    }
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}
