//! Parallel file walker using the `ignore` crate's `WalkParallel`.
//!
//! Honors `.gitignore`, `.govlintignore` (gitignore syntax, hierarchical),
//! the default ignore list, and the configured extensions.

use std::path::Path;
use std::sync::Arc;

use crossbeam_channel as channel;
use govlint_core::errors::ScanError;
use govlint_core::ScanConfig;

use super::cancellation::ScanCancellation;
use super::types::DiscoveredFile;

pub const IGNORE_FILE_NAME: &str = ".govlintignore";

/// Directories skipped in every scan: tool caches and dependency trees of
/// Salesforce DX projects.
pub const DEFAULT_IGNORES: &[&str] = &[
    ".git",
    ".sfdx",
    ".sf",
    ".localdevserver",
    ".vscode",
    ".idea",
    "node_modules",
    "coverage",
    "target",
];

/// A missing root is `RootNotFound`; one that exists but cannot be listed
/// as a directory is an `IoError`.
fn check_root(root: &Path) -> Result<(), ScanError> {
    let metadata = match std::fs::metadata(root) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScanError::RootNotFound {
                path: root.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(ScanError::IoError {
                path: root.to_path_buf(),
                source,
            });
        }
    };
    if !metadata.is_dir() {
        return Err(ScanError::IoError {
            path: root.to_path_buf(),
            source: std::io::Error::other("not a directory"),
        });
    }
    std::fs::read_dir(root)
        .map(|_| ())
        .map_err(|source| ScanError::IoError {
            path: root.to_path_buf(),
            source,
        })
}

/// Walk `root` in parallel and return matching files sorted by path.
pub fn walk_directory(
    root: &Path,
    config: &ScanConfig,
    cancellation: &ScanCancellation,
) -> Result<Vec<DiscoveredFile>, ScanError> {
    check_root(root)?;

    let (tx, rx) = channel::unbounded();
    let extensions = Arc::new(config.effective_extensions());
    let threads = config.effective_threads();

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false)
        .add_custom_ignore_filename(IGNORE_FILE_NAME)
        .max_filesize(Some(config.effective_max_file_size()))
        .follow_links(config.follow_symlinks.unwrap_or(false));
    if threads > 0 {
        builder.threads(threads);
    }

    // Include patterns whitelist; default and extra ignores are negated.
    let mut overrides = ignore::overrides::OverrideBuilder::new(root);
    for pattern in &config.include {
        add_override(&mut overrides, pattern);
    }
    for pattern in DEFAULT_IGNORES {
        add_override(&mut overrides, &format!("!{pattern}/**"));
        add_override(&mut overrides, &format!("!{pattern}"));
    }
    for pattern in &config.extra_ignore {
        add_override(&mut overrides, &format!("!{pattern}"));
    }
    match overrides.build() {
        Ok(built) => {
            builder.overrides(built);
        }
        Err(e) => tracing::warn!(error = %e, "ignoring invalid scan patterns"),
    }

    builder.build_parallel().run(|| {
        let tx = tx.clone();
        let extensions = Arc::clone(&extensions);
        let cancellation = cancellation.clone();
        Box::new(move |entry| {
            if cancellation.is_cancelled() {
                return ignore::WalkState::Quit;
            }
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "walk entry skipped");
                    return ignore::WalkState::Continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return ignore::WalkState::Continue;
            }
            if !has_extension(entry.path(), &extensions) {
                return ignore::WalkState::Continue;
            }
            let file_size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            let _ = tx.send(DiscoveredFile {
                path: entry.into_path(),
                file_size,
            });
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    if cancellation.is_cancelled() {
        return Err(ScanError::Cancelled);
    }
    let mut files: Vec<DiscoveredFile> = rx.into_iter().collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

fn add_override(builder: &mut ignore::overrides::OverrideBuilder, pattern: &str) {
    if let Err(e) = builder.add(pattern) {
        tracing::warn!(pattern, error = %e, "invalid scan pattern");
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}
