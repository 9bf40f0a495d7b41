//! # govlint-analysis
//!
//! Analysis engine for the govlint Apex analyzer.
//! Contains the scanner, structural extractor, call graph resolver,
//! detectors, engine entry points, and the workspace batch scan.

#![allow(clippy::module_inception)]

pub mod call_graph;
pub mod detectors;
pub mod engine;
pub mod extractor;
pub mod scanner;
pub mod workspace;

pub use detectors::{Issue, IssueKind, RelatedInfo, Severity};
pub use engine::{
    analyze, analyze_source, analyze_untested_fields, companion_candidates, AnalysisResult,
    CompanionResolver, NoCompanion,
};
pub use extractor::{extract, extract_with, ExtractOptions, ParsedFile};
pub use workspace::{scan_workspace, ScanCancellation, WorkspaceReport};
