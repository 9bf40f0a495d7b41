//! Detector trait and rule categories.

use govlint_core::AnalysisConfig;
use serde::{Deserialize, Serialize};

use super::types::Issue;
use crate::call_graph::MethodIndex;
use crate::extractor::ParsedFile;

/// Everything a single-file detector may read.
pub struct DetectionContext<'p> {
    pub parsed: &'p ParsedFile,
    pub methods: MethodIndex<'p>,
    pub config: &'p AnalysisConfig,
}

impl<'p> DetectionContext<'p> {
    pub fn new(parsed: &'p ParsedFile, config: &'p AnalysisConfig) -> Self {
        Self {
            parsed,
            methods: MethodIndex::new(&parsed.methods),
            config,
        }
    }
}

/// Trait that every single-file detector implements.
pub trait Detector: Send + Sync {
    /// Stable identifier; matches the code of the issue kind it reports.
    fn id(&self) -> &str;

    fn category(&self) -> DetectorCategory;

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorCategory {
    /// Per-transaction platform limits: queries and DML in loops, unbounded queries.
    Governor,
    /// Code that only works for one record at a time.
    Bulkification,
    Maintainability,
    Testing,
}

impl DetectorCategory {
    pub fn all() -> &'static [DetectorCategory] {
        &[
            Self::Governor,
            Self::Bulkification,
            Self::Maintainability,
            Self::Testing,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Governor => "governor",
            Self::Bulkification => "bulkification",
            Self::Maintainability => "maintainability",
            Self::Testing => "testing",
        }
    }
}
