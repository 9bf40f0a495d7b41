//! Per-query checks: missing LIMIT and RecordType lookups.

use std::sync::OnceLock;

use regex::Regex;

use super::traits::{DetectionContext, Detector, DetectorCategory};
use super::types::{Issue, IssueKind, Severity};
use crate::extractor::cached_regex;

pub struct MissingLimitDetector;

impl Detector for MissingLimitDetector {
    fn id(&self) -> &str {
        IssueKind::MissingLimit.code()
    }

    fn category(&self) -> DetectorCategory {
        DetectorCategory::Governor
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        ctx.parsed
            .queries
            .iter()
            .filter(|q| !q.has_limit)
            .map(|q| {
                Issue::new(
                    IssueKind::MissingLimit,
                    Severity::Warning,
                    "Query has no LIMIT clause and may return more rows than the transaction allows",
                    q.range,
                )
            })
            .collect()
    }
}

pub struct RecordTypeQueryDetector;

impl Detector for RecordTypeQueryDetector {
    fn id(&self) -> &str {
        IssueKind::RecordTypeQuery.code()
    }

    fn category(&self) -> DetectorCategory {
        DetectorCategory::Maintainability
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        static FROM_RECORD_TYPE: OnceLock<Option<Regex>> = OnceLock::new();
        let Some(re) = cached_regex(&FROM_RECORD_TYPE, r"(?i)\bFROM\s+RecordType\b") else {
            return Vec::new();
        };
        ctx.parsed
            .queries
            .iter()
            .filter(|q| q.text.as_deref().is_some_and(|t| re.is_match(t)))
            .map(|q| {
                Issue::new(
                    IssueKind::RecordTypeQuery,
                    Severity::Warning,
                    "Query against RecordType; use Schema describe (getRecordTypeInfosByDeveloperName) instead",
                    q.range,
                )
            })
            .collect()
    }
}
