//! Issue model produced by the rule engine.

use serde::{Deserialize, Serialize};

use super::traits::DetectorCategory;
use crate::scanner::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Information,
}

/// One variant per rule. The kebab-case code is stable and meant for hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    QueryInLoop,
    QueryInLoopViaCall,
    DataOpInLoop,
    DataOpInLoopViaCall,
    HardcodedId,
    MissingLimit,
    RecordTypeQuery,
    SingleRecordDml,
    NonBulkifiedInvocable,
    TriggerWithoutRecursionGuard,
    DeepNesting,
    UntestedField,
}

impl IssueKind {
    pub const ALL: [IssueKind; 12] = [
        Self::QueryInLoop,
        Self::QueryInLoopViaCall,
        Self::DataOpInLoop,
        Self::DataOpInLoopViaCall,
        Self::HardcodedId,
        Self::MissingLimit,
        Self::RecordTypeQuery,
        Self::SingleRecordDml,
        Self::NonBulkifiedInvocable,
        Self::TriggerWithoutRecursionGuard,
        Self::DeepNesting,
        Self::UntestedField,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::QueryInLoop => "query-in-loop",
            Self::QueryInLoopViaCall => "query-in-loop-via-call",
            Self::DataOpInLoop => "data-op-in-loop",
            Self::DataOpInLoopViaCall => "data-op-in-loop-via-call",
            Self::HardcodedId => "hardcoded-id",
            Self::MissingLimit => "missing-limit",
            Self::RecordTypeQuery => "record-type-query",
            Self::SingleRecordDml => "single-record-dml",
            Self::NonBulkifiedInvocable => "non-bulkified-invocable",
            Self::TriggerWithoutRecursionGuard => "trigger-without-recursion-guard",
            Self::DeepNesting => "deep-nesting",
            Self::UntestedField => "untested-field",
        }
    }

    pub fn category(&self) -> DetectorCategory {
        match self {
            Self::QueryInLoop
            | Self::QueryInLoopViaCall
            | Self::DataOpInLoop
            | Self::DataOpInLoopViaCall
            | Self::MissingLimit => DetectorCategory::Governor,
            Self::SingleRecordDml
            | Self::NonBulkifiedInvocable
            | Self::TriggerWithoutRecursionGuard => DetectorCategory::Bulkification,
            Self::HardcodedId | Self::RecordTypeQuery | Self::DeepNesting => {
                DetectorCategory::Maintainability
            }
            Self::UntestedField => DetectorCategory::Testing,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A secondary location, e.g. the query inside a called method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedInfo {
    pub range: Range,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    pub range: Range,
    pub related: Option<RelatedInfo>,
}

impl Issue {
    pub fn new(kind: IssueKind, severity: Severity, message: impl Into<String>, range: Range) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            range,
            related: None,
        }
    }

    pub fn with_related(mut self, range: Range, message: impl Into<String>) -> Self {
        self.related = Some(RelatedInfo {
            range,
            message: message.into(),
        });
        self
    }

    /// `[code] message`, the form hosts show in a problems list.
    pub fn coded_message(&self) -> String {
        format!("[{}] {}", self.kind.code(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_and_are_unique() {
        let mut codes: Vec<&str> = IssueKind::ALL.iter().map(|k| k.code()).collect();
        for kind in IssueKind::ALL {
            assert_eq!(IssueKind::from_code(kind.code()), Some(kind));
        }
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), IssueKind::ALL.len());
    }

    #[test]
    fn serde_uses_codes() {
        let json = serde_json::to_string(&IssueKind::TriggerWithoutRecursionGuard).unwrap();
        assert_eq!(json, "\"trigger-without-recursion-guard\"");
    }
}
