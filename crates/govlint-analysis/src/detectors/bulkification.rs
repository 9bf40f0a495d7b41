//! Method signatures that only handle one record per call.

use super::traits::{DetectionContext, Detector, DetectorCategory};
use super::types::{Issue, IssueKind, Severity};

const INVOCABLE_ANNOTATION: &str = "InvocableMethod";

/// A method taking exactly one SObject and writing it with DML.
pub struct SingleRecordDmlDetector;

impl Detector for SingleRecordDmlDetector {
    fn id(&self) -> &str {
        IssueKind::SingleRecordDml.code()
    }

    fn category(&self) -> DetectorCategory {
        DetectorCategory::Bulkification
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let mut issues = Vec::new();
        for method in &ctx.parsed.methods {
            let [param] = method.parameters.as_slice() else {
                continue;
            };
            if param.is_collection || !param.is_sobject {
                continue;
            }
            let hit = method.data_operations.iter().find(|op| {
                op.target_variable
                    .as_deref()
                    .is_some_and(|t| t.eq_ignore_ascii_case(&param.name))
            });
            if let Some(op) = hit {
                issues.push(Issue::new(
                    IssueKind::SingleRecordDml,
                    Severity::Warning,
                    format!(
                        "'{}' runs {} on its single {} parameter '{}'; accept a List<{}> so callers can bulkify",
                        method.name,
                        op.verb.name(),
                        param.base_type,
                        param.name,
                        param.base_type
                    ),
                    op.range,
                ));
            }
        }
        issues
    }
}

/// `@InvocableMethod` whose first parameter is not a list.
pub struct NonBulkInvocableDetector;

impl Detector for NonBulkInvocableDetector {
    fn id(&self) -> &str {
        IssueKind::NonBulkifiedInvocable.code()
    }

    fn category(&self) -> DetectorCategory {
        DetectorCategory::Bulkification
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        ctx.parsed
            .methods
            .iter()
            .filter(|m| m.has_annotation(INVOCABLE_ANNOTATION))
            .filter(|m| m.parameters.first().map_or(true, |p| !p.is_list()))
            .map(|m| {
                Issue::new(
                    IssueKind::NonBulkifiedInvocable,
                    Severity::Error,
                    format!(
                        "Invocable method '{}' must take a List parameter; flows call it with a batch of inputs",
                        m.name
                    ),
                    m.signature,
                )
            })
            .collect()
    }
}
