//! After-triggers that write records without a recursion guard.

use super::traits::{DetectionContext, Detector, DetectorCategory};
use super::types::{Issue, IssueKind, Severity};

pub struct TriggerRecursionDetector;

impl Detector for TriggerRecursionDetector {
    fn id(&self) -> &str {
        IssueKind::TriggerWithoutRecursionGuard.code()
    }

    fn category(&self) -> DetectorCategory {
        DetectorCategory::Bulkification
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let Some(trigger) = &ctx.parsed.trigger else {
            return Vec::new();
        };
        if trigger.has_recursion_guard || !trigger.has_after_event() {
            return Vec::new();
        }
        let Some(op) = trigger
            .data_operations
            .iter()
            .find(|op| op.verb.writes_records())
        else {
            return Vec::new();
        };
        vec![Issue::new(
            IssueKind::TriggerWithoutRecursionGuard,
            Severity::Warning,
            format!(
                "Trigger '{}' runs {} in an after-trigger without a recursion guard; the write can re-fire the trigger",
                trigger.name,
                op.verb.name()
            ),
            op.range,
        )]
    }
}
