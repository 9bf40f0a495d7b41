use super::traits::{DetectionContext, Detector, DetectorCategory};
use super::types::{Issue, IssueKind, Severity};

pub struct HardcodedIdDetector;

impl Detector for HardcodedIdDetector {
    fn id(&self) -> &str {
        IssueKind::HardcodedId.code()
    }

    fn category(&self) -> DetectorCategory {
        DetectorCategory::Maintainability
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        ctx.parsed
            .hardcoded_ids
            .iter()
            .map(|id| {
                Issue::new(
                    IssueKind::HardcodedId,
                    Severity::Warning,
                    format!(
                        "Hardcoded record id '{}'; ids differ between orgs and sandboxes",
                        id.value
                    ),
                    id.range,
                )
            })
            .collect()
    }
}
