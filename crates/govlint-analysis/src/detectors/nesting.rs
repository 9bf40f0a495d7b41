use super::traits::{DetectionContext, Detector, DetectorCategory};
use super::types::{Issue, IssueKind, Severity};
use crate::scanner::Range;

pub struct DeepNestingDetector;

impl Detector for DeepNestingDetector {
    fn id(&self) -> &str {
        IssueKind::DeepNesting.code()
    }

    fn category(&self) -> DetectorCategory {
        DetectorCategory::Maintainability
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let max = ctx.config.effective_max_nesting_depth();
        ctx.parsed
            .deep_nesting
            .iter()
            .filter(|n| n.depth > max)
            .map(|n| {
                Issue::new(
                    IssueKind::DeepNesting,
                    Severity::Information,
                    format!(
                        "'{}' block nested {} levels deep (max {}); extract a method or return early",
                        n.kind.name(),
                        n.depth,
                        max
                    ),
                    Range::on_line(n.position, n.span.len()),
                )
            })
            .collect()
    }
}
