//! Queries and DML executed once per loop iteration, directly or through
//! same-file method calls.

use govlint_core::types::collections::FxHashSet;

use super::traits::{DetectionContext, Detector, DetectorCategory};
use super::types::{Issue, IssueKind, Severity};
use crate::call_graph::{reachable_data_operations, reachable_queries, Reached};
use crate::extractor::{Loop, MethodCall};
use crate::scanner::Range;

pub struct QueryInLoopDetector;

impl Detector for QueryInLoopDetector {
    fn id(&self) -> &str {
        IssueKind::QueryInLoop.code()
    }

    fn category(&self) -> DetectorCategory {
        DetectorCategory::Governor
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let mut issues = Vec::new();
        for l in &ctx.parsed.loops {
            for q in &ctx.parsed.queries {
                if l.contains(q.span.start, q.range.start.line) {
                    issues.push(Issue::new(
                        IssueKind::QueryInLoop,
                        Severity::Error,
                        format!(
                            "SOQL query inside a {} loop; query once before the loop and index the results",
                            l.kind.name()
                        ),
                        q.range,
                    ));
                }
            }
        }
        issues
    }
}

pub struct DataOpInLoopDetector;

impl Detector for DataOpInLoopDetector {
    fn id(&self) -> &str {
        IssueKind::DataOpInLoop.code()
    }

    fn category(&self) -> DetectorCategory {
        DetectorCategory::Governor
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let mut issues = Vec::new();
        for l in &ctx.parsed.loops {
            for op in &ctx.parsed.data_operations {
                if l.contains(op.span.start, op.range.start.line) {
                    issues.push(Issue::new(
                        IssueKind::DataOpInLoop,
                        Severity::Error,
                        format!(
                            "DML '{}' inside a {} loop; collect records and issue one statement after the loop",
                            op.verb.name(),
                            l.kind.name()
                        ),
                        op.range,
                    ));
                }
            }
        }
        issues
    }
}

pub struct QueryInLoopViaCallDetector;

impl Detector for QueryInLoopViaCallDetector {
    fn id(&self) -> &str {
        IssueKind::QueryInLoopViaCall.code()
    }

    fn category(&self) -> DetectorCategory {
        DetectorCategory::Governor
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        via_calls(ctx, |call| {
            let origin = ctx.parsed.method_at(call.span.start);
            reachable_queries(&ctx.methods, origin, &call.name)
                .into_iter()
                .map(|Reached { method, fact }| {
                    let issue = Issue::new(
                        IssueKind::QueryInLoopViaCall,
                        Severity::Error,
                        format!(
                            "Call to '{}' inside a loop reaches a SOQL query in '{}'",
                            call.name, method.name
                        ),
                        call_range(call),
                    )
                    .with_related(fact.range, format!("query issued here in '{}'", method.name));
                    (fact.span.start, issue)
                })
                .collect()
        })
    }
}

pub struct DataOpInLoopViaCallDetector;

impl Detector for DataOpInLoopViaCallDetector {
    fn id(&self) -> &str {
        IssueKind::DataOpInLoopViaCall.code()
    }

    fn category(&self) -> DetectorCategory {
        DetectorCategory::Governor
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        via_calls(ctx, |call| {
            let origin = ctx.parsed.method_at(call.span.start);
            reachable_data_operations(&ctx.methods, origin, &call.name)
                .into_iter()
                .map(|Reached { method, fact }| {
                    let issue = Issue::new(
                        IssueKind::DataOpInLoopViaCall,
                        Severity::Error,
                        format!(
                            "Call to '{}' inside a loop reaches DML '{}' in '{}'",
                            call.name,
                            fact.verb.name(),
                            method.name
                        ),
                        call_range(call),
                    )
                    .with_related(
                        fact.range,
                        format!("'{}' performed here in '{}'", fact.verb.name(), method.name),
                    );
                    (fact.span.start, issue)
                })
                .collect()
        })
    }
}

/// Runs `resolve` for every call site inside a loop. Each resolved fact is
/// reported once per call site, however many loops enclose the call.
fn via_calls<'p>(
    ctx: &DetectionContext<'p>,
    resolve: impl Fn(&'p MethodCall) -> Vec<(usize, Issue)>,
) -> Vec<Issue> {
    let parsed = ctx.parsed;
    let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
    let mut issues = Vec::new();
    for call in &parsed.method_calls {
        if !in_any_loop(&parsed.loops, call) {
            continue;
        }
        for (fact_offset, issue) in resolve(call) {
            if seen.insert((call.span.start, fact_offset)) {
                issues.push(issue);
            }
        }
    }
    issues
}

fn in_any_loop(loops: &[Loop], call: &MethodCall) -> bool {
    loops
        .iter()
        .any(|l| l.contains(call.span.start, call.position.line))
}

fn call_range(call: &MethodCall) -> Range {
    Range::on_line(call.position, call.name.chars().count())
}
