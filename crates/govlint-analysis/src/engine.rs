//! Entry points: single-file analysis, the two-file untested-field check,
//! and the text-in/issues-out pipeline hosts call.

use govlint_core::AnalysisConfig;
use serde::{Deserialize, Serialize};

use crate::detectors::{create_registry, DetectionContext, Issue};
use crate::extractor::{extract_with, ExtractOptions, ParsedFile};

pub use crate::detectors::analyze_untested_fields;

/// Run every enabled single-file detector over `parsed`.
///
/// Detector panics are logged by the registry and dropped here; the
/// remaining detectors still contribute their issues.
pub fn analyze(parsed: &ParsedFile, config: &AnalysisConfig) -> Vec<Issue> {
    let registry = create_registry(config);
    let ctx = DetectionContext::new(parsed, config);
    let output = registry.run_all(&ctx);
    if !output.errors.is_empty() {
        tracing::warn!(
            failed = output.errors.len(),
            "some detectors failed; returning partial results"
        );
    }
    output.issues
}

/// Looks up the source text of a class by name.
pub trait CompanionResolver {
    fn resolve(&self, class_name: &str) -> Option<String>;
}

impl<F> CompanionResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, class_name: &str) -> Option<String> {
        self(class_name)
    }
}

/// A resolver that never finds anything.
pub struct NoCompanion;

impl CompanionResolver for NoCompanion {
    fn resolve(&self, _class_name: &str) -> Option<String> {
        None
    }
}

/// Test-class names tried for `class_name`, in lookup order.
pub fn companion_candidates(class_name: &str) -> [String; 4] {
    [
        format!("{class_name}Test"),
        format!("{class_name}_Test"),
        format!("Test{class_name}"),
        format!("{class_name}Tests"),
    ]
}

/// First companion test text the resolver returns.
pub fn resolve_companion(class_name: &str, resolver: &impl CompanionResolver) -> Option<String> {
    companion_candidates(class_name)
        .iter()
        .find_map(|candidate| resolver.resolve(candidate))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub issues: Vec<Issue>,
    pub issue_count: usize,
}

impl AnalysisResult {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            issue_count: issues.len(),
            issues,
        }
    }
}

/// Extract, analyze, and (for non-test classes) run the untested-field
/// check against the first companion test class the resolver finds.
pub fn analyze_source(
    text: &str,
    config: &AnalysisConfig,
    resolver: &impl CompanionResolver,
) -> AnalysisResult {
    let options = ExtractOptions {
        max_nesting_depth: config.effective_max_nesting_depth(),
    };
    let parsed = extract_with(text, &options);
    let mut issues = analyze(&parsed, config);

    if let Some(test) = companion_for(&parsed, config, resolver) {
        let test_parsed = extract_with(&test, &options);
        issues.extend(analyze_untested_fields(&parsed, &test_parsed));
    }

    AnalysisResult::new(issues)
}

fn companion_for(
    parsed: &ParsedFile,
    config: &AnalysisConfig,
    resolver: &impl CompanionResolver,
) -> Option<String> {
    if !config.effective_detect_untested_fields() || parsed.is_test_class || parsed.is_trigger {
        return None;
    }
    let class_name = parsed.class_name.as_deref()?;
    let found = resolve_companion(class_name, resolver);
    if found.is_none() {
        tracing::debug!(class = class_name, "no companion test class found");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::IssueKind;

    const SERVICE: &str = "public class Svc {\n  public void run(Account a) {\n    a.Region__c = 'x';\n  }\n}";

    #[test]
    fn candidates_in_lookup_order() {
        assert_eq!(
            companion_candidates("Svc"),
            ["SvcTest", "Svc_Test", "TestSvc", "SvcTests"].map(String::from)
        );
    }

    #[test]
    fn resolver_closure_finds_second_convention() {
        let resolver = |name: &str| (name == "Svc_Test").then(|| "class Svc_Test { }".to_string());
        let result = analyze_source(SERVICE, &AnalysisConfig::default(), &resolver);
        assert_eq!(result.issue_count, 1);
        assert_eq!(result.issues[0].kind, IssueKind::UntestedField);
    }

    #[test]
    fn untested_check_skipped_without_companion_or_when_disabled() {
        let result = analyze_source(SERVICE, &AnalysisConfig::default(), &NoCompanion);
        assert_eq!(result.issue_count, 0);

        let config = AnalysisConfig {
            detect_untested_fields: Some(false),
            ..Default::default()
        };
        let resolver = |_: &str| Some("class T { }".to_string());
        assert_eq!(analyze_source(SERVICE, &config, &resolver).issue_count, 0);
    }

    #[test]
    fn configured_threshold_reaches_extraction() {
        let src = "void m() {\n if (a) {\n  if (b) {\n   if (c) {\n   }\n  }\n }\n}";
        let config = AnalysisConfig {
            max_nesting_depth: Some(2),
            ..Default::default()
        };
        let result = analyze_source(src, &config, &NoCompanion);
        assert_eq!(
            result
                .issues
                .iter()
                .filter(|i| i.kind == IssueKind::DeepNesting)
                .count(),
            1
        );
    }
}
