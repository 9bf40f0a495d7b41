//! Cross-file check: custom fields the companion test class never mentions.

use govlint_core::types::collections::FxHashSet;

use super::types::{Issue, IssueKind, Severity};
use crate::extractor::{FieldReference, ParsedFile};
use crate::scanner::Range;

const CUSTOM_FIELD_SUFFIX: &str = "__c";

fn is_custom_field(field: &FieldReference) -> bool {
    let name = field.name.as_bytes();
    name.len() > CUSTOM_FIELD_SUFFIX.len()
        && name[name.len() - CUSTOM_FIELD_SUFFIX.len()..]
            .eq_ignore_ascii_case(CUSTOM_FIELD_SUFFIX.as_bytes())
}

/// One warning per custom field in `source` whose name never appears in `test`.
pub fn analyze_untested_fields(source: &ParsedFile, test: &ParsedFile) -> Vec<Issue> {
    let tested: FxHashSet<String> = test
        .field_references
        .iter()
        .map(FieldReference::normalized_name)
        .collect();

    let mut reported = FxHashSet::default();
    let mut issues = Vec::new();
    for field in source.field_references.iter().filter(|f| is_custom_field(f)) {
        let normalized = field.normalized_name();
        if tested.contains(&normalized) || !reported.insert(normalized) {
            continue;
        }
        issues.push(Issue::new(
            IssueKind::UntestedField,
            Severity::Warning,
            format!(
                "Field '{}' is never referenced by the test class",
                field.name
            ),
            Range::on_line(field.position, field.name.len()),
        ));
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract;

    #[test]
    fn reports_each_missing_field_once() {
        let source = extract(
            "public class Svc {\n  void a(Account acc) {\n    acc.Region__c = 'x';\n    acc.Tier__c = acc.Region__c;\n  }\n}",
        );
        let test = extract("@isTest class SvcTest { static void t() { a.tier__C = 'y'; } }");
        let issues = analyze_untested_fields(&source, &test);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("Region__c"));
        assert_eq!(issues[0].range.start.line, 2);
    }

    #[test]
    fn relationship_names_are_not_fields() {
        let source = extract("class S { void a() { x = c.Owner__r.Name; } }");
        let test = extract("class T { }");
        assert!(analyze_untested_fields(&source, &test).is_empty());
    }
}
