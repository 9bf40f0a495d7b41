//! Cycle-safe walk over same-file callees.

use govlint_core::types::collections::FxHashSet;

use super::index::MethodIndex;
use crate::extractor::{DataOperation, Method, Query};

/// A fact found in a method reachable from a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reached<'p, T> {
    pub method: &'p Method,
    pub fact: &'p T,
}

/// Every reachable method that issues a query, with its first query.
pub fn reachable_queries<'p>(
    index: &MethodIndex<'p>,
    origin: Option<&Method>,
    callee: &str,
) -> Vec<Reached<'p, Query>> {
    walk(index, origin, callee, |m| m.queries.first())
}

/// Every reachable method that performs DML, with its first operation.
pub fn reachable_data_operations<'p>(
    index: &MethodIndex<'p>,
    origin: Option<&Method>,
    callee: &str,
) -> Vec<Reached<'p, DataOperation>> {
    walk(index, origin, callee, |m| m.data_operations.first())
}

/// Depth-first from `callee`. The visited set holds lowercased names and is
/// seeded with the origin method, so no name is expanded twice and cycles
/// terminate. Names with no local method end their branch.
fn walk<'p, T>(
    index: &MethodIndex<'p>,
    origin: Option<&Method>,
    callee: &str,
    first_fact: impl Fn(&'p Method) -> Option<&'p T>,
) -> Vec<Reached<'p, T>> {
    let mut visited: FxHashSet<String> = FxHashSet::default();
    if let Some(origin) = origin {
        visited.insert(origin.name.to_ascii_lowercase());
    }
    let mut stack = vec![callee.to_ascii_lowercase()];
    let mut out = Vec::new();

    while let Some(name) = stack.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        for method in index.resolve(&name) {
            if let Some(fact) = first_fact(method) {
                out.push(Reached { method, fact });
            }
            stack.extend(method.callee_names.iter().rev().map(|n| n.to_ascii_lowercase()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract;

    #[test]
    fn follows_chain_and_reports_first_query_per_method() {
        let parsed = extract(
            "void a() { b(); }\n\
             void b() { x = [SELECT Id FROM A]; y = [SELECT Id FROM B]; c(); }\n\
             void c() { z = [SELECT Id FROM C]; }",
        );
        let index = MethodIndex::new(&parsed.methods);
        let reached = reachable_queries(&index, parsed.methods.first(), "b");
        let names: Vec<&str> = reached.iter().map(|r| r.method.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert_eq!(reached[0].fact.text.as_deref(), Some("SELECT Id FROM A"));
    }

    #[test]
    fn mutual_recursion_terminates() {
        let parsed = extract("void a() { b(); }\nvoid b() { a(); update x; }");
        let index = MethodIndex::new(&parsed.methods);
        let reached = reachable_data_operations(&index, parsed.methods.first(), "b");
        assert_eq!(reached.len(), 1);
        assert_eq!(reached[0].method.name, "b");
    }

    #[test]
    fn unresolved_callee_yields_nothing() {
        let parsed = extract("void a() { External.call(); }");
        let index = MethodIndex::new(&parsed.methods);
        assert!(reachable_queries(&index, None, "missing").is_empty());
    }

    #[test]
    fn names_resolve_case_insensitively() {
        let parsed = extract("void Load() { delete y; }");
        let index = MethodIndex::new(&parsed.methods);
        assert_eq!(reachable_data_operations(&index, None, "LOAD").len(), 1);
    }
}
