//! Method signatures, bodies, parameters, and leading annotations.
//!
//! A method's own queries, DML, and callees are the file-level facts whose
//! spans fall inside its body; nothing is re-scanned.

use std::sync::OnceLock;

use regex::Regex;

use super::calls::callee_names_in;
use super::sobjects::is_sobject_type;
use super::types::{Annotation, DataOperation, Method, MethodCall, Parameter, Query};
use super::{cached_regex, SourceContext};
use crate::scanner::Span;

const SIGNATURE_PATTERN: &str = r"(?i)(?:\b(?:public|private|protected|global|webservice)\s+)?(?:\b(?:with|without|inherited)\s+sharing\s+)?(?:\b(?:static|virtual|abstract|override|testmethod|final|transient)\s+)*\b(?P<ret>[A-Za-z_][\w.]*(?:\s*<[\w\s,.<>\[\]]*>)?(?:\s*\[\s*\])?)\s+(?P<name>[A-Za-z_]\w*)\s*\((?P<params>[^()]*)\)\s*\{";

/// Words that cannot name a method; they mark control flow instead.
const NON_METHOD_NAMES: &[&str] = &[
    "if", "for", "while", "switch", "catch", "when", "do", "else", "return", "new", "trigger",
    "on", "try", "finally", "throw",
];

/// Words that cannot be a return type.
const NON_RETURN_TYPES: &[&str] = &["else", "new", "return", "throw", "on", "when", "trigger", "class"];

/// Keywords allowed between annotations and a signature.
const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "global", "webservice", "static", "virtual", "abstract",
    "override", "final", "testmethod", "transient", "with", "without", "inherited", "sharing",
];

fn is_one_of(word: &str, list: &[&str]) -> bool {
    list.iter().any(|w| w.eq_ignore_ascii_case(word))
}

pub(crate) fn extract_methods(
    ctx: &SourceContext,
    queries: &[Query],
    data_operations: &[DataOperation],
    calls: &[MethodCall],
) -> Vec<Method> {
    static SIGNATURE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = cached_regex(&SIGNATURE, SIGNATURE_PATTERN) else {
        return Vec::new();
    };

    // Comments blanked to spaces keep offsets aligned with `ctx.text`.
    let code = ctx.scanner.without_comments(Span::new(0, ctx.text.len()));
    let mut methods: Vec<Method> = Vec::new();
    for caps in re.captures_iter(&code) {
        let (Some(whole), Some(ret), Some(name), Some(params)) =
            (caps.get(0), caps.name("ret"), caps.name("name"), caps.name("params"))
        else {
            continue;
        };
        if is_one_of(name.as_str(), NON_METHOD_NAMES) || is_one_of(ret.as_str(), NON_RETURN_TYPES) {
            continue;
        }
        let open = whole.end() - 1;
        if !(ctx.scanner.is_code(whole.start())
            && ctx.scanner.is_code(name.start())
            && ctx.scanner.is_code(open))
        {
            continue;
        }
        if methods.iter().any(|m| m.body_span.contains(whole.start())) {
            continue;
        }
        let Some(close) = ctx.scanner.match_brace(open) else {
            tracing::debug!(method = name.as_str(), offset = open, "unmatched method body brace");
            continue;
        };

        let signature_span = Span::new(whole.start(), open);
        let body_span = Span::new(open, close + 1);
        methods.push(Method {
            name: name.as_str().to_string(),
            signature: ctx.range(signature_span),
            signature_span,
            body: ctx.range(body_span),
            body_span,
            parameters: parse_parameters(params.as_str()),
            annotations: leading_annotations(ctx, whole.start()),
            queries: queries
                .iter()
                .filter(|q| body_span.encloses(q.span))
                .cloned()
                .collect(),
            data_operations: data_operations
                .iter()
                .filter(|d| body_span.encloses(d.span))
                .cloned()
                .collect(),
            callee_names: callee_names_in(calls, body_span),
        });
    }
    methods
}

/// Annotations and modifiers directly before `signature_start`, walking
/// tokens backward. Stops at the first token that is neither.
fn leading_annotations(ctx: &SourceContext, signature_start: usize) -> Vec<Annotation> {
    let tokens = ctx.tokens();
    let mut idx = ctx.scanner.token_index_from(signature_start);
    let mut out = Vec::new();
    while idx > 0 {
        let prev = idx - 1;
        let tok = tokens[prev];
        if tok.is_word() && prev > 0 && ctx.punct_is(prev - 1, b'@') {
            out.push(annotation(ctx, prev - 1, prev));
            idx = prev - 1;
        } else if tok.is_word() && is_one_of(tok.text(ctx.text), MODIFIERS) {
            idx = prev;
        } else if tok.is_punct(b')') {
            let Some(open) = ctx.scanner.match_token_back(prev, b'(', b')') else {
                break;
            };
            let annotated = open >= 2 && tokens[open - 1].is_word() && ctx.punct_is(open - 2, b'@');
            if !annotated {
                break;
            }
            out.push(annotation(ctx, open - 2, open - 1));
            idx = open - 2;
        } else {
            break;
        }
    }
    out.reverse();
    out
}

fn annotation(ctx: &SourceContext, at_idx: usize, name_idx: usize) -> Annotation {
    let offset = ctx.tokens()[at_idx].start;
    Annotation {
        name: ctx.token_text(name_idx).unwrap_or_default().to_string(),
        position: ctx.position(offset),
        offset,
    }
}

/// Split on commas outside angle brackets, then `type name` per piece.
pub(crate) fn parse_parameters(params: &str) -> Vec<Parameter> {
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in params.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                pieces.push(&params[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&params[start..]);

    pieces.into_iter().filter_map(parse_parameter).collect()
}

fn parse_parameter(piece: &str) -> Option<Parameter> {
    let piece = piece.trim();
    let piece = match piece.get(..6) {
        Some(p) if p.eq_ignore_ascii_case("final ") => piece[6..].trim_start(),
        _ => piece,
    };
    let split = piece.rfind(|c: char| c.is_whitespace())?;
    let name = piece[split..].trim();
    let type_text = piece[..split].split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() || type_text.is_empty() {
        return None;
    }
    let (base_type, is_collection) = classify_type(&type_text);
    Some(Parameter {
        name: name.to_string(),
        is_sobject: is_sobject_type(&base_type),
        type_text,
        base_type,
        is_collection,
    })
}

/// Element type of `List<T>`/`Set<T>`/`T[]`, value type of `Map<K, V>`.
fn classify_type(type_text: &str) -> (String, bool) {
    let compact: String = type_text.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(element) = compact.strip_suffix("[]") {
        return (element.to_string(), true);
    }
    if let (Some(lt), true) = (compact.find('<'), compact.ends_with('>')) {
        let outer = &compact[..lt];
        let args = &compact[lt + 1..compact.len() - 1];
        if outer.eq_ignore_ascii_case("list") || outer.eq_ignore_ascii_case("set") {
            return (args.to_string(), true);
        }
        if outer.eq_ignore_ascii_case("map") {
            let mut depth = 0i32;
            for (i, c) in args.char_indices() {
                match c {
                    '<' => depth += 1,
                    '>' => depth -= 1,
                    ',' if depth == 0 => return (args[i + 1..].to_string(), true),
                    _ => {}
                }
            }
        }
    }
    (compact, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::calls::extract_calls;
    use crate::extractor::dml::extract_data_operations;
    use crate::extractor::queries::extract_queries;

    fn methods(src: &str) -> Vec<Method> {
        let ctx = SourceContext::new(src);
        let queries = extract_queries(&ctx);
        let dml = extract_data_operations(&ctx, &queries);
        let calls = extract_calls(&ctx, &queries, None);
        extract_methods(&ctx, &queries, &dml, &calls)
    }

    #[test]
    fn finds_methods_with_generic_returns() {
        let m = methods(
            "public class S {\n\
             public static Map<Id, List<Account>> group(Set<Id> ids) {\n\
               return null;\n\
             }\n\
             private void touch() { }\n\
             }",
        );
        let names: Vec<&str> = m.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["group", "touch"]);
        assert_eq!(m[0].body.start.line, 1);
        assert_eq!(m[0].body.end.line, 3);
    }

    #[test]
    fn modifier_word_ending_a_comment_does_not_hide_the_signature() {
        let m = methods(
            "public class A {\n  // keep this private\n  void save(Account acc) {\n    update acc;\n  }\n}",
        );
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].name, "save");
        assert_eq!(m[0].signature.start.line, 2);
        assert_eq!(m[0].data_operations.len(), 1);
    }

    #[test]
    fn control_flow_is_not_a_method() {
        let m = methods("void run() {\n if (a) { } else if (b) { }\n for (X x : xs) { }\n}");
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].name, "run");
    }

    #[test]
    fn body_facts_are_scoped_to_the_method() {
        let m = methods(
            "void a() { List<Account> r = [SELECT Id FROM Account]; b(); }\n\
             void b() { update x; a(); a(); }",
        );
        assert_eq!(m[0].queries.len(), 1);
        assert!(m[0].data_operations.is_empty());
        assert_eq!(m[0].callee_names, vec!["b"]);
        assert!(m[1].queries.is_empty());
        assert_eq!(m[1].data_operations.len(), 1);
        assert_eq!(m[1].callee_names, vec!["a"]);
    }

    #[test]
    fn braces_in_strings_do_not_end_the_body() {
        let m = methods("void a() { String s = '}'; /* } */ x(); }\nvoid b() { }");
        assert_eq!(m.len(), 2);
        assert_eq!(m[0].callee_names, vec!["x"]);
    }

    #[test]
    fn annotations_span_lines_and_stop_at_other_code() {
        let m = methods(
            "Integer x = 1;\n\
             @InvocableMethod(\n  label='Run'\n)\n\
             @TestVisible\n\
             public static void run(List<Id> ids) { }",
        );
        let names: Vec<&str> = m[0].annotations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["InvocableMethod", "TestVisible"]);
        assert_eq!(m[0].annotations[0].position.line, 1);
    }

    #[test]
    fn parameters_split_on_top_level_commas() {
        let p = parse_parameters("Map<Id, Account> byId, final List<Contact> cs, Lead[] leads, String s");
        assert_eq!(p.len(), 4);
        assert_eq!(p[0].base_type, "Account");
        assert!(p[0].is_collection && p[0].is_sobject && !p[0].is_list());
        assert_eq!(p[1].name, "cs");
        assert!(p[1].is_list());
        assert_eq!(p[2].base_type, "Lead");
        assert!(p[2].is_list());
        assert!(!p[3].is_collection && !p[3].is_sobject);
    }

    #[test]
    fn empty_parameter_list() {
        assert!(parse_parameters("").is_empty());
        assert!(parse_parameters("   ").is_empty());
    }

    #[test]
    fn constructor_counts_as_a_method() {
        let m = methods("public class C {\n public C(Account a) { update a; }\n}");
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].name, "C");
        assert_eq!(m[0].parameters[0].name, "a");
    }
}
