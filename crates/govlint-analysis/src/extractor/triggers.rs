//! `trigger Name on Object (events) { ... }` and recursion-guard idioms.

use std::sync::OnceLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use regex::RegexSet;

use super::types::{DataOperation, GuardKind, Trigger};
use super::SourceContext;
use crate::scanner::Span;

/// How one recursion-guard idiom is recognized in the trigger body.
#[derive(Debug, Clone, Copy)]
enum IdiomMatcher {
    /// Case-insensitive literal substrings.
    Literal(&'static [&'static str]),
    /// A regular expression.
    Pattern(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct GuardIdiom {
    kind: GuardKind,
    matcher: IdiomMatcher,
}

/// Checked against the comment-free body; the first idiom in table order
/// that matches is the verdict.
const GUARD_IDIOMS: &[GuardIdiom] = &[
    GuardIdiom {
        kind: GuardKind::StaticFlagCheck,
        matcher: IdiomMatcher::Pattern(
            r"(?i)\bif\s*\(\s*!?\s*[A-Za-z_]\w*\s*\.\s*(?:is|has|already|first|run|skip|bypass|stop|prevent|disable)\w*\s*(?:\)|&&|\|\||==|!=)",
        ),
    },
    GuardIdiom {
        kind: GuardKind::ProcessedSetCheck,
        matcher: IdiomMatcher::Pattern(
            r"(?i)(?:\b\w*(?:processed|visited|handled|seen|executed|already)\w*\s*\.\s*contains(?:Key)?\s*\(|\b(?:isProcessed|isAlreadyProcessed|alreadyProcessed|hasProcessed|hasRun|shouldRun|canRun)\s*\()",
        ),
    },
    GuardIdiom {
        kind: GuardKind::BooleanFieldCheck,
        matcher: IdiomMatcher::Pattern(r"(?i)\b[A-Za-z_]\w*\s*\.\s*\w+\s*==\s*(?:true|false)\b"),
    },
    GuardIdiom {
        kind: GuardKind::PlatformReentrancyFlag,
        matcher: IdiomMatcher::Literal(&[
            "Trigger.isExecuting",
            "System.isFuture()",
            "System.isBatch()",
            "System.isQueueable()",
        ]),
    },
    GuardIdiom {
        kind: GuardKind::HandlerClass,
        matcher: IdiomMatcher::Pattern(
            r"(?i)\b\w*(?:TriggerHandler|Handler|Dispatcher)\b\s*(?:\.|\(|\s+\w+\s*=)",
        ),
    },
    GuardIdiom {
        kind: GuardKind::EarlyReturnThenFlag,
        matcher: IdiomMatcher::Pattern(
            r"(?is)\bif\s*\([^)]*\)\s*\{?\s*return\s*;.*?\b\w+(?:\.\w+)?\s*=\s*true\s*;",
        ),
    },
    GuardIdiom {
        kind: GuardKind::FlagAssignment,
        matcher: IdiomMatcher::Pattern(
            r"(?i)\b[A-Za-z_]\w*\s*\.\s*\w*(?:run|ran|executed|processed|fired|flag|running|recursi|bypass)\w*\s*=\s*(?:true|false)\s*;",
        ),
    },
];

/// The idiom table compiled into one `RegexSet` and one automaton.
struct CompiledGuards {
    patterns: Option<RegexSet>,
    /// Table index for each pattern in `patterns`.
    pattern_idioms: Vec<usize>,
    literals: Option<AhoCorasick>,
    /// Table index for each literal in `literals`.
    literal_idioms: Vec<usize>,
}

impl CompiledGuards {
    fn get() -> &'static CompiledGuards {
        static GUARDS: OnceLock<CompiledGuards> = OnceLock::new();
        GUARDS.get_or_init(Self::compile)
    }

    fn compile() -> Self {
        let mut patterns = Vec::new();
        let mut pattern_idioms = Vec::new();
        let mut literals = Vec::new();
        let mut literal_idioms = Vec::new();
        for (idx, idiom) in GUARD_IDIOMS.iter().enumerate() {
            match idiom.matcher {
                IdiomMatcher::Pattern(p) => {
                    patterns.push(p);
                    pattern_idioms.push(idx);
                }
                IdiomMatcher::Literal(words) => {
                    literals.extend_from_slice(words);
                    literal_idioms.extend(std::iter::repeat(idx).take(words.len()));
                }
            }
        }
        let patterns = match RegexSet::new(&patterns) {
            Ok(set) => Some(set),
            Err(e) => {
                tracing::error!(error = %e, "invalid recursion-guard pattern");
                None
            }
        };
        let literals = AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .build(&literals)
            .ok();
        Self {
            patterns,
            pattern_idioms,
            literals,
            literal_idioms,
        }
    }

    fn verdict(&self, body: &str) -> Option<GuardKind> {
        let mut hit: Option<usize> = None;
        let mut record = |idx: usize| hit = Some(hit.map_or(idx, |h| h.min(idx)));
        if let Some(set) = &self.patterns {
            for m in set.matches(body).iter() {
                record(self.pattern_idioms[m]);
            }
        }
        if let Some(ac) = &self.literals {
            for m in ac.find_iter(body) {
                record(self.literal_idioms[m.pattern().as_usize()]);
            }
        }
        hit.map(|idx| GUARD_IDIOMS[idx].kind)
    }
}

/// Recursion-guard idiom found in `body`, if any.
pub fn recursion_guard(body: &str) -> Option<GuardKind> {
    CompiledGuards::get().verdict(body)
}

/// The first trigger declaration in the file.
pub(crate) fn extract_trigger(ctx: &SourceContext, data_operations: &[DataOperation]) -> Option<Trigger> {
    let tokens = ctx.tokens();
    for i in 0..tokens.len() {
        if !ctx.word_is(i, "trigger") || ctx.follows_dot(i) {
            continue;
        }
        let shaped = tokens.get(i + 1).is_some_and(|t| t.is_word())
            && ctx.word_is(i + 2, "on")
            && tokens.get(i + 3).is_some_and(|t| t.is_word())
            && ctx.punct_is(i + 4, b'(');
        if !shaped {
            continue;
        }
        let Some(close) = ctx.scanner.match_token(i + 4, b'(', b')') else {
            continue;
        };
        if !ctx.punct_is(close + 1, b'{') {
            continue;
        }
        let open = tokens[close + 1].start;
        let Some(body_end) = ctx.scanner.match_brace(open) else {
            tracing::debug!(offset = open, "unmatched trigger body brace");
            continue;
        };

        let events = ctx.text[tokens[i + 4].end..tokens[close].start]
            .split(',')
            .map(|e| e.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        let body_span = Span::new(open, body_end + 1);
        let guard = recursion_guard(&ctx.scanner.without_comments(body_span));
        return Some(Trigger {
            name: ctx.token_text(i + 1)?.to_string(),
            object: ctx.token_text(i + 3)?.to_string(),
            events,
            body: ctx.range(body_span),
            body_span,
            data_operations: data_operations
                .iter()
                .filter(|d| body_span.encloses(d.span))
                .cloned()
                .collect(),
            has_recursion_guard: guard.is_some(),
            guard,
        });
    }
    None
}
