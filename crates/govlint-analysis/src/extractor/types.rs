//! Structural facts extracted from one Apex source file.

use serde::{Deserialize, Serialize};

use crate::scanner::{Position, Range, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    For,
    ForEach,
    While,
    DoWhile,
}

impl LoopKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::For => "for",
            Self::ForEach => "for-each",
            Self::While => "while",
            Self::DoWhile => "do-while",
        }
    }
}

/// A brace-delimited loop, from its keyword to the closing brace of its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loop {
    pub kind: LoopKind,
    pub range: Range,
    pub span: Span,
    /// Parenthesized header, when the loop has one.
    pub header: Option<Span>,
}

impl Loop {
    /// Whether a fact at `offset` on `line` executes once per iteration.
    /// The iterable of a for-each header is evaluated once, so facts there
    /// are not inside the loop.
    pub fn contains(&self, offset: usize, line: u32) -> bool {
        if !self.range.contains_line(line) {
            return false;
        }
        match (self.kind, self.header) {
            (LoopKind::ForEach, Some(header)) => !header.contains(offset),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// `[SELECT ... FROM ...]`
    Inline,
    /// `Database.query(...)` and friends; text cannot be inspected.
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub kind: QueryKind,
    /// Query text between the brackets. `None` for dynamic queries.
    pub text: Option<String>,
    pub range: Range,
    pub span: Span,
    /// Dynamic queries are always `true`; they cannot be verified.
    pub has_limit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DmlVerb {
    Insert,
    Update,
    Delete,
    Upsert,
    Merge,
    Undelete,
}

impl DmlVerb {
    pub const ALL: [DmlVerb; 6] = [
        Self::Insert,
        Self::Update,
        Self::Delete,
        Self::Upsert,
        Self::Merge,
        Self::Undelete,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Upsert => "upsert",
            Self::Merge => "merge",
            Self::Undelete => "undelete",
        }
    }

    pub fn parse(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(word))
    }

    /// Verbs that re-fire insert/update triggers on the same object.
    pub fn writes_records(&self) -> bool {
        matches!(self, Self::Insert | Self::Update | Self::Upsert)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DmlForm {
    /// `update records;`
    Statement,
    /// `Database.update(records, false);`
    DatabaseMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataOperation {
    pub verb: DmlVerb,
    pub form: DmlForm,
    pub range: Range,
    pub span: Span,
    /// Leading identifier of the operand expression.
    pub target_variable: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_text: String,
    /// Element type for `List<T>`/`Set<T>`/`T[]`, value type for `Map<K, V>`,
    /// otherwise the declared type.
    pub base_type: String,
    pub is_collection: bool,
    pub is_sobject: bool,
}

impl Parameter {
    /// `List<T>` or `T[]`; sets and maps do not count.
    pub fn is_list(&self) -> bool {
        if !self.is_collection {
            return false;
        }
        let ty = self.type_text.trim();
        ty.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("list")) || ty.ends_with(']')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    pub position: Position,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub signature: Range,
    pub signature_span: Span,
    pub body: Range,
    pub body_span: Span,
    pub parameters: Vec<Parameter>,
    pub annotations: Vec<Annotation>,
    pub queries: Vec<Query>,
    pub data_operations: Vec<DataOperation>,
    /// Distinct callees in first-occurrence order.
    pub callee_names: Vec<String>,
}

impl Method {
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations
            .iter()
            .any(|a| a.name.eq_ignore_ascii_case(name))
    }
}

/// A call site. The callee may not exist in this file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCall {
    pub name: String,
    pub position: Position,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardcodedId {
    pub value: String,
    pub range: Range,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Identifier,
    RelationshipPath,
    QueryClause,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldReference {
    pub name: String,
    pub object: Option<String>,
    pub position: Position,
    pub span: Span,
    pub source: FieldSource,
}

impl FieldReference {
    pub fn normalized_name(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

/// Which recursion-guard idiom matched a trigger body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardKind {
    StaticFlagCheck,
    ProcessedSetCheck,
    BooleanFieldCheck,
    PlatformReentrancyFlag,
    HandlerClass,
    EarlyReturnThenFlag,
    FlagAssignment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,
    pub object: String,
    /// Normalized lifecycle events, e.g. `after update`.
    pub events: Vec<String>,
    pub body: Range,
    pub body_span: Span,
    pub data_operations: Vec<DataOperation>,
    pub has_recursion_guard: bool,
    pub guard: Option<GuardKind>,
}

impl Trigger {
    pub fn has_after_event(&self) -> bool {
        self.events.iter().any(|e| e.starts_with("after"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    If,
    For,
    While,
    DoWhile,
    Try,
    Switch,
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::If => "if",
            Self::For => "for",
            Self::While => "while",
            Self::DoWhile => "do-while",
            Self::Try => "try",
            Self::Switch => "switch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepNesting {
    pub depth: u32,
    pub position: Position,
    pub span: Span,
    pub kind: BlockKind,
}

/// Everything the extractor knows about one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFile {
    pub class_name: Option<String>,
    pub is_test_class: bool,
    pub is_trigger: bool,
    pub loops: Vec<Loop>,
    pub queries: Vec<Query>,
    pub data_operations: Vec<DataOperation>,
    pub methods: Vec<Method>,
    pub method_calls: Vec<MethodCall>,
    pub hardcoded_ids: Vec<HardcodedId>,
    pub field_references: Vec<FieldReference>,
    pub trigger: Option<Trigger>,
    pub deep_nesting: Vec<DeepNesting>,
}

impl ParsedFile {
    /// The innermost method whose body contains `offset`.
    pub fn method_at(&self, offset: usize) -> Option<&Method> {
        self.methods
            .iter()
            .filter(|m| m.body_span.contains(offset))
            .min_by_key(|m| m.body_span.len())
    }
}
