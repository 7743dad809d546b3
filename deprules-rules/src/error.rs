use std::path::PathBuf;

use thiserror::Error;

use crate::cardinality::Cardinality;
use crate::grammar::Role;
use crate::rule::Side;

/// Errors returned when loading, parsing or compiling a grammar.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("grammar path does not exist: {0}")]
    MissingPath(String),
    #[error("failed to read grammar input from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("grammar source has {} syntax error(s); first: {}", .0.len(), first(.0))]
    Syntax(Vec<ParseError>),
    #[error("grammar failed to compile with {} error(s); first: {}", .0.len(), first(.0))]
    Compile(Vec<CompileError>),
    #[error("no grammar registered under name: {0}")]
    NotFound(String),
}

impl GrammarError {
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GrammarError::Io {
            path: path.into().display().to_string(),
            source,
        }
    }

    /// Syntax errors carried by this error, if any.
    pub fn syntax_errors(&self) -> &[ParseError] {
        match self {
            GrammarError::Syntax(errors) => errors,
            _ => &[],
        }
    }

    /// Compile errors carried by this error, if any.
    pub fn compile_errors(&self) -> &[CompileError] {
        match self {
            GrammarError::Compile(errors) => errors,
            _ => &[],
        }
    }
}

fn first<T: ToString>(items: &[T]) -> String {
    items.first().map(ToString::to_string).unwrap_or_default()
}

/// A malformed grammar line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind} in `{text}`")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// The offending line, trimmed.
    pub text: String,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("missing `|` separator")]
    MissingSeparator,
    #[error("more than one `|` separator")]
    ExtraSeparator,
    #[error("rule has no patterns on either side")]
    EmptyRule,
    #[error("unmatched brace in token `{token}`")]
    UnmatchedBrace { token: String },
    #[error("unexpected text after cardinality in token `{token}`")]
    TrailingText { token: String },
    #[error("cardinality without a class pattern in token `{token}`")]
    EmptyPattern { token: String },
    #[error("invalid bound `{value}` in token `{token}`")]
    InvalidBound { token: String, value: String },
    #[error("malformed cardinality in token `{token}`")]
    MalformedCardinality { token: String },
    #[error("empty cardinality range {{{min},{max}}} in token `{token}`")]
    EmptyRange { token: String, min: u32, max: u32 },
}

/// A grammar that parsed but cannot be turned into a consistent model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("line {line}: {side} pattern `{pattern}` matches no known class")]
    UnmatchedPattern {
        line: usize,
        side: Side,
        pattern: String,
    },
    #[error(
        "conflicting cardinality for `{class}` as {role}: {existing} (line(s) {}) and {incoming} (line {incoming_line}) do not overlap",
        join_lines(.existing_lines)
    )]
    ConflictingCardinality {
        class: String,
        role: Role,
        existing: Cardinality,
        existing_lines: Vec<usize>,
        incoming: Cardinality,
        incoming_line: usize,
    },
    #[error("line {line}: `{class}` is bounded {bound} as {role} but no rule lets it attach that way")]
    OrphanCardinality {
        class: String,
        role: Role,
        bound: Cardinality,
        line: usize,
    },
}

fn join_lines(lines: &[usize]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
