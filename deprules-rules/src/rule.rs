use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cardinality::Cardinality;
use crate::pattern::ClassPattern;

/// Which side of the `|` separator a token was written on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left-hand"),
            Side::Right => f.write_str("right-hand"),
        }
    }
}

/// One pattern occurrence, optionally carrying its own cardinality suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternToken {
    pub pattern: ClassPattern,
    /// `None` when the token was written without braces.
    #[serde(default)]
    pub cardinality: Option<Cardinality>,
}

impl PatternToken {
    pub fn new(pattern: impl Into<ClassPattern>) -> Self {
        Self {
            pattern: pattern.into(),
            cardinality: None,
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = Some(cardinality);
        self
    }
}

impl fmt::Display for PatternToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)?;
        if let Some(cardinality) = &self.cardinality {
            write!(f, "{}", cardinality)?;
        }
        Ok(())
    }
}

/// The three rule shapes of the grammar language.
///
/// An empty side is its own variant. It never expands to "every class".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum RuleBody {
    /// `sources | targets`: every source class may point to every target class.
    /// Token cardinalities are scoped to this relation.
    Attachment {
        sources: Vec<PatternToken>,
        targets: Vec<PatternToken>,
    },
    /// `sources |`: bounds on the total outgoing attachments of each class.
    SourceAggregate { sources: Vec<PatternToken> },
    /// `| targets`: bounds on the total incoming attachments of each class.
    TargetAggregate { targets: Vec<PatternToken> },
}

impl RuleBody {
    pub fn is_aggregate(&self) -> bool {
        !matches!(self, RuleBody::Attachment { .. })
    }
}

impl fmt::Display for RuleBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleBody::Attachment { sources, targets } => {
                write!(f, "{} | {}", join(sources), join(targets))
            }
            RuleBody::SourceAggregate { sources } => write!(f, "{} |", join(sources)),
            RuleBody::TargetAggregate { targets } => write!(f, "| {}", join(targets)),
        }
    }
}

/// A parsed grammar line together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRule {
    /// 1-based line number in the grammar source.
    pub line: usize,
    pub body: RuleBody,
}

impl fmt::Display for RawRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.body.fmt(f)
    }
}

fn join(tokens: &[PatternToken]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
