use std::fs;
use std::path::Path;

use tracing::debug;

use crate::cardinality::Cardinality;
use crate::error::{GrammarError, ParseError, ParseErrorKind};
use crate::pattern::ClassPattern;
use crate::rule::{PatternToken, RawRule, RuleBody};

/// Separator between the left- and right-hand side of a rule line.
pub const SEPARATOR: char = '|';
/// Full-line comment marker.
pub const COMMENT: char = '#';

/// Reads and parses a grammar file.
pub fn load_grammar(path: impl AsRef<Path>) -> Result<Vec<RawRule>, GrammarError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(GrammarError::MissingPath(path.display().to_string()));
    }
    let raw = fs::read_to_string(path).map_err(|err| GrammarError::from_io(path, err))?;
    let rules = parse_grammar(&raw)?;
    debug!(path = %path.display(), rules = rules.len(), "loaded grammar file");
    Ok(rules)
}

/// Parses grammar text into raw rules, in source order.
///
/// Every malformed line is reported, not just the first one.
pub fn parse_grammar(source: &str) -> Result<Vec<RawRule>, GrammarError> {
    let mut rules = Vec::new();
    let mut errors = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line_no = index + 1;
        match parse_line(line) {
            Ok(Some(body)) => rules.push(RawRule {
                line: line_no,
                body,
            }),
            Ok(None) => {}
            Err(kind) => errors.push(ParseError {
                line: line_no,
                text: line.trim().to_string(),
                kind,
            }),
        }
    }

    if errors.is_empty() {
        Ok(rules)
    } else {
        Err(GrammarError::Syntax(errors))
    }
}

/// Parses one line. Comments and blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<RuleBody>, ParseErrorKind> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT) {
        return Ok(None);
    }

    let Some((lhs, rhs)) = trimmed.split_once(SEPARATOR) else {
        return Err(ParseErrorKind::MissingSeparator);
    };
    if rhs.contains(SEPARATOR) {
        return Err(ParseErrorKind::ExtraSeparator);
    }

    let sources = parse_side(lhs)?;
    let targets = parse_side(rhs)?;

    let body = match (sources.is_empty(), targets.is_empty()) {
        (true, true) => return Err(ParseErrorKind::EmptyRule),
        (false, false) => RuleBody::Attachment { sources, targets },
        (false, true) => RuleBody::SourceAggregate { sources },
        (true, false) => RuleBody::TargetAggregate { targets },
    };
    Ok(Some(body))
}

fn parse_side(side: &str) -> Result<Vec<PatternToken>, ParseErrorKind> {
    side.split_whitespace().map(parse_token).collect()
}

/// Parses one token: a class pattern with an optional `{...}` suffix.
///
/// Accepted suffixes are `{n}`, `{lo,}`, `{,hi}`, `{lo,hi}` and `{,}`.
pub fn parse_token(token: &str) -> Result<PatternToken, ParseErrorKind> {
    let Some(open) = token.find('{') else {
        if token.contains('}') {
            return Err(ParseErrorKind::UnmatchedBrace {
                token: token.to_string(),
            });
        }
        return Ok(PatternToken::new(token));
    };

    let pattern = &token[..open];
    let rest = &token[open + 1..];
    let Some(close) = rest.find('}') else {
        return Err(ParseErrorKind::UnmatchedBrace {
            token: token.to_string(),
        });
    };
    let range = &rest[..close];
    let trailing = &rest[close + 1..];

    if pattern.is_empty() {
        return Err(ParseErrorKind::EmptyPattern {
            token: token.to_string(),
        });
    }
    if pattern.contains('}') || range.contains('{') {
        return Err(ParseErrorKind::UnmatchedBrace {
            token: token.to_string(),
        });
    }
    if !trailing.is_empty() {
        return Err(ParseErrorKind::TrailingText {
            token: token.to_string(),
        });
    }

    let cardinality = parse_cardinality(token, range)?;
    Ok(PatternToken::new(ClassPattern::new(pattern)).with_cardinality(cardinality))
}

fn parse_cardinality(token: &str, range: &str) -> Result<Cardinality, ParseErrorKind> {
    let bound = |value: &str| -> Result<u32, ParseErrorKind> {
        value.parse().map_err(|_| ParseErrorKind::InvalidBound {
            token: token.to_string(),
            value: value.to_string(),
        })
    };

    let parts: Vec<&str> = range.split(',').collect();
    let (min, max) = match parts.as_slice() {
        [exact] => {
            let exact = bound(*exact)?;
            (exact, Some(exact))
        }
        [low, high] => {
            let min = if low.is_empty() { 0 } else { bound(*low)? };
            let max = if high.is_empty() { None } else { Some(bound(*high)?) };
            (min, max)
        }
        _ => {
            return Err(ParseErrorKind::MalformedCardinality {
                token: token.to_string(),
            })
        }
    };

    Cardinality::new(min, max).ok_or_else(|| ParseErrorKind::EmptyRange {
        token: token.to_string(),
        min,
        max: max.unwrap_or(min),
    })
}

/// Renders rules back to grammar text, one canonical line per rule.
pub fn render_rules(rules: &[RawRule]) -> String {
    let mut out = String::new();
    for rule in rules {
        out.push_str(&rule.body.to_string());
        out.push('\n');
    }
    out
}
