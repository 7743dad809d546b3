use std::fmt;

use serde::{Deserialize, Serialize};

/// Wildcard character accepted in class patterns.
pub const WILDCARD: char = '*';

/// Class name or `*` glob over class names (`notehead-*`, `*_flag`, `*brevis*`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ClassPattern(String);

impl ClassPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn has_wildcard(&self) -> bool {
        self.0.contains(WILDCARD)
    }

    /// Whether `name` is denoted by this pattern.
    ///
    /// A literal pattern matches only itself. With wildcards, the text before
    /// the first `*` must be a prefix, the text after the last `*` a suffix,
    /// and the pieces in between must appear in order without overlapping.
    pub fn matches(&self, name: &str) -> bool {
        if !self.has_wildcard() {
            return self.0 == name;
        }

        let segments: Vec<&str> = self.0.split(WILDCARD).collect();
        let (first, rest) = match segments.split_first() {
            Some(split) => split,
            None => return false,
        };
        let (last, middle) = match rest.split_last() {
            Some(split) => split,
            None => return false,
        };

        let Some(mut remaining) = name.strip_prefix(first) else {
            return false;
        };
        for piece in middle.iter().filter(|piece| !piece.is_empty()) {
            match remaining.find(piece) {
                Some(pos) => remaining = &remaining[pos + piece.len()..],
                None => return false,
            }
        }
        remaining.ends_with(last)
    }
}

impl fmt::Display for ClassPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassPattern {
    fn from(value: &str) -> Self {
        ClassPattern::new(value)
    }
}

impl From<String> for ClassPattern {
    fn from(value: String) -> Self {
        ClassPattern::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("stem", "stem", true ; "literal")]
    #[test_case("stem", "stems", false ; "literal is exact")]
    #[test_case("notehead-*", "notehead-full", true ; "prefix")]
    #[test_case("notehead-*", "grace-notehead-full", false ; "prefix is anchored")]
    #[test_case("*_flag", "8th_flag", true ; "suffix")]
    #[test_case("*_flag", "8th_flag_up", false ; "suffix is anchored")]
    #[test_case("*brevis*", "semibrevis_rest", true ; "interior")]
    #[test_case("grace-*-full", "grace-notehead-full", true ; "prefix and suffix")]
    #[test_case("ab*ba", "aba", false ; "prefix and suffix may not overlap")]
    #[test_case("*", "anything", true ; "bare wildcard")]
    #[test_case("a*b*c", "axxbyyc", true ; "ordered interior pieces")]
    #[test_case("a*c*b", "axxbyyc", false ; "interior pieces out of order")]
    fn glob_matching(pattern: &str, name: &str, expected: bool) {
        assert_eq!(ClassPattern::from(pattern).matches(name), expected);
    }
}
