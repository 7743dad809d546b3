use std::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive range on the number of attachments a symbol may have in some role.
///
/// `max == None` means unbounded above. The unconstrained default is `{0,}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cardinality {
    pub min: u32,
    pub max: Option<u32>,
}

impl Cardinality {
    /// No constraint in either direction.
    pub const UNBOUNDED: Cardinality = Cardinality { min: 0, max: None };

    /// Returns `None` when `min > max`.
    pub fn new(min: u32, max: Option<u32>) -> Option<Self> {
        match max {
            Some(max) if min > max => None,
            _ => Some(Self { min, max }),
        }
    }

    pub fn exactly(count: u32) -> Self {
        Self {
            min: count,
            max: Some(count),
        }
    }

    pub fn at_least(min: u32) -> Self {
        Self { min, max: None }
    }

    pub fn at_most(max: u32) -> Self {
        Self { min: 0, max: Some(max) }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min == 0 && self.max.is_none()
    }

    /// Whether `count` satisfies the range.
    pub fn contains(&self, count: u32) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }

    /// Tightest range satisfying both; `None` if they do not overlap.
    pub fn intersect(&self, other: &Cardinality) -> Option<Cardinality> {
        let min = self.min.max(other.min);
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        };
        Cardinality::new(min, max)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality::UNBOUNDED
    }
}

/// Renders in grammar surface syntax: `{n}`, `{lo,}` or `{lo,hi}`.
impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{{{}}}", max),
            Some(max) => write!(f, "{{{},{}}}", self.min, max),
            None => write!(f, "{{{},}}", self.min),
        }
    }
}
