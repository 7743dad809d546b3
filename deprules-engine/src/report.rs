use std::collections::BTreeSet;
use std::fmt;

use deprules_rules::{Cardinality, Role};
use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

pub const EDGE_NOT_PERMITTED: &str = "attachment not permitted by grammar";

/// An edge whose class pair is not in the attachment relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeViolation {
    pub source: NodeId,
    pub target: NodeId,
    pub source_class: String,
    pub target_class: String,
    pub reason: String,
}

impl EdgeViolation {
    pub fn not_permitted(
        source: NodeId,
        target: NodeId,
        source_class: impl Into<String>,
        target_class: impl Into<String>,
    ) -> Self {
        Self {
            source,
            target,
            source_class: source_class.into(),
            target_class: target_class.into(),
            reason: EDGE_NOT_PERMITTED.to_string(),
        }
    }
}

impl fmt::Display for EdgeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) -> {} ({}): {}",
            self.source, self.source_class, self.target, self.target_class, self.reason
        )
    }
}

/// A node whose attachment count for a role falls outside the declared range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardinalityViolation {
    pub node: NodeId,
    pub class: String,
    pub role: Role,
    pub actual: u32,
    pub expected: Cardinality,
}

impl fmt::Display for CardinalityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) as {}: has {}, expected {}",
            self.node, self.class, self.role, self.actual, self.expected
        )
    }
}

/// A node labelled with a class the grammar's universe does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownClassViolation {
    pub node: NodeId,
    pub class: String,
}

impl fmt::Display for UnknownClassViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: class `{}` is not in the grammar", self.node, self.class)
    }
}

/// Outcome of validating an attachment graph.
///
/// Edge violations are ordered by (source, target). Cardinality violations
/// are ordered by node, then role: aggregate source, aggregate target,
/// scoped source roles, scoped target roles, each by class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub edge_violations: Vec<EdgeViolation>,
    pub cardinality_violations: Vec<CardinalityViolation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_classes: Vec<UnknownClassViolation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.violation_count() == 0
    }

    pub fn violation_count(&self) -> usize {
        self.edge_violations.len() + self.cardinality_violations.len() + self.unknown_classes.len()
    }

    /// Every node involved in at least one violation, for highlighting.
    pub fn offending_nodes(&self) -> BTreeSet<NodeId> {
        let mut nodes = BTreeSet::new();
        for violation in &self.edge_violations {
            nodes.insert(violation.source);
            nodes.insert(violation.target);
        }
        nodes.extend(self.cardinality_violations.iter().map(|v| v.node));
        nodes.extend(self.unknown_classes.iter().map(|v| v.node));
        nodes
    }

    pub fn offending_edges(&self) -> BTreeSet<(NodeId, NodeId)> {
        self.edge_violations
            .iter()
            .map(|violation| (violation.source, violation.target))
            .collect()
    }

    /// Human-readable lines, one per violation.
    pub fn messages(&self) -> Vec<String> {
        self.unknown_classes
            .iter()
            .map(ToString::to_string)
            .chain(self.edge_violations.iter().map(ToString::to_string))
            .chain(self.cardinality_violations.iter().map(ToString::to_string))
            .collect()
    }
}
