use std::collections::BTreeMap;

use deprules_rules::Grammar;
use tracing::debug;

use crate::graph::{AttachmentGraph, ChangeSet, NodeId};
use crate::report::{CardinalityViolation, EdgeViolation, UnknownClassViolation, ValidationReport};
use crate::validator::{check_class, check_edge, check_node, GraphValidator, NodeCounts};

#[derive(Debug, Clone, Default)]
struct NodeFindings {
    unknown: Option<UnknownClassViolation>,
    cardinality: Vec<CardinalityViolation>,
}

impl NodeFindings {
    fn is_empty(&self) -> bool {
        self.unknown.is_none() && self.cardinality.is_empty()
    }
}

/// Keeps a validation report current while the editor mutates the graph.
///
/// Violations are cached per edge and per node. After each mutation only
/// the entries named by its [`ChangeSet`] are recomputed, so the cost is
/// proportional to the touched nodes' degrees. [`Self::report`] always
/// equals a full [`GraphValidator::validate`] of the same graph state.
#[derive(Debug, Clone)]
pub struct IncrementalValidator<'g> {
    grammar: &'g Grammar,
    edges: BTreeMap<(NodeId, NodeId), EdgeViolation>,
    nodes: BTreeMap<NodeId, NodeFindings>,
}

impl<'g> IncrementalValidator<'g> {
    /// Seeds the cache with a full validation of `graph`.
    pub fn new(grammar: &'g Grammar, graph: &AttachmentGraph) -> Self {
        let mut validator = Self {
            grammar,
            edges: BTreeMap::new(),
            nodes: BTreeMap::new(),
        };
        validator.reset(graph);
        validator
    }

    /// Discards the cache and revalidates the whole graph.
    pub fn reset(&mut self, graph: &AttachmentGraph) {
        let report = GraphValidator::new(self.grammar).validate(graph);
        self.edges = report
            .edge_violations
            .into_iter()
            .map(|violation| ((violation.source, violation.target), violation))
            .collect();
        self.nodes.clear();
        for violation in report.cardinality_violations {
            self.nodes
                .entry(violation.node)
                .or_default()
                .cardinality
                .push(violation);
        }
        for violation in report.unknown_classes {
            let node = violation.node;
            self.nodes.entry(node).or_default().unknown = Some(violation);
        }
    }

    /// Recomputes the cached findings for everything in `changes`.
    ///
    /// `graph` must be the state right after the mutations that produced
    /// `changes`.
    pub fn apply(&mut self, graph: &AttachmentGraph, changes: &ChangeSet) {
        for (source, target) in changes.edges() {
            self.edges.remove(&(source, target));
            if !graph.contains_edge(source, target) {
                continue;
            }
            if let Some(violation) = check_edge(self.grammar, graph, source, target) {
                self.edges.insert((source, target), violation);
            }
        }

        for node in changes.nodes() {
            self.nodes.remove(&node);
            let Some(class) = graph.class(node) else {
                continue;
            };
            let mut findings = NodeFindings::default();
            match check_class(self.grammar, node, class) {
                Ok(class) => {
                    let counts = NodeCounts::of(self.grammar, graph, node);
                    check_node(self.grammar, node, class, &counts, &mut findings.cardinality);
                }
                Err(unknown) => findings.unknown = Some(unknown),
            }
            if !findings.is_empty() {
                self.nodes.insert(node, findings);
            }
        }

        debug!(
            nodes = changes.nodes().count(),
            edges = changes.edges().count(),
            "revalidated changed region"
        );
    }

    pub fn is_valid(&self) -> bool {
        self.edges.is_empty() && self.nodes.is_empty()
    }

    /// Current report, ordered exactly as a full validation orders it.
    pub fn report(&self) -> ValidationReport {
        ValidationReport {
            edge_violations: self.edges.values().cloned().collect(),
            cardinality_violations: self
                .nodes
                .values()
                .flat_map(|findings| findings.cardinality.iter().cloned())
                .collect(),
            unknown_classes: self
                .nodes
                .values()
                .filter_map(|findings| findings.unknown.clone())
                .collect(),
        }
    }
}
