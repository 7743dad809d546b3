use std::collections::BTreeMap;

use deprules_rules::{ClassId, Grammar, RoleKey};
use tracing::debug;

use crate::graph::{AttachmentGraph, NodeId};
use crate::report::{CardinalityViolation, EdgeViolation, UnknownClassViolation, ValidationReport};

/// Attachment counts of one node, total and per neighbour class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NodeCounts {
    outgoing: u32,
    incoming: u32,
    outgoing_by_class: BTreeMap<ClassId, u32>,
    incoming_by_class: BTreeMap<ClassId, u32>,
}

impl NodeCounts {
    fn record_outgoing(&mut self, target: Option<ClassId>) {
        self.outgoing += 1;
        if let Some(class) = target {
            *self.outgoing_by_class.entry(class).or_insert(0) += 1;
        }
    }

    fn record_incoming(&mut self, source: Option<ClassId>) {
        self.incoming += 1;
        if let Some(class) = source {
            *self.incoming_by_class.entry(class).or_insert(0) += 1;
        }
    }

    /// Counts for a single node, read from the graph's adjacency.
    pub(crate) fn of(grammar: &Grammar, graph: &AttachmentGraph, node: NodeId) -> Self {
        let class_of = |id: NodeId| graph.class(id).and_then(|class| grammar.class_id(class));
        let mut counts = NodeCounts::default();
        for target in graph.outgoing(node) {
            counts.record_outgoing(class_of(target));
        }
        for source in graph.incoming(node) {
            counts.record_incoming(class_of(source));
        }
        counts
    }
}

/// Checks one edge against the attachment relation.
pub(crate) fn check_edge(
    grammar: &Grammar,
    graph: &AttachmentGraph,
    source: NodeId,
    target: NodeId,
) -> Option<EdgeViolation> {
    let source_class = graph.class(source)?;
    let target_class = graph.class(target)?;
    if grammar.is_allowed(source_class, target_class) {
        None
    } else {
        Some(EdgeViolation::not_permitted(
            source,
            target,
            source_class,
            target_class,
        ))
    }
}

/// Checks one node's counts against every bound declared for its class.
///
/// Aggregate roles are always checked, so a node with no attachments still
/// fails a `{1,}` bound. Scoped roles are only checked for neighbour classes
/// the node is actually attached to.
pub(crate) fn check_node(
    grammar: &Grammar,
    node: NodeId,
    class: ClassId,
    counts: &NodeCounts,
    violations: &mut Vec<CardinalityViolation>,
) {
    let mut check = |role: RoleKey, actual: u32| {
        let Some(expected) = grammar.bound(class, role) else {
            return;
        };
        if !expected.contains(actual) {
            violations.push(CardinalityViolation {
                node,
                class: grammar.universe().name(class).to_string(),
                role: grammar.role(role),
                actual,
                expected,
            });
        }
    };

    check(RoleKey::Source, counts.outgoing);
    check(RoleKey::Target, counts.incoming);
    for (neighbour, actual) in &counts.outgoing_by_class {
        check(RoleKey::SourceOf(*neighbour), *actual);
    }
    for (neighbour, actual) in &counts.incoming_by_class {
        check(RoleKey::TargetOf(*neighbour), *actual);
    }
}

/// Validates nodes whose class the grammar knows; reports the others.
pub(crate) fn check_class(
    grammar: &Grammar,
    node: NodeId,
    class: &str,
) -> Result<ClassId, UnknownClassViolation> {
    grammar.class_id(class).ok_or_else(|| UnknownClassViolation {
        node,
        class: class.to_string(),
    })
}

/// Full validation of attachment graphs against one compiled grammar.
#[derive(Debug, Clone, Copy)]
pub struct GraphValidator<'g> {
    grammar: &'g Grammar,
}

impl<'g> GraphValidator<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Validates the whole graph: one pass over edges to check the relation
    /// and accumulate counts, one pass over nodes to check the bounds.
    pub fn validate(&self, graph: &AttachmentGraph) -> ValidationReport {
        let grammar = self.grammar;
        let class_ids: BTreeMap<NodeId, Option<ClassId>> = graph
            .nodes()
            .map(|(node, class)| (node, grammar.class_id(class)))
            .collect();
        let mut counts: BTreeMap<NodeId, NodeCounts> = class_ids
            .keys()
            .map(|node| (*node, NodeCounts::default()))
            .collect();

        let mut report = ValidationReport::new();
        for (source, target) in graph.edges() {
            if let Some(violation) = check_edge(grammar, graph, source, target) {
                report.edge_violations.push(violation);
            }
            let source_class = class_ids.get(&source).copied().flatten();
            let target_class = class_ids.get(&target).copied().flatten();
            if let Some(counts) = counts.get_mut(&source) {
                counts.record_outgoing(target_class);
            }
            if let Some(counts) = counts.get_mut(&target) {
                counts.record_incoming(source_class);
            }
        }

        for (node, class) in graph.nodes() {
            match check_class(grammar, node, class) {
                Ok(class) => {
                    let node_counts = counts.get(&node).cloned().unwrap_or_default();
                    check_node(
                        grammar,
                        node,
                        class,
                        &node_counts,
                        &mut report.cardinality_violations,
                    );
                }
                Err(unknown) => report.unknown_classes.push(unknown),
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            edge_violations = report.edge_violations.len(),
            cardinality_violations = report.cardinality_violations.len(),
            unknown_classes = report.unknown_classes.len(),
            "validated attachment graph"
        );
        report
    }
}
