use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use deprules_core::serde_utils::from_json_str;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Identity of a symbol instance in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        NodeId(value)
    }
}

/// Nodes and edges touched by a graph mutation.
///
/// Feed it to [`crate::IncrementalValidator::apply`] to refresh a cached
/// report. Change sets from several mutations can be merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    nodes: BTreeSet<NodeId>,
    edges: BTreeSet<(NodeId, NodeId)>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch_node(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    /// Marks the edge and both of its endpoints.
    pub fn touch_edge(&mut self, source: NodeId, target: NodeId) {
        self.edges.insert((source, target));
        self.nodes.insert(source);
        self.nodes.insert(target);
    }

    pub fn merge(&mut self, other: ChangeSet) {
        self.nodes.extend(other.nodes);
        self.edges.extend(other.edges);
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Directed attachment graph over classified symbol instances.
///
/// Owned and mutated by the editor; validators only read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentGraph {
    classes: BTreeMap<NodeId, String>,
    outgoing: BTreeMap<NodeId, BTreeSet<NodeId>>,
    incoming: BTreeMap<NodeId, BTreeSet<NodeId>>,
    edge_count: usize,
}

impl AttachmentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(
        &mut self,
        id: impl Into<NodeId>,
        class: impl Into<String>,
    ) -> Result<ChangeSet, GraphError> {
        let id = id.into();
        if self.classes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.classes.insert(id, class.into());
        self.outgoing.insert(id, BTreeSet::new());
        self.incoming.insert(id, BTreeSet::new());

        let mut changes = ChangeSet::new();
        changes.touch_node(id);
        Ok(changes)
    }

    /// Relabels a node. Its neighbours and incident edges are touched too,
    /// since their per-class counts and edge checks depend on this class.
    pub fn set_class(
        &mut self,
        id: impl Into<NodeId>,
        class: impl Into<String>,
    ) -> Result<ChangeSet, GraphError> {
        let id = id.into();
        let slot = self.classes.get_mut(&id).ok_or(GraphError::MissingNode(id))?;
        *slot = class.into();

        let mut changes = ChangeSet::new();
        changes.touch_node(id);
        self.touch_incident(id, &mut changes);
        Ok(changes)
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(&mut self, id: impl Into<NodeId>) -> Result<ChangeSet, GraphError> {
        let id = id.into();
        if !self.classes.contains_key(&id) {
            return Err(GraphError::MissingNode(id));
        }

        let mut changes = ChangeSet::new();
        changes.touch_node(id);
        self.touch_incident(id, &mut changes);

        for target in self.outgoing.remove(&id).unwrap_or_default() {
            if let Some(sources) = self.incoming.get_mut(&target) {
                sources.remove(&id);
            }
            self.edge_count -= 1;
        }
        for source in self.incoming.remove(&id).unwrap_or_default() {
            if let Some(targets) = self.outgoing.get_mut(&source) {
                targets.remove(&id);
            }
            self.edge_count -= 1;
        }
        self.classes.remove(&id);
        Ok(changes)
    }

    /// Adds `source -> target`. Adding an existing edge is a no-op.
    pub fn add_edge(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Result<ChangeSet, GraphError> {
        let (source, target) = (source.into(), target.into());
        self.require_node(source)?;
        self.require_node(target)?;

        let mut changes = ChangeSet::new();
        if self.outgoing.entry(source).or_default().insert(target) {
            self.incoming.entry(target).or_default().insert(source);
            self.edge_count += 1;
            changes.touch_edge(source, target);
        }
        Ok(changes)
    }

    pub fn remove_edge(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Result<ChangeSet, GraphError> {
        let (source, target) = (source.into(), target.into());
        let removed = self
            .outgoing
            .get_mut(&source)
            .map(|targets| targets.remove(&target))
            .unwrap_or(false);
        if !removed {
            return Err(GraphError::MissingEdge(source, target));
        }
        if let Some(sources) = self.incoming.get_mut(&target) {
            sources.remove(&source);
        }
        self.edge_count -= 1;

        let mut changes = ChangeSet::new();
        changes.touch_edge(source, target);
        Ok(changes)
    }

    pub fn class(&self, id: NodeId) -> Option<&str> {
        self.classes.get(&id).map(String::as_str)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.classes.contains_key(&id)
    }

    pub fn contains_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.outgoing
            .get(&source)
            .map_or(false, |targets| targets.contains(&target))
    }

    pub fn node_count(&self) -> usize {
        self.classes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.classes.iter().map(|(id, class)| (*id, class.as_str()))
    }

    /// Edges in (source, target) order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.outgoing
            .iter()
            .flat_map(|(source, targets)| targets.iter().map(move |target| (*source, *target)))
    }

    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing.get(&id).into_iter().flatten().copied()
    }

    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming.get(&id).into_iter().flatten().copied()
    }

    /// Builds a graph from its serialized document form.
    pub fn from_document(document: GraphDocument) -> Result<Self, GraphError> {
        let mut graph = AttachmentGraph::new();
        for node in document.nodes {
            graph.add_node(node.id, node.class)?;
        }
        for (source, target) in document.edges {
            graph.add_edge(source, target)?;
        }
        Ok(graph)
    }

    pub fn from_json(input: &str) -> Result<Self, GraphError> {
        let document: GraphDocument = from_json_str(input)?;
        Self::from_document(document)
    }

    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self
                .nodes()
                .map(|(id, class)| NodeRecord {
                    id,
                    class: class.to_string(),
                })
                .collect(),
            edges: self.edges().collect(),
        }
    }

    fn require_node(&self, id: NodeId) -> Result<(), GraphError> {
        if self.classes.contains_key(&id) {
            Ok(())
        } else {
            Err(GraphError::MissingNode(id))
        }
    }

    fn touch_incident(&self, id: NodeId, changes: &mut ChangeSet) {
        for target in self.outgoing(id) {
            changes.touch_edge(id, target);
        }
        for source in self.incoming(id) {
            changes.touch_edge(source, id);
        }
    }
}

/// Serialized graph as exchanged with the editor:
/// `{"nodes": [{"id": 1, "class": "stem"}], "edges": [[1, 2]]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<(NodeId, NodeId)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub class: String,
}
