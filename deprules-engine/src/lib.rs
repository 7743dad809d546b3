//! Validation of notation attachment graphs against compiled dependency grammars.
//!
//! [`GraphValidator`] checks a whole graph in two linear passes.
//! [`IncrementalValidator`] keeps a report current while the editor mutates
//! the graph, recomputing only what each [`ChangeSet`] touched.

pub mod error;
pub mod graph;
pub mod incremental;
pub mod report;
pub mod validator;

use deprules_rules::Grammar;

pub use error::GraphError;
pub use graph::{AttachmentGraph, ChangeSet, GraphDocument, NodeId, NodeRecord};
pub use incremental::IncrementalValidator;
pub use report::{
    CardinalityViolation, EdgeViolation, UnknownClassViolation, ValidationReport,
    EDGE_NOT_PERMITTED,
};
pub use validator::GraphValidator;

/// Validates `graph` against `grammar` in full.
pub fn validate(grammar: &Grammar, graph: &AttachmentGraph) -> ValidationReport {
    GraphValidator::new(grammar).validate(graph)
}
