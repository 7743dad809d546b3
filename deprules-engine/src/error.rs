use deprules_core::CoreError;
use thiserror::Error;

use crate::graph::NodeId;

/// Structural misuse of the attachment graph API.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),
    #[error("node {0} not found")]
    MissingNode(NodeId),
    #[error("edge {0} -> {1} not found")]
    MissingEdge(NodeId, NodeId),
    #[error("invalid graph document: {0}")]
    Document(#[from] CoreError),
}
