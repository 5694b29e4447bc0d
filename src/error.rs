//! Error types for the feature catalogue

use thiserror::Error;

use crate::model::{LinkKind, NodeKind};

/// Result type for catalogue operations
pub type Result<T> = std::result::Result<T, CatalogueError>;

/// Why a node needs an identifier it does not have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingIdentifierReason {
    /// The node lies on a cycle; without an identifier it can never become a stub
    Cycle,
    /// The node is linked from more than one place and will be emitted in full each time
    Shared,
}

impl std::fmt::Display for MissingIdentifierReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cycle => write!(f, "it lies on a cycle"),
            Self::Shared => write!(f, "it is linked from more than one node"),
        }
    }
}

/// Feature catalogue errors
#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("{kind} node #{index} has no identifier but needs one because {reason}")]
    MissingIdentifier {
        kind: NodeKind,
        index: usize,
        reason: MissingIdentifierReason,
    },

    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Unresolved reference: no full node carries identifier {0}")]
    UnresolvedReference(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Unknown node key in graph file: {0}")]
    UnknownKey(String),

    #[error("Invalid link {kind:?} from {from} to {to}: {reason}")]
    InvalidLink {
        kind: LinkKind,
        from: NodeKind,
        to: NodeKind,
        reason: String,
    },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid cardinality: {0}")]
    InvalidCardinality(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
