//! Stub projection: identifier-only placeholders for repeat occurrences

use super::ProjectedNode;
use crate::model::Node;

/// Project a stored node to a reference stub.
///
/// The stub keeps the identifier and kind; body and links are dropped. The
/// stored node is only read.
pub fn project_stub(node: &Node) -> ProjectedNode {
    ProjectedNode {
        kind: node.kind(),
        identifier: node.identifier().map(str::to_string),
        reference: true,
        body: None,
        links: Vec::new(),
    }
}

impl ProjectedNode {
    /// Stub for this projected value; stubbing a stub yields an equal stub
    pub fn to_stub(&self) -> ProjectedNode {
        ProjectedNode {
            kind: self.kind,
            identifier: self.identifier.clone(),
            reference: true,
            body: None,
            links: Vec::new(),
        }
    }
}
