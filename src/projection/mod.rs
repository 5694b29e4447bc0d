//! Document Projection
//!
//! Turns the cyclic catalogue graph into a tree: a pre-order walk from a
//! root emits each identified node in full at its first occurrence and as a
//! reference stub at every later one.
//!
//! The reference flag lives only on [`ProjectedNode`]. Stored nodes are
//! never mutated and the visited-set belongs to one [`ProjectionContext`],
//! so any number of projections may run over the same `&CatalogueGraph`
//! concurrently.
//!
//! ```text
//! FeatureCatalogue FC (full)
//! ├── featureType: FeatureType A (full)
//! │   ├── featureCatalogue: FC (stub)
//! │   └── inheritsFrom: InheritanceRelation R (full)
//! │       ├── subtype: A (stub)
//! │       └── supertype: FeatureType B (full)
//! │           ├── featureCatalogue: FC (stub)
//! │           └── inheritsTo: R (stub)
//! └── featureType: B (stub)
//! ```

pub mod document;
pub mod registry;
pub mod resolve;
pub mod stub;
pub mod walker;

pub use document::{Document, ProjectionStats};
pub use registry::IdentityRegistry;
pub use resolve::resolve_document;
pub use stub::project_stub;
pub use walker::{project, MissingIdentifierPolicy, ProjectionContext, ProjectionOptions};

use crate::model::{LinkKind, Node, NodeBody, NodeKind};

/// A node of the projected tree: either a full body or a reference stub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedNode {
    pub kind: NodeKind,
    pub identifier: Option<String>,
    /// Set on stubs only
    pub reference: bool,
    /// `None` on stubs
    pub body: Option<NodeBody>,
    pub links: Vec<ProjectedLink>,
}

/// An outgoing field value in the projected tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedLink {
    pub kind: LinkKind,
    pub target: ProjectedNode,
}

impl ProjectedNode {
    /// Full projection of a stored node with already-projected links
    pub fn full(node: &Node, links: Vec<ProjectedLink>) -> Self {
        Self {
            kind: node.kind(),
            identifier: node.identifier().map(str::to_string),
            reference: false,
            body: Some(node.body.clone()),
            links,
        }
    }

    pub fn is_stub(&self) -> bool {
        self.reference
    }

    /// Pre-order iteration over this node and all descendants
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Targets of one field, in order
    pub fn field(&self, kind: LinkKind) -> impl Iterator<Item = &ProjectedNode> {
        self.links
            .iter()
            .filter(move |l| l.kind == kind)
            .map(|l| &l.target)
    }

    /// Count (full, stub) occurrences of an identifier in this tree
    pub fn occurrences(&self, identifier: &str) -> (usize, usize) {
        self.iter()
            .filter(|n| n.identifier.as_deref() == Some(identifier))
            .fold((0, 0), |(full, stubs), n| {
                if n.is_stub() {
                    (full, stubs + 1)
                } else {
                    (full + 1, stubs)
                }
            })
    }
}

/// Pre-order iterator over a projected tree
pub struct PreOrder<'a> {
    stack: Vec<&'a ProjectedNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a ProjectedNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.links.iter().rev().map(|l| &l.target));
        Some(node)
    }
}
