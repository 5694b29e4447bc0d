//! Resolve-on-read: rebuild the cyclic graph from a projected tree.
//!
//! First pass adds every full occurrence as a node; second pass adds links,
//! resolving stubs by identifier. Stubs may therefore precede their full
//! occurrence in document order.

use tracing::debug;

use super::ProjectedNode;
use crate::error::{CatalogueError, Result};
use crate::graph::{CatalogueGraph, NodeIndex};
use crate::model::{LinkKind, Node, NodeKind};

/// Tree of arena slots mirroring the projected tree
enum Slot {
    Full(NodeIndex, Vec<(LinkKind, Slot)>),
    Stub { identifier: String, kind: NodeKind },
}

/// Rebuild a catalogue graph from a projected tree
pub fn resolve_document(root: &ProjectedNode) -> Result<CatalogueGraph> {
    let mut graph = CatalogueGraph::new();
    let slots = collect(&mut graph, root)?;
    if matches!(slots, Slot::Stub { .. }) {
        return Err(CatalogueError::InvalidDocument(
            "document root is a reference stub".to_string(),
        ));
    }
    connect(&mut graph, &slots)?;

    debug!(
        nodes = graph.node_count(),
        links = graph.link_count(),
        "resolved document"
    );
    Ok(graph)
}

fn collect(graph: &mut CatalogueGraph, node: &ProjectedNode) -> Result<Slot> {
    if node.is_stub() {
        let identifier = node.identifier.clone().ok_or_else(|| {
            CatalogueError::InvalidDocument(format!("{} stub without identifier", node.kind))
        })?;
        return Ok(Slot::Stub {
            identifier,
            kind: node.kind,
        });
    }

    let body = node.body.clone().ok_or_else(|| {
        CatalogueError::InvalidDocument(format!("full {} occurrence without body", node.kind))
    })?;
    let index = graph.add_node(Node::from_parts(node.identifier.clone(), body))?;

    let mut children = Vec::with_capacity(node.links.len());
    for link in &node.links {
        children.push((link.kind, collect(graph, &link.target)?));
    }
    Ok(Slot::Full(index, children))
}

fn connect(graph: &mut CatalogueGraph, slot: &Slot) -> Result<()> {
    let Slot::Full(index, children) = slot else {
        return Ok(());
    };

    for (kind, child) in children {
        let target = match child {
            Slot::Full(target, _) => *target,
            Slot::Stub { identifier, kind: stub_kind } => {
                let target = graph
                    .lookup(identifier)
                    .ok_or_else(|| CatalogueError::UnresolvedReference(identifier.clone()))?;
                let actual = graph.node(target).map(|n| n.kind());
                if actual != Some(*stub_kind) {
                    return Err(CatalogueError::InvalidDocument(format!(
                        "stub {} declares kind {} but resolves to {:?}",
                        identifier, stub_kind, actual
                    )));
                }
                target
            }
        };
        graph.link(*index, *kind, target)?;
        connect(graph, child)?;
    }
    Ok(())
}
