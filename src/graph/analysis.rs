//! Catalogue Graph Analysis
//!
//! Computes strongly connected components (cycle groups), shared nodes, and
//! the nodes that need an identifier for the projection to collapse repeat
//! occurrences into stubs.

use petgraph::algo::kosaraju_scc;
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

use super::{CatalogueGraph, NodeIndex};
use crate::error::{CatalogueError, MissingIdentifierReason};
use crate::model::NodeKind;

// =============================================================================
// Cycle Group
// =============================================================================

/// A strongly connected component of the catalogue graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleGroup {
    pub id: usize,
    /// Members in arena order
    pub members: Vec<NodeIndex>,
    /// Single node linking to itself
    pub is_self_referential: bool,
}

// =============================================================================
// Missing Identifier
// =============================================================================

/// A node that needs an identifier but has none
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingIdentifier {
    pub index: NodeIndex,
    pub kind: NodeKind,
    pub reason: MissingIdentifierReason,
}

impl MissingIdentifier {
    pub fn into_error(self) -> CatalogueError {
        CatalogueError::MissingIdentifier {
            kind: self.kind,
            index: self.index.index(),
            reason: self.reason,
        }
    }
}

// =============================================================================
// Analysis Result
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct CycleAnalysis {
    /// Cycles only: SCCs with more than one member, or self-loops
    pub groups: Vec<CycleGroup>,
    /// Nodes with more than one incoming link
    pub shared: Vec<NodeIndex>,
    /// Anonymous nodes that are cyclic or shared, in arena order
    pub missing_identifiers: Vec<MissingIdentifier>,
    membership: HashMap<NodeIndex, usize>,
}

impl CycleAnalysis {
    /// Check if a node lies on a cycle
    pub fn is_cyclic(&self, index: NodeIndex) -> bool {
        self.membership.contains_key(&index)
    }

    /// Get the cycle group of a node
    pub fn group_of(&self, index: NodeIndex) -> Option<&CycleGroup> {
        let id = *self.membership.get(&index)?;
        self.groups.get(id)
    }

    /// A node needs an identifier when it is cyclic or shared
    pub fn requires_identifier(&self, index: NodeIndex) -> bool {
        self.is_cyclic(index) || self.shared.binary_search(&index).is_ok()
    }

    /// Missing-identifier findings restricted to the nodes reachable from `root`
    pub fn missing_reachable_from(
        &self,
        graph: &CatalogueGraph,
        root: NodeIndex,
    ) -> Vec<MissingIdentifier> {
        if self.missing_identifiers.is_empty() {
            return Vec::new();
        }

        let mut reachable = HashSet::new();
        let mut dfs = Dfs::new(&graph.graph, root);
        while let Some(index) = dfs.next(&graph.graph) {
            reachable.insert(index);
        }

        self.missing_identifiers
            .iter()
            .filter(|m| reachable.contains(&m.index))
            .copied()
            .collect()
    }
}

// =============================================================================
// Analysis Functions
// =============================================================================

/// Compute cycle analysis for a catalogue graph
pub fn analyze(graph: &CatalogueGraph) -> CycleAnalysis {
    let mut groups = Vec::new();
    let mut membership = HashMap::new();

    for mut scc in kosaraju_scc(&graph.graph) {
        let is_cycle = if scc.len() == 1 {
            let index = scc[0];
            graph
                .graph
                .edges_directed(index, Direction::Outgoing)
                .any(|e| e.target() == index)
        } else {
            true
        };

        if !is_cycle {
            continue;
        }

        scc.sort();
        groups.push(CycleGroup {
            id: 0,
            is_self_referential: scc.len() == 1,
            members: scc,
        });
    }

    // Kosaraju order depends on traversal internals; order groups by first member
    groups.sort_by_key(|g| g.members[0]);
    for (id, group) in groups.iter_mut().enumerate() {
        group.id = id;
        for member in &group.members {
            membership.insert(*member, id);
        }
    }

    let shared: Vec<NodeIndex> = graph
        .graph
        .node_indices()
        .filter(|&i| graph.in_degree(i) > 1)
        .collect();

    let mut missing_identifiers = Vec::new();
    for (index, node) in graph.nodes() {
        if node.identifier().is_some() {
            continue;
        }
        let reason = if membership.contains_key(&index) {
            MissingIdentifierReason::Cycle
        } else if shared.binary_search(&index).is_ok() {
            MissingIdentifierReason::Shared
        } else {
            continue;
        };
        missing_identifiers.push(MissingIdentifier {
            index,
            kind: node.kind(),
            reason,
        });
    }

    CycleAnalysis {
        groups,
        shared,
        missing_identifiers,
        membership,
    }
}
