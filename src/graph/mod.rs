//! Catalogue Graph
//!
//! Arena of catalogue nodes on top of petgraph. Nodes are addressed by
//! `NodeIndex`; identifiers are an index beside the arena, so nodes without
//! an identifier can still be stored and linked. The in-memory graph is
//! freely cyclic (catalogue <-> feature type, subtype/supertype <->
//! inheritance relation, association <-> role); only the projected document
//! is a tree.

pub mod analysis;
pub mod builder;
pub mod loader;

pub use analysis::{analyze, CycleAnalysis, CycleGroup, MissingIdentifier};
pub use builder::CatalogueBuilder;
pub use loader::{GraphFile, LinkRecord, NodeRecord};
pub use petgraph::graph::NodeIndex;

use petgraph::graph::{DiGraph, EdgeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

use crate::error::{CatalogueError, Result};
use crate::model::{Link, LinkKind, Node, NodeKind};

/// Fuzzy search hit
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub index: NodeIndex,
    pub identifier: Option<String>,
    pub name: Option<String>,
    pub kind: NodeKind,
    pub score: i64,
}

/// Arena sizes at some point in time, see [`CatalogueGraph::rollback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mark {
    nodes: usize,
    links: usize,
}

/// The feature catalogue graph
#[derive(Debug, Clone, Default)]
pub struct CatalogueGraph {
    /// Node arena and adjacency
    pub(crate) graph: DiGraph<Node, Link>,

    /// Index: identifier -> node
    pub(crate) by_id: HashMap<String, NodeIndex>,

    /// Index: name -> nodes (names can collide)
    pub(crate) by_name: HashMap<String, Vec<NodeIndex>>,
}

impl CatalogueGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Fails if another node already carries its identifier.
    pub fn add_node(&mut self, node: Node) -> Result<NodeIndex> {
        if let Some(id) = node.identifier() {
            if self.by_id.contains_key(id) {
                return Err(CatalogueError::DuplicateIdentifier(id.to_string()));
            }
        }

        let identifier = node.identifier().map(str::to_string);
        let name = node.name().map(str::to_string);
        let index = self.graph.add_node(node);

        if let Some(id) = identifier {
            self.by_id.insert(id, index);
        }
        if let Some(name) = name {
            self.by_name.entry(name).or_default().push(index);
        }
        Ok(index)
    }

    /// Link `from` to `to` through field `kind`.
    ///
    /// Many-valued fields append; single-valued fields may be set once.
    pub fn link(&mut self, from: NodeIndex, kind: LinkKind, to: NodeIndex) -> Result<()> {
        let from_kind = self.require(from)?.kind();
        let to_kind = self.require(to)?.kind();
        kind.check(from_kind, to_kind)?;

        let existing = self
            .graph
            .edges_directed(from, Direction::Outgoing)
            .filter(|e| e.weight().kind == kind)
            .count();

        if !kind.is_many() && existing > 0 {
            return Err(kind.invalid(from_kind, to_kind, "single-valued field is already set"));
        }

        self.graph.add_edge(
            from,
            to,
            Link {
                kind,
                position: existing as u32,
            },
        );
        Ok(())
    }

    pub(crate) fn mark(&self) -> Mark {
        Mark {
            nodes: self.graph.node_count(),
            links: self.graph.edge_count(),
        }
    }

    /// Drop every node and link added since `mark`.
    ///
    /// petgraph appends to both arenas and only swaps on removal from the
    /// middle, so popping from the end leaves older indices untouched.
    pub(crate) fn rollback(&mut self, mark: Mark) {
        while self.graph.edge_count() > mark.links {
            let last = EdgeIndex::new(self.graph.edge_count() - 1);
            self.graph.remove_edge(last);
        }
        while self.graph.node_count() > mark.nodes {
            let last = NodeIndex::new(self.graph.node_count() - 1);
            let Some(node) = self.graph.remove_node(last) else {
                break;
            };
            if let Some(id) = node.identifier() {
                self.by_id.remove(id);
            }
            if let Some(name) = node.name() {
                let emptied = match self.by_name.get_mut(name) {
                    Some(indices) => {
                        indices.retain(|i| *i != last);
                        indices.is_empty()
                    }
                    None => false,
                };
                if emptied {
                    self.by_name.remove(name);
                }
            }
        }
    }

    fn require(&self, index: NodeIndex) -> Result<&Node> {
        self.node(index)
            .ok_or_else(|| CatalogueError::UnknownNode(format!("#{}", index.index())))
    }

    // ========== Public API ==========

    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.graph.node_weight(index)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes in arena order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.graph
            .node_indices()
            .filter_map(move |i| self.graph.node_weight(i).map(|n| (i, n)))
    }

    /// Look up a node by identifier
    pub fn lookup(&self, identifier: &str) -> Option<NodeIndex> {
        self.by_id.get(identifier).copied()
    }

    /// Resolve a query (identifier, then name, then case-insensitive name)
    pub fn resolve(&self, query: &str) -> Option<NodeIndex> {
        if let Some(index) = self.lookup(query) {
            return Some(index);
        }

        if let Some(indices) = self.by_name.get(query) {
            return indices.first().copied();
        }

        let query_lower = query.to_lowercase();
        let mut matches: Vec<NodeIndex> = self
            .by_name
            .iter()
            .filter(|(name, _)| name.to_lowercase() == query_lower)
            .flat_map(|(_, indices)| indices.iter().copied())
            .collect();
        matches.sort();
        matches.first().copied()
    }

    /// First node of a kind, in arena order
    pub fn first_of_kind(&self, kind: NodeKind) -> Option<NodeIndex> {
        self.nodes().find(|(_, n)| n.kind() == kind).map(|(i, _)| i)
    }

    /// Outgoing links in serialization order: by link kind, then position
    pub fn links_out(&self, index: NodeIndex) -> Vec<(Link, NodeIndex)> {
        let mut links: Vec<(Link, NodeIndex)> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|e| (*e.weight(), e.target()))
            .collect();
        links.sort_by_key(|(link, _)| *link);
        links
    }

    /// Targets of one field, in position order
    pub fn targets(&self, index: NodeIndex, kind: LinkKind) -> Vec<NodeIndex> {
        self.links_out(index)
            .into_iter()
            .filter(|(link, _)| link.kind == kind)
            .map(|(_, target)| target)
            .collect()
    }

    /// Number of links pointing at a node
    pub fn in_degree(&self, index: NodeIndex) -> usize {
        self.graph.edges_directed(index, Direction::Incoming).count()
    }

    /// Short label for logs and reports: the identifier, or `#index`
    pub fn label(&self, index: NodeIndex) -> String {
        match self.node(index).and_then(|n| n.identifier()) {
            Some(id) => id.to_string(),
            None => format!("#{}", index.index()),
        }
    }

    /// Search nodes by name or identifier (fuzzy)
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        use fuzzy_matcher::skim::SkimMatcherV2;
        use fuzzy_matcher::FuzzyMatcher;

        let matcher = SkimMatcherV2::default();
        let mut results: Vec<(i64, NodeIndex, &Node)> = Vec::new();

        for (index, node) in self.nodes() {
            let by_name = node.name().and_then(|name| matcher.fuzzy_match(name, query));
            let by_id = node.identifier().and_then(|id| matcher.fuzzy_match(id, query));
            if let Some(score) = by_name.max(by_id) {
                results.push((score, index, node));
            }
        }

        // Score descending, arena order on ties
        results.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        results
            .into_iter()
            .take(limit)
            .map(|(score, index, node)| SearchResult {
                index,
                identifier: node.identifier().map(str::to_string),
                name: node.name().map(str::to_string),
                kind: node.kind(),
                score,
            })
            .collect()
    }

    /// Export the graph to GraphViz DOT format
    pub fn to_dot(&self) -> String {
        let mut output = String::new();

        output.push_str("digraph FeatureCatalogue {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10];\n");
        output.push_str("  edge [fontname=\"Helvetica\", fontsize=8, fontcolor=\"#808080\"];\n");
        output.push('\n');

        let color_map = [
            (NodeKind::FeatureCatalogue, "#FF9800"),
            (NodeKind::FeatureType, "#00BCD4"),
            (NodeKind::FeatureAssociation, "#9C27B0"),
            (NodeKind::InheritanceRelation, "#4CAF50"),
            (NodeKind::FeatureAttribute, "#607D8B"),
            (NodeKind::FeatureOperation, "#2196F3"),
            (NodeKind::AssociationRole, "#F44336"),
        ];

        for (index, node) in self.nodes() {
            let label = node.name().unwrap_or(node.kind().as_str());
            let color = color_map
                .iter()
                .find(|(kind, _)| *kind == node.kind())
                .map(|(_, color)| *color)
                .unwrap_or("#9E9E9E");
            // Anonymous nodes are dashed: they can never be emitted as stubs
            let style = if node.identifier().is_none() { ", style=\"filled,dashed\"" } else { "" };
            output.push_str(&format!(
                "  n{} [label=\"{}\\n{}\", fillcolor=\"{}\"{}];\n",
                index.index(),
                escape_dot(label),
                escape_dot(&self.label(index)),
                color,
                style
            ));
        }

        output.push('\n');

        for edge in self.graph.edge_references() {
            output.push_str(&format!(
                "  n{} -> n{} [label=\"{}\"];\n",
                edge.source().index(),
                edge.target().index(),
                edge.weight().kind.field_name()
            ));
        }

        output.push_str("}\n");
        output
    }
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
