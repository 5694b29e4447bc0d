//! Pre-order graph walker
//!
//! Registers each identified node before descending into its links, so a
//! link back to any ancestor (or to the node itself) is already known and
//! becomes a stub. Links are visited in the graph's fixed field order,
//! which makes the output reproducible for a given graph.
//!
//! Nodes without an identifier are never registered and are emitted in
//! full at every occurrence. When such a node is re-entered with nothing but
//! other anonymous nodes in between, the walk would repeat forever; that
//! case fails with [`CatalogueError::MissingIdentifier`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{project_stub, IdentityRegistry, ProjectedLink, ProjectedNode, ProjectionStats};
use crate::error::{CatalogueError, MissingIdentifierReason, Result};
use crate::graph::{analyze, CatalogueGraph, NodeIndex};
use crate::model::Node;

/// Handling of reachable nodes that are cyclic or shared but have no identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingIdentifierPolicy {
    /// Emit them in full at every occurrence, silently
    Allow,
    /// As `Allow`, logging each one
    #[default]
    Warn,
    /// Fail before walking
    Deny,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionOptions {
    pub missing_identifier: MissingIdentifierPolicy,
}

/// State of one projection pass
pub struct ProjectionContext<'g> {
    graph: &'g CatalogueGraph,
    options: ProjectionOptions,
    registry: IdentityRegistry,
    /// Current descent path; the flag marks anonymous nodes
    path: Vec<(NodeIndex, bool)>,
    stats: ProjectionStats,
}

impl<'g> ProjectionContext<'g> {
    pub fn new(graph: &'g CatalogueGraph, options: ProjectionOptions) -> Self {
        Self {
            graph,
            options,
            registry: IdentityRegistry::new(),
            path: Vec::new(),
            stats: ProjectionStats::default(),
        }
    }

    /// Project the tree rooted at `root`. Each call starts with an empty registry.
    pub fn project(&mut self, root: NodeIndex) -> Result<ProjectedNode> {
        self.registry = IdentityRegistry::new();
        self.path.clear();
        self.stats = ProjectionStats::default();

        if self.graph.node(root).is_none() {
            return Err(CatalogueError::UnknownNode(format!("#{}", root.index())));
        }

        self.check_identifiers(root)?;
        let tree = self.walk(root)?;

        info!(
            root = %self.graph.label(root),
            full = self.stats.full,
            stubs = self.stats.stubs,
            "projection complete"
        );
        Ok(tree)
    }

    /// Registry of the last pass
    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    /// Counts of the last pass
    pub fn stats(&self) -> ProjectionStats {
        self.stats
    }

    fn check_identifiers(&self, root: NodeIndex) -> Result<()> {
        if self.options.missing_identifier == MissingIdentifierPolicy::Allow {
            return Ok(());
        }

        let missing = analyze(self.graph).missing_reachable_from(self.graph, root);
        match self.options.missing_identifier {
            MissingIdentifierPolicy::Deny => {
                if let Some(first) = missing.first() {
                    return Err(first.into_error());
                }
            }
            MissingIdentifierPolicy::Warn => {
                for m in &missing {
                    warn!(
                        node = %self.graph.label(m.index),
                        kind = %m.kind,
                        reason = %m.reason,
                        "node without identifier will be emitted in full at every occurrence"
                    );
                }
            }
            MissingIdentifierPolicy::Allow => {}
        }
        Ok(())
    }

    fn walk(&mut self, index: NodeIndex) -> Result<ProjectedNode> {
        let graph = self.graph;
        let node = graph
            .node(index)
            .ok_or_else(|| CatalogueError::UnknownNode(format!("#{}", index.index())))?;

        let anonymous = match node.identifier() {
            Some(id) => {
                self.registry.register(id, index);
                false
            }
            None => {
                self.check_reentry(index, node)?;
                true
            }
        };

        self.path.push((index, anonymous));
        let mut links = Vec::new();

        for (link, target_index) in graph.links_out(index) {
            let target = graph
                .node(target_index)
                .ok_or_else(|| CatalogueError::UnknownNode(format!("#{}", target_index.index())))?;

            let projected = match target.identifier() {
                Some(id) if self.registry.contains(id) => {
                    debug!(
                        from = %graph.label(index),
                        field = link.kind.field_name(),
                        target = id,
                        "stub substituted"
                    );
                    self.stats.stubs += 1;
                    project_stub(target)
                }
                _ => self.walk(target_index)?,
            };

            links.push(ProjectedLink {
                kind: link.kind,
                target: projected,
            });
        }

        self.path.pop();
        self.stats.full += 1;
        Ok(ProjectedNode::full(node, links))
    }

    fn check_reentry(&self, index: NodeIndex, node: &Node) -> Result<()> {
        let Some(pos) = self.path.iter().rposition(|(i, _)| *i == index) else {
            return Ok(());
        };

        // An identified node in between is registered by now and will stub the next round
        if self.path[pos + 1..].iter().all(|(_, anonymous)| *anonymous) {
            return Err(CatalogueError::MissingIdentifier {
                kind: node.kind(),
                index: index.index(),
                reason: MissingIdentifierReason::Cycle,
            });
        }
        Ok(())
    }
}

/// Project with default options
pub fn project(graph: &CatalogueGraph, root: NodeIndex) -> Result<ProjectedNode> {
    ProjectionContext::new(graph, ProjectionOptions::default()).project(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CatalogueBuilder;
    use crate::model::{
        AttributeBody, CatalogueBody, FeatureTypeBody, LinkKind, NodeBody, NodeKind,
    };

    fn options(policy: MissingIdentifierPolicy) -> ProjectionOptions {
        ProjectionOptions {
            missing_identifier: policy,
        }
    }

    #[test]
    fn test_acyclic_graph_projects_in_full() {
        let mut graph = CatalogueGraph::new();
        let a = graph
            .add_node(Node::new("A", NodeBody::FeatureType(FeatureTypeBody::new("Road"))))
            .unwrap();
        let w = graph
            .add_node(Node::new("A.w", NodeBody::FeatureAttribute(AttributeBody::new("width"))))
            .unwrap();
        let l = graph
            .add_node(Node::anonymous(NodeBody::FeatureAttribute(AttributeBody::new("lanes"))))
            .unwrap();
        graph.link(a, LinkKind::Characteristics, w).unwrap();
        graph.link(a, LinkKind::Characteristics, l).unwrap();

        let tree = project(&graph, a).unwrap();
        assert_eq!(tree.iter().count(), 3);
        assert!(tree.iter().all(|n| !n.is_stub()));
        let members: Vec<_> = tree
            .field(LinkKind::Characteristics)
            .map(|n| n.body.as_ref().and_then(|b| b.name()).unwrap_or_default().to_string())
            .collect();
        assert_eq!(members, vec!["width", "lanes"]);
    }

    #[test]
    fn test_self_reference_becomes_stub() {
        // Catalogue with a single member: FC -> A -> FC
        let mut builder = CatalogueBuilder::new();
        let c = builder.catalogue("FC", CatalogueBody::new("Roads")).unwrap();
        builder.feature_type("A", FeatureTypeBody::new("Road")).unwrap();
        let graph = builder.build();

        let mut ctx = ProjectionContext::new(&graph, ProjectionOptions::default());
        let tree = ctx.project(c).unwrap();
        assert_eq!(tree.occurrences("FC"), (1, 1));
        assert_eq!(tree.occurrences("A"), (1, 0));
        assert_eq!(ctx.stats(), ProjectionStats { full: 2, stubs: 1 });
        assert_eq!(ctx.registry().len(), 2);
    }

    #[test]
    fn test_fresh_registry_per_pass() {
        let mut builder = CatalogueBuilder::new();
        let c = builder.catalogue("FC", CatalogueBody::new("Roads")).unwrap();
        builder.feature_type("A", FeatureTypeBody::new("Road")).unwrap();
        let graph = builder.build();

        let mut ctx = ProjectionContext::new(&graph, ProjectionOptions::default());
        let first = ctx.project(c).unwrap();
        let second = ctx.project(c).unwrap();
        assert_eq!(first, second);
        assert!(!second.is_stub());
    }

    #[test]
    fn test_anonymous_cycle_fails() {
        let mut builder = CatalogueBuilder::new();
        let c = builder.catalogue("", CatalogueBody::new("Roads")).unwrap();
        builder.feature_type("", FeatureTypeBody::new("Road")).unwrap();
        let graph = builder.build();

        let err = ProjectionContext::new(&graph, options(MissingIdentifierPolicy::Allow))
            .project(c)
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogueError::MissingIdentifier {
                kind: NodeKind::FeatureCatalogue,
                reason: MissingIdentifierReason::Cycle,
                ..
            }
        ));
    }

    #[test]
    fn test_anonymous_node_on_identified_cycle_is_duplicated() {
        // FC (anonymous) -> A -> FC: A is registered before FC comes round again
        let mut builder = CatalogueBuilder::new();
        let c = builder.catalogue("", CatalogueBody::new("Roads")).unwrap();
        builder.feature_type("A", FeatureTypeBody::new("Road")).unwrap();
        let graph = builder.build();

        let tree = ProjectionContext::new(&graph, options(MissingIdentifierPolicy::Allow))
            .project(c)
            .unwrap();

        let catalogues: Vec<_> = tree
            .iter()
            .filter(|n| n.kind == NodeKind::FeatureCatalogue)
            .collect();
        assert_eq!(catalogues.len(), 2);
        assert!(catalogues.iter().all(|n| !n.is_stub()));
        assert_eq!(tree.occurrences("A"), (1, 1));
    }

    #[test]
    fn test_deny_policy_fails_fast() {
        let mut builder = CatalogueBuilder::new();
        let c = builder.catalogue("FC", CatalogueBody::new("Roads")).unwrap();
        builder.feature_type("", FeatureTypeBody::new("Road")).unwrap();
        let graph = builder.build();

        let err = ProjectionContext::new(&graph, options(MissingIdentifierPolicy::Deny))
            .project(c)
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogueError::MissingIdentifier {
                kind: NodeKind::FeatureType,
                index: 1,
                ..
            }
        ));

        // Warn and Allow both project
        for policy in [MissingIdentifierPolicy::Warn, MissingIdentifierPolicy::Allow] {
            let tree = ProjectionContext::new(&graph, options(policy)).project(c).unwrap();
            assert_eq!(tree.occurrences("FC"), (1, 1));
        }
    }

    #[test]
    fn test_unknown_root() {
        let graph = CatalogueGraph::new();
        let err = project(&graph, NodeIndex::new(0)).unwrap_err();
        assert!(matches!(err, CatalogueError::UnknownNode(_)));
    }

    #[test]
    fn test_policy_serde() {
        let policy: MissingIdentifierPolicy = serde_json::from_str("\"deny\"").unwrap();
        assert_eq!(policy, MissingIdentifierPolicy::Deny);
        assert_eq!(MissingIdentifierPolicy::default(), MissingIdentifierPolicy::Warn);
    }
}
