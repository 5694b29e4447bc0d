//! Typed construction of catalogue graphs.
//!
//! Each method adds one node and wires both directions of its ISO 19110
//! relationships, so the resulting graph carries the same back-references a
//! catalogue read from a schema-bound document would.

use super::{CatalogueGraph, NodeIndex};
use crate::error::Result;
use crate::model::{
    AttributeBody, CatalogueBody, FeatureTypeBody, InheritanceBody, LinkKind, Node, NodeBody,
    OperationBody, RoleBody,
};

/// Builds a [`CatalogueGraph`]. Pass `""` as identifier for anonymous nodes.
#[derive(Debug, Default)]
pub struct CatalogueBuilder {
    graph: CatalogueGraph,
    catalogue: Option<NodeIndex>,
}

impl CatalogueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a catalogue. Feature types added afterwards become its members.
    pub fn catalogue(&mut self, id: impl Into<String>, body: CatalogueBody) -> Result<NodeIndex> {
        let index = self
            .graph
            .add_node(Node::new(id, NodeBody::FeatureCatalogue(body)))?;
        self.catalogue = Some(index);
        Ok(index)
    }

    pub fn feature_type(&mut self, id: impl Into<String>, body: FeatureTypeBody) -> Result<NodeIndex> {
        self.add_feature_type(Node::new(id, NodeBody::FeatureType(body)))
    }

    pub fn association(&mut self, id: impl Into<String>, body: FeatureTypeBody) -> Result<NodeIndex> {
        self.add_feature_type(Node::new(id, NodeBody::FeatureAssociation(body)))
    }

    fn add_feature_type(&mut self, node: Node) -> Result<NodeIndex> {
        let catalogue = self.catalogue;
        self.atomically(|graph| {
            let index = graph.add_node(node)?;
            if let Some(catalogue) = catalogue {
                graph.link(catalogue, LinkKind::FeatureTypes, index)?;
                graph.link(index, LinkKind::Catalogue, catalogue)?;
            }
            Ok(index)
        })
    }

    /// `subtype` inherits from `supertype` through a new relation
    pub fn inheritance(
        &mut self,
        id: impl Into<String>,
        body: InheritanceBody,
        subtype: NodeIndex,
        supertype: NodeIndex,
    ) -> Result<NodeIndex> {
        let node = Node::new(id, NodeBody::InheritanceRelation(body));
        self.atomically(|graph| {
            let index = graph.add_node(node)?;
            graph.link(subtype, LinkKind::InheritsFrom, index)?;
            graph.link(supertype, LinkKind::InheritsTo, index)?;
            graph.link(index, LinkKind::Subtype, subtype)?;
            graph.link(index, LinkKind::Supertype, supertype)?;
            Ok(index)
        })
    }

    pub fn attribute(
        &mut self,
        id: impl Into<String>,
        owner: NodeIndex,
        body: AttributeBody,
    ) -> Result<NodeIndex> {
        self.add_property(Node::new(id, NodeBody::FeatureAttribute(body)), owner)
    }

    pub fn operation(
        &mut self,
        id: impl Into<String>,
        owner: NodeIndex,
        body: OperationBody,
    ) -> Result<NodeIndex> {
        self.add_property(Node::new(id, NodeBody::FeatureOperation(body)), owner)
    }

    fn add_property(&mut self, node: Node, owner: NodeIndex) -> Result<NodeIndex> {
        self.atomically(|graph| {
            let index = graph.add_node(node)?;
            wire_carrier(graph, owner, index)?;
            Ok(index)
        })
    }

    /// Add a role of `association`, played by `value_type`.
    ///
    /// The association owns the role: it lists it under `roleName` and the
    /// role's `featureType` points back at it.
    pub fn role(
        &mut self,
        id: impl Into<String>,
        association: NodeIndex,
        value_type: NodeIndex,
        body: RoleBody,
    ) -> Result<NodeIndex> {
        let node = Node::new(id, NodeBody::AssociationRole(body));
        self.atomically(|graph| {
            let index = graph.add_node(node)?;
            graph.link(association, LinkKind::Roles, index)?;
            graph.link(index, LinkKind::FeatureType, association)?;
            graph.link(index, LinkKind::Relation, association)?;
            graph.link(index, LinkKind::ValueType, value_type)?;
            Ok(index)
        })
    }

    /// Make `owner` the carrier of an existing `property`
    pub fn carry(&mut self, owner: NodeIndex, property: NodeIndex) -> Result<()> {
        self.atomically(|graph| wire_carrier(graph, owner, property))
    }

    pub fn build(self) -> CatalogueGraph {
        self.graph
    }

    /// Run `add` against the graph; on error, undo whatever it added
    fn atomically<T>(&mut self, add: impl FnOnce(&mut CatalogueGraph) -> Result<T>) -> Result<T> {
        let mark = self.graph.mark();
        add(&mut self.graph).map_err(|e| {
            self.graph.rollback(mark);
            e
        })
    }
}

fn wire_carrier(graph: &mut CatalogueGraph, owner: NodeIndex, property: NodeIndex) -> Result<()> {
    graph.link(owner, LinkKind::Characteristics, property)?;
    graph.link(property, LinkKind::FeatureType, owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    #[test]
    fn test_builder_wires_back_links() {
        let mut builder = CatalogueBuilder::new();
        let c = builder.catalogue("FC", CatalogueBody::new("Hydro")).unwrap();
        let river = builder.feature_type("R", FeatureTypeBody::new("River")).unwrap();
        let water = builder.feature_type("W", FeatureTypeBody::new("WaterBody")).unwrap();
        let rel = builder
            .inheritance("I", InheritanceBody::default(), river, water)
            .unwrap();
        let width = builder
            .attribute("R.width", river, AttributeBody::new("width"))
            .unwrap();
        let graph = builder.build();

        assert_eq!(graph.targets(c, LinkKind::FeatureTypes), vec![river, water]);
        assert_eq!(graph.targets(river, LinkKind::Catalogue), vec![c]);
        assert_eq!(graph.targets(river, LinkKind::InheritsFrom), vec![rel]);
        assert_eq!(graph.targets(water, LinkKind::InheritsTo), vec![rel]);
        assert_eq!(graph.targets(rel, LinkKind::Subtype), vec![river]);
        assert_eq!(graph.targets(rel, LinkKind::Supertype), vec![water]);
        assert_eq!(graph.targets(width, LinkKind::FeatureType), vec![river]);
        assert_eq!(graph.node(width).map(|n| n.kind()), Some(NodeKind::FeatureAttribute));
    }

    #[test]
    fn test_role_requires_association() {
        let mut builder = CatalogueBuilder::new();
        let a = builder.feature_type("A", FeatureTypeBody::new("Road")).unwrap();
        let b = builder.feature_type("B", FeatureTypeBody::new("Bridge")).unwrap();
        assert!(builder.role("r", a, b, RoleBody::new("crosses")).is_err());

        let graph = builder.build();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.link_count(), 0);
        assert_eq!(graph.lookup("r"), None);
    }

    #[test]
    fn test_failed_role_leaves_graph_unchanged() {
        let mut builder = CatalogueBuilder::new();
        let c = builder.catalogue("FC", CatalogueBody::new("Transport")).unwrap();
        let s = builder.association("S", FeatureTypeBody::new("Crosses")).unwrap();
        let nodes = builder.graph.node_count();
        let links = builder.graph.link_count();

        // a catalogue cannot play a role: fails on the last link
        assert!(builder.role("S.r", s, c, RoleBody::new("crossing")).is_err());

        assert_eq!(builder.graph.node_count(), nodes);
        assert_eq!(builder.graph.link_count(), links);
        assert!(builder.graph.targets(s, LinkKind::Roles).is_empty());

        // the identifier is free for a correct call
        let x = builder.feature_type("X", FeatureTypeBody::new("Road")).unwrap();
        assert!(builder.role("S.r", s, x, RoleBody::new("crossing")).is_ok());
    }

    #[test]
    fn test_failed_inheritance_and_carry_leave_graph_unchanged() {
        let mut builder = CatalogueBuilder::new();
        let a = builder.feature_type("A", FeatureTypeBody::new("Road")).unwrap();
        let b = builder.feature_type("B", FeatureTypeBody::new("Way")).unwrap();
        let width = builder
            .attribute("A.width", a, AttributeBody::new("width"))
            .unwrap();
        let rel = builder
            .inheritance("R", InheritanceBody::default(), a, b)
            .unwrap();
        let links = builder.graph.link_count();

        // supertype must be a feature type
        assert!(builder
            .inheritance("R2", InheritanceBody::default(), b, rel)
            .is_err());
        assert_eq!(builder.graph.lookup("R2"), None);
        assert_eq!(builder.graph.targets(b, LinkKind::InheritsFrom), Vec::new());

        // featureType of the attribute is already set
        assert!(builder.carry(b, width).is_err());
        assert_eq!(builder.graph.link_count(), links);
        assert!(builder.graph.targets(b, LinkKind::Characteristics).is_empty());
    }

    #[test]
    fn test_role_wiring() {
        let mut builder = CatalogueBuilder::new();
        builder.catalogue("FC", CatalogueBody::new("Transport")).unwrap();
        let x = builder.feature_type("X", FeatureTypeBody::new("Road")).unwrap();
        let s = builder.association("S", FeatureTypeBody::new("Crosses")).unwrap();
        let role = builder.role("S.r", s, x, RoleBody::new("crossing")).unwrap();
        let graph = builder.build();

        assert_eq!(graph.targets(s, LinkKind::Roles), vec![role]);
        assert_eq!(graph.targets(role, LinkKind::FeatureType), vec![s]);
        assert_eq!(graph.targets(role, LinkKind::Relation), vec![s]);
        assert_eq!(graph.targets(role, LinkKind::ValueType), vec![x]);
    }
}
