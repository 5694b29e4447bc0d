//! Feature Catalogue Data Model
//!
//! ISO 19110 complex types as a single sum type. Fields shared across a
//! type family live in a common struct: `FeatureTypeBody` for feature types
//! and feature associations, `PropertyBody` for attributes, operations and
//! association roles.
//!
//! Links between nodes are not stored here; they live in the graph's
//! adjacency (see [`crate::graph::CatalogueGraph`]).

mod cardinality;
mod link;

pub use cardinality::Cardinality;
pub use link::{Link, LinkKind};

use serde::{Deserialize, Serialize};

/// Kind of a catalogue node, one per schema complex type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    FeatureCatalogue,
    FeatureType,
    FeatureAssociation,
    InheritanceRelation,
    FeatureAttribute,
    FeatureOperation,
    AssociationRole,
}

impl NodeKind {
    pub const ALL: [NodeKind; 7] = [
        NodeKind::FeatureCatalogue,
        NodeKind::FeatureType,
        NodeKind::FeatureAssociation,
        NodeKind::InheritanceRelation,
        NodeKind::FeatureAttribute,
        NodeKind::FeatureOperation,
        NodeKind::AssociationRole,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::FeatureCatalogue => "FeatureCatalogue",
            NodeKind::FeatureType => "FeatureType",
            NodeKind::FeatureAssociation => "FeatureAssociation",
            NodeKind::InheritanceRelation => "InheritanceRelation",
            NodeKind::FeatureAttribute => "FeatureAttribute",
            NodeKind::FeatureOperation => "FeatureOperation",
            NodeKind::AssociationRole => "AssociationRole",
        }
    }

    /// Parse a kind from its serialized name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Feature types and feature associations (an association is a feature type)
    pub fn is_feature_type(&self) -> bool {
        matches!(self, NodeKind::FeatureType | NodeKind::FeatureAssociation)
    }

    /// Attributes, operations and roles (the property types)
    pub fn is_property(&self) -> bool {
        matches!(
            self,
            NodeKind::FeatureAttribute | NodeKind::FeatureOperation | NodeKind::AssociationRole
        )
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A stored catalogue node.
///
/// The identifier is optional. An empty or blank identifier is treated as
/// absent, so `identifier()` never returns `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    identifier: Option<String>,
    pub body: NodeBody,
}

impl Node {
    pub fn new(identifier: impl Into<String>, body: NodeBody) -> Self {
        Self::from_parts(Some(identifier.into()), body)
    }

    /// Node without an identifier
    pub fn anonymous(body: NodeBody) -> Self {
        Self { identifier: None, body }
    }

    pub fn from_parts(identifier: Option<String>, body: NodeBody) -> Self {
        Self {
            identifier: normalize_identifier(identifier),
            body,
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn kind(&self) -> NodeKind {
        self.body.kind()
    }

    /// Human-readable name (catalogue name, type name, member name)
    pub fn name(&self) -> Option<&str> {
        self.body.name()
    }
}

/// Empty and whitespace-only identifiers count as absent
pub fn normalize_identifier(identifier: Option<String>) -> Option<String> {
    identifier.filter(|id| !id.trim().is_empty())
}

/// Node payload, tagged by kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NodeBody {
    FeatureCatalogue(CatalogueBody),
    FeatureType(FeatureTypeBody),
    FeatureAssociation(FeatureTypeBody),
    InheritanceRelation(InheritanceBody),
    FeatureAttribute(AttributeBody),
    FeatureOperation(OperationBody),
    AssociationRole(RoleBody),
}

impl NodeBody {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeBody::FeatureCatalogue(_) => NodeKind::FeatureCatalogue,
            NodeBody::FeatureType(_) => NodeKind::FeatureType,
            NodeBody::FeatureAssociation(_) => NodeKind::FeatureAssociation,
            NodeBody::InheritanceRelation(_) => NodeKind::InheritanceRelation,
            NodeBody::FeatureAttribute(_) => NodeKind::FeatureAttribute,
            NodeBody::FeatureOperation(_) => NodeKind::FeatureOperation,
            NodeBody::AssociationRole(_) => NodeKind::AssociationRole,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            NodeBody::FeatureCatalogue(c) => Some(&c.name),
            NodeBody::FeatureType(t) | NodeBody::FeatureAssociation(t) => Some(&t.type_name),
            NodeBody::InheritanceRelation(r) => r.name.as_deref(),
            NodeBody::FeatureAttribute(a) => Some(&a.property.member_name),
            NodeBody::FeatureOperation(o) => Some(&o.property.member_name),
            NodeBody::AssociationRole(r) => Some(&r.property.member_name),
        }
    }
}

/// FC_FeatureCatalogue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueBody {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_of_application: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
}

impl CatalogueBody {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// FC_FeatureType, also the shared part of FC_FeatureAssociation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureTypeBody {
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl FeatureTypeBody {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }
}

/// FC_InheritanceRelation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InheritanceBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub unique_instance: bool,
}

/// FC_PropertyType fields shared by attributes, operations and roles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyBody {
    pub member_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl PropertyBody {
    pub fn new(member_name: impl Into<String>) -> Self {
        Self {
            member_name: member_name.into(),
            ..Default::default()
        }
    }
}

/// FC_FeatureAttribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeBody {
    #[serde(flatten)]
    pub property: PropertyBody,
    /// Name of the value type, e.g. `CharacterString`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_measurement_unit: Option<String>,
}

impl AttributeBody {
    pub fn new(member_name: impl Into<String>) -> Self {
        Self {
            property: PropertyBody::new(member_name),
            ..Default::default()
        }
    }
}

/// FC_FeatureOperation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationBody {
    #[serde(flatten)]
    pub property: PropertyBody,
    #[serde(default)]
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formal_definition: Option<String>,
}

impl OperationBody {
    pub fn new(member_name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            property: PropertyBody::new(member_name),
            signature: signature.into(),
            formal_definition: None,
        }
    }
}

/// FC_RoleType
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    #[default]
    Ordinary,
    Aggregation,
    Composition,
}

/// FC_AssociationRole
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBody {
    #[serde(flatten)]
    pub property: PropertyBody,
    #[serde(default)]
    pub role_type: RoleType,
    #[serde(default)]
    pub is_ordered: bool,
    #[serde(default = "default_true")]
    pub is_navigable: bool,
}

fn default_true() -> bool {
    true
}

impl RoleBody {
    pub fn new(member_name: impl Into<String>) -> Self {
        Self {
            property: PropertyBody::new(member_name),
            role_type: RoleType::Ordinary,
            is_ordered: false,
            is_navigable: true,
        }
    }
}
