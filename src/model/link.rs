//! Typed links between catalogue nodes

use serde::{Deserialize, Serialize};

use super::NodeKind;
use crate::error::{CatalogueError, Result};

/// A typed outgoing field of a node.
///
/// Declaration order is the serialization order: when a node is walked,
/// its links are visited sorted by kind, then by position within the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkKind {
    /// Catalogue -> member feature types
    FeatureTypes,
    /// Feature type -> owning catalogue
    Catalogue,
    /// Feature type (subtype side) -> inheritance relation
    InheritsFrom,
    /// Feature type (supertype side) -> inheritance relation
    InheritsTo,
    /// Feature type -> carried properties
    Characteristics,
    /// Association -> its roles
    Roles,
    /// Inheritance relation -> subtype
    Subtype,
    /// Inheritance relation -> supertype
    Supertype,
    /// Property -> owning feature type
    FeatureType,
    /// Role -> association
    Relation,
    /// Role -> feature type playing the role
    ValueType,
}

impl LinkKind {
    pub const ALL: [LinkKind; 11] = [
        LinkKind::FeatureTypes,
        LinkKind::Catalogue,
        LinkKind::InheritsFrom,
        LinkKind::InheritsTo,
        LinkKind::Characteristics,
        LinkKind::Roles,
        LinkKind::Subtype,
        LinkKind::Supertype,
        LinkKind::FeatureType,
        LinkKind::Relation,
        LinkKind::ValueType,
    ];

    /// Field name in the serialized document
    pub fn field_name(&self) -> &'static str {
        match self {
            LinkKind::FeatureTypes => "featureType",
            LinkKind::Catalogue => "featureCatalogue",
            LinkKind::InheritsFrom => "inheritsFrom",
            LinkKind::InheritsTo => "inheritsTo",
            LinkKind::Characteristics => "carrierOfCharacteristics",
            LinkKind::Roles => "roleName",
            LinkKind::Subtype => "subtype",
            LinkKind::Supertype => "supertype",
            LinkKind::FeatureType => "featureType",
            LinkKind::Relation => "relation",
            LinkKind::ValueType => "valueType",
        }
    }

    /// Whether the field holds a list
    pub fn is_many(&self) -> bool {
        matches!(
            self,
            LinkKind::FeatureTypes
                | LinkKind::InheritsFrom
                | LinkKind::InheritsTo
                | LinkKind::Characteristics
                | LinkKind::Roles
        )
    }

    pub fn valid_source(&self, kind: NodeKind) -> bool {
        match self {
            LinkKind::FeatureTypes => kind == NodeKind::FeatureCatalogue,
            LinkKind::Catalogue
            | LinkKind::InheritsFrom
            | LinkKind::InheritsTo
            | LinkKind::Characteristics => kind.is_feature_type(),
            LinkKind::Roles => kind == NodeKind::FeatureAssociation,
            LinkKind::Subtype | LinkKind::Supertype => kind == NodeKind::InheritanceRelation,
            LinkKind::FeatureType => kind.is_property(),
            LinkKind::Relation | LinkKind::ValueType => kind == NodeKind::AssociationRole,
        }
    }

    pub fn valid_target(&self, kind: NodeKind) -> bool {
        match self {
            LinkKind::FeatureTypes
            | LinkKind::Subtype
            | LinkKind::Supertype
            | LinkKind::FeatureType
            | LinkKind::ValueType => kind.is_feature_type(),
            LinkKind::Catalogue => kind == NodeKind::FeatureCatalogue,
            LinkKind::InheritsFrom | LinkKind::InheritsTo => kind == NodeKind::InheritanceRelation,
            LinkKind::Characteristics => kind.is_property(),
            LinkKind::Roles => kind == NodeKind::AssociationRole,
            LinkKind::Relation => kind == NodeKind::FeatureAssociation,
        }
    }

    /// Check that this link may connect `from` to `to`
    pub fn check(&self, from: NodeKind, to: NodeKind) -> Result<()> {
        if !self.valid_source(from) {
            return Err(self.invalid(from, to, format!("{} has no such field", from)));
        }
        if !self.valid_target(to) {
            return Err(self.invalid(from, to, format!("field cannot hold a {}", to)));
        }
        Ok(())
    }

    pub(crate) fn invalid(&self, from: NodeKind, to: NodeKind, reason: impl Into<String>) -> CatalogueError {
        CatalogueError::InvalidLink {
            kind: *self,
            from,
            to,
            reason: reason.into(),
        }
    }

    /// Map a document field of a node of kind `source` back to its link kind.
    ///
    /// `featureType` is ambiguous in isolation (catalogue member list vs.
    /// property owner); the source kind decides.
    pub fn from_field(source: NodeKind, field: &str) -> Option<LinkKind> {
        Self::ALL
            .into_iter()
            .find(|k| k.field_name() == field && k.valid_source(source))
    }
}

/// Edge weight in the catalogue graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Link {
    pub kind: LinkKind,
    /// Position within a many-valued field, 0 for single-valued fields
    pub position: u32,
}
