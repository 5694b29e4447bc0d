//! Projected document shape
//!
//! Full occurrence:
//! ```json
//! { "kind": "FeatureType", "id": "A", "typeName": "Road", "isAbstract": false,
//!   "featureCatalogue": { "kind": "FeatureCatalogue", "id": "FC", "isReference": true },
//!   "inheritsFrom": [ { "kind": "InheritanceRelation", "id": "R", ... } ] }
//! ```
//! Stub: `kind`, `id` and `"isReference": true`, nothing else. Many-valued
//! fields are arrays, single-valued fields are objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ProjectedLink, ProjectedNode};
use crate::checksum::Checksum;
use crate::config::{ExportConfig, OutputFormat};
use crate::error::{CatalogueError, Result};
use crate::model::{LinkKind, NodeBody, NodeKind};

const KIND: &str = "kind";
const ID: &str = "id";
const IS_REFERENCE: &str = "isReference";

/// Occurrence counts of a projected tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionStats {
    pub full: usize,
    pub stubs: usize,
}

impl ProjectionStats {
    pub fn of(tree: &ProjectedNode) -> Self {
        tree.iter().fold(Self::default(), |mut stats, node| {
            if node.is_stub() {
                stats.stubs += 1;
            } else {
                stats.full += 1;
            }
            stats
        })
    }
}

impl ProjectedNode {
    /// Render as a JSON document node
    pub fn to_json(&self) -> Result<Value> {
        let mut map = match (&self.body, self.reference) {
            (Some(body), false) => match serde_json::to_value(body)? {
                Value::Object(map) => map,
                other => {
                    return Err(CatalogueError::InvalidDocument(format!(
                        "body of {} did not serialize to an object: {}",
                        self.kind, other
                    )))
                }
            },
            _ => {
                let mut map = Map::new();
                map.insert(KIND.to_string(), Value::String(self.kind.as_str().to_string()));
                map
            }
        };

        if let Some(id) = &self.identifier {
            map.insert(ID.to_string(), Value::String(id.clone()));
        }

        if self.reference {
            map.insert(IS_REFERENCE.to_string(), Value::Bool(true));
            return Ok(Value::Object(map));
        }

        for link in &self.links {
            let field = link.kind.field_name();
            let target = link.target.to_json()?;
            if link.kind.is_many() {
                match map
                    .entry(field)
                    .or_insert_with(|| Value::Array(Vec::new()))
                {
                    Value::Array(items) => items.push(target),
                    _ => {
                        return Err(CatalogueError::InvalidDocument(format!(
                            "field {} of {} clashes with a body field",
                            field, self.kind
                        )))
                    }
                }
            } else {
                map.insert(field.to_string(), target);
            }
        }

        Ok(Value::Object(map))
    }

    /// Parse a JSON document node
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(CatalogueError::InvalidDocument(format!(
                "expected an object, got {}",
                value
            )));
        };

        let kind_name = map
            .get(KIND)
            .and_then(Value::as_str)
            .ok_or_else(|| CatalogueError::InvalidDocument("node without kind".to_string()))?;
        let kind = NodeKind::parse(kind_name)
            .ok_or_else(|| CatalogueError::InvalidDocument(format!("unknown kind {}", kind_name)))?;

        let identifier = match map.get(ID) {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => crate::model::normalize_identifier(Some(id.clone())),
            Some(other) => {
                return Err(CatalogueError::InvalidDocument(format!(
                    "identifier must be a string, got {}",
                    other
                )))
            }
        };

        let reference = map.get(IS_REFERENCE).and_then(Value::as_bool).unwrap_or(false);
        if reference {
            return Ok(ProjectedNode {
                kind,
                identifier,
                reference: true,
                body: None,
                links: Vec::new(),
            });
        }

        let mut body_fields = Map::new();
        let mut links = Vec::new();

        for (key, field_value) in map {
            if key == ID || key == IS_REFERENCE {
                continue;
            }
            let Some(link_kind) = LinkKind::from_field(kind, key) else {
                body_fields.insert(key.clone(), field_value.clone());
                continue;
            };

            match (link_kind.is_many(), field_value) {
                (true, Value::Array(items)) => {
                    for item in items {
                        links.push(ProjectedLink {
                            kind: link_kind,
                            target: ProjectedNode::from_json(item)?,
                        });
                    }
                }
                (false, Value::Object(_)) => links.push(ProjectedLink {
                    kind: link_kind,
                    target: ProjectedNode::from_json(field_value)?,
                }),
                _ => {
                    return Err(CatalogueError::InvalidDocument(format!(
                        "field {} of {} has the wrong shape",
                        key, kind
                    )))
                }
            }
        }

        // Stable: keeps array order within a field
        links.sort_by_key(|l| l.kind);

        let body: NodeBody = serde_json::from_value(Value::Object(body_fields))?;
        Ok(ProjectedNode {
            kind,
            identifier,
            reference: false,
            body: Some(body),
            links,
        })
    }
}

/// A projected document: the tree plus metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: ProjectedNode,
    pub stats: ProjectionStats,
    /// Checksum of the root JSON only, so it is independent of `generated_at`
    pub checksum: Checksum,
    pub generated_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(root: ProjectedNode) -> Result<Self> {
        let checksum = Checksum::of(&root.to_json()?)?;
        Ok(Self {
            stats: ProjectionStats::of(&root),
            root,
            checksum,
            generated_at: Some(Utc::now()),
        })
    }

    pub fn to_json(&self, export: &ExportConfig) -> Result<Value> {
        let mut map = Map::new();
        if export.include_timestamp {
            if let Some(at) = self.generated_at {
                map.insert("generatedAt".to_string(), Value::String(at.to_rfc3339()));
            }
        }
        if export.include_checksum {
            map.insert("checksum".to_string(), Value::String(self.checksum.to_string()));
        }
        map.insert("stats".to_string(), serde_json::to_value(self.stats)?);
        map.insert("root".to_string(), self.root.to_json()?);
        Ok(Value::Object(map))
    }

    pub fn to_string(&self, export: &ExportConfig) -> Result<String> {
        let value = self.to_json(export)?;
        let content = match export.output_format {
            OutputFormat::Pretty => serde_json::to_string_pretty(&value)?,
            OutputFormat::Compact => serde_json::to_string(&value)?,
        };
        Ok(content)
    }

    /// Parse a document. An embedded checksum must match the root.
    pub fn from_json(value: &Value) -> Result<Self> {
        let root_value = value
            .get("root")
            .ok_or_else(|| CatalogueError::InvalidDocument("document without root".to_string()))?;
        let root = ProjectedNode::from_json(root_value)?;

        let checksum = match value.get("checksum").and_then(Value::as_str) {
            Some(expected) => {
                let expected = Checksum::parse(expected)?;
                if !expected.matches(root_value)? {
                    return Err(CatalogueError::InvalidDocument(format!(
                        "checksum mismatch: expected {}, got {}",
                        expected,
                        Checksum::of(root_value)?
                    )));
                }
                expected
            }
            None => Checksum::of(root_value)?,
        };

        let generated_at = value
            .get("generatedAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|at| at.with_timezone(&Utc));

        Ok(Self {
            stats: ProjectionStats::of(&root),
            root,
            checksum,
            generated_at,
        })
    }

    /// Parse document text of any nesting depth.
    ///
    /// Every inheritance or association step nests about three JSON levels,
    /// so long chains exceed serde_json's default limit of 128. The limit is
    /// lifted and deep values grow the stack on the heap instead.
    pub fn parse(content: &str) -> Result<Self> {
        let mut json = serde_json::Deserializer::from_str(content);
        json.disable_recursion_limit();
        let value = Value::deserialize(serde_stacker::Deserializer::new(&mut json))?;
        json.end()?;
        Self::from_json(&value)
    }
}
