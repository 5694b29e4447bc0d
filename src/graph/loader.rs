//! Graph File Loading
//!
//! JSON interchange format for catalogue graphs: a flat node list plus a
//! link list. Nodes carry a file-local `key` so anonymous nodes can still be
//! linked; `key` is not the identifier and is not serialized into documents.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "key": "fc", "id": "FC1", "kind": "FeatureCatalogue", "name": "Roads" },
//!     { "key": "road", "id": "FT1", "kind": "FeatureType", "typeName": "Road" }
//!   ],
//!   "links": [
//!     { "from": "fc", "kind": "featureTypes", "to": "road" },
//!     { "from": "road", "kind": "catalogue", "to": "fc" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::{CatalogueGraph, NodeIndex};
use crate::config::OutputFormat;
use crate::error::{CatalogueError, Result};
use crate::model::{LinkKind, Node, NodeBody};

const ANONYMOUS_PREFIX: &str = "_:";

/// One node of a graph file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub body: NodeBody,
}

/// One link of a graph file, endpoints by node key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub from: String,
    pub kind: LinkKind,
    pub to: String,
}

/// A catalogue graph on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphFile {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

impl GraphFile {
    /// Read a graph file
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let file = Self::parse(&content)?;
        debug!(
            path = %path.display(),
            nodes = file.nodes.len(),
            links = file.links.len(),
            "read graph file"
        );
        Ok(file)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Write the graph file as JSON
    pub fn write(&self, path: &Path, format: OutputFormat) -> Result<()> {
        fs::write(path, self.to_string(format)?)?;
        Ok(())
    }

    pub fn to_string(&self, format: OutputFormat) -> Result<String> {
        let content = match format {
            OutputFormat::Pretty => serde_json::to_string_pretty(self)?,
            OutputFormat::Compact => serde_json::to_string(self)?,
        };
        Ok(content)
    }

    /// Build the in-memory graph. Returns the key -> node mapping alongside it.
    pub fn into_graph(self) -> Result<(CatalogueGraph, HashMap<String, NodeIndex>)> {
        let mut graph = CatalogueGraph::new();
        let mut keys: HashMap<String, NodeIndex> = HashMap::with_capacity(self.nodes.len());

        for record in self.nodes {
            if keys.contains_key(&record.key) {
                return Err(CatalogueError::InvalidDocument(format!(
                    "duplicate node key {}",
                    record.key
                )));
            }
            let index = graph.add_node(Node::from_parts(record.id, record.body))?;
            keys.insert(record.key, index);
        }

        for link in self.links {
            let from = *keys
                .get(&link.from)
                .ok_or_else(|| CatalogueError::UnknownKey(link.from.clone()))?;
            let to = *keys
                .get(&link.to)
                .ok_or_else(|| CatalogueError::UnknownKey(link.to.clone()))?;
            graph.link(from, link.kind, to)?;
        }

        Ok((graph, keys))
    }

    /// Snapshot a graph.
    ///
    /// Keys are the identifier, or `_:<index>` for anonymous nodes. The `_:`
    /// prefix is reserved: identifiers that start with it are keyed as
    /// `_:id:<identifier>`.
    pub fn from_graph(graph: &CatalogueGraph) -> Self {
        let key_of = |index: NodeIndex| match graph.node(index).and_then(|n| n.identifier()) {
            Some(id) if id.starts_with(ANONYMOUS_PREFIX) => format!("{}id:{}", ANONYMOUS_PREFIX, id),
            Some(id) => id.to_string(),
            None => format!("{}{}", ANONYMOUS_PREFIX, index.index()),
        };

        let nodes = graph
            .nodes()
            .map(|(index, node)| NodeRecord {
                key: key_of(index),
                id: node.identifier().map(str::to_string),
                body: node.body.clone(),
            })
            .collect();

        let mut links = Vec::with_capacity(graph.link_count());
        for (index, _) in graph.nodes() {
            for (link, target) in graph.links_out(index) {
                links.push(LinkRecord {
                    from: key_of(index),
                    kind: link.kind,
                    to: key_of(target),
                });
            }
        }

        Self { nodes, links }
    }
}
