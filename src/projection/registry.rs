//! Identity registry: identifier -> node, scoped to one projection pass

use std::collections::HashMap;

use crate::graph::NodeIndex;

/// Nodes visited so far in the current pass, by identifier.
///
/// A lookup miss is the normal "not yet visited" answer, not an error.
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    entries: HashMap<String, NodeIndex>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit. Re-registering an identifier keeps the first node.
    pub fn register(&mut self, identifier: &str, node: NodeIndex) {
        self.entries.entry(identifier.to_string()).or_insert(node);
    }

    pub fn lookup(&self, identifier: &str) -> Option<NodeIndex> {
        self.entries.get(identifier).copied()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeIndex)> {
        self.entries.iter().map(|(id, index)| (id.as_str(), *index))
    }
}
