//! Id-indexed document map.

use std::collections::HashMap;

use crate::node::{Node, NodeId};

/// Error loading a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Input was not a valid JSON node map.
    #[error("Document parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// A map key disagrees with the id stored in its node.
    #[error("Node key {key} does not match node id {id}")]
    MismatchedId { key: String, id: NodeId },
}

/// Flat map from node id to node, read-only during a render pass.
#[derive(Clone, Debug, Default)]
pub struct Document {
    nodes: HashMap<NodeId, Node>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from nodes, keyed by their own ids.
    ///
    /// A later node with a duplicate id replaces the earlier one.
    #[must_use]
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self {
            nodes: nodes
                .into_iter()
                .map(|node| (node.id.clone(), node))
                .collect(),
        }
    }

    /// Parse a JSON object mapping node ids to nodes.
    ///
    /// # Example
    ///
    /// ```
    /// use sheaf_document::Document;
    ///
    /// let doc = Document::from_json(r#"{"a": {"id": "a", "type": "text"}}"#).unwrap();
    /// assert_eq!(doc.len(), 1);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let raw: HashMap<String, Node> = serde_json::from_str(json)?;
        let mut nodes = HashMap::with_capacity(raw.len());
        for (key, node) in raw {
            if key != node.id.as_str() {
                return Err(DocumentError::MismatchedId { key, id: node.id });
            }
            nodes.insert(node.id.clone(), node);
        }
        Ok(Self { nodes })
    }

    pub fn insert(&mut self, node: Node) -> Option<Node> {
        self.nodes.insert(node.id.clone(), node)
    }

    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
