//! Document nodes.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::text::{TextRun, plain_text};

/// Unique identifier of a node within a [`Document`](crate::Document).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One element of the block tree.
///
/// `children` and `parent` are weak references: they name other nodes in the
/// same document map and must be resolved through it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Type tag (`text`, `header`, `code`, ...).
    #[serde(rename = "type")]
    pub node_type: String,
    /// Named decorated-text properties (`title`, `language`, `caption`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Vec<TextRun>>,
    /// Free-form format and style attributes.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub format: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
    #[serde(default = "default_alive")]
    pub alive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
}

fn default_alive() -> bool {
    true
}

impl Node {
    /// Create a live node with no properties or children.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            properties: BTreeMap::new(),
            format: Map::new(),
            children: Vec::new(),
            alive: true,
            parent: None,
        }
    }

    /// Set a property to a single plain run.
    #[must_use]
    pub fn with_text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.properties
            .insert(name.into(), vec![TextRun::plain(text)]);
        self
    }

    /// Set a property to the given runs.
    #[must_use]
    pub fn with_runs(mut self, name: impl Into<String>, runs: Vec<TextRun>) -> Self {
        self.properties.insert(name.into(), runs);
        self
    }

    /// Set a format attribute.
    #[must_use]
    pub fn with_format(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.format.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_children<I, T>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_alive(mut self, alive: bool) -> Self {
        self.alive = alive;
        self
    }

    /// Runs of the named property, if present.
    #[must_use]
    pub fn runs(&self, name: &str) -> Option<&[TextRun]> {
        self.properties.get(name).map(Vec::as_slice)
    }

    /// Raw text of the named property with decorations dropped.
    #[must_use]
    pub fn plain_text(&self, name: &str) -> Option<String> {
        self.runs(name).map(plain_text)
    }

    /// String value of a format attribute.
    #[must_use]
    pub fn format_str(&self, key: &str) -> Option<&str> {
        self.format.get(key).and_then(Value::as_str)
    }
}
