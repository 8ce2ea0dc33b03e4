//! Plugin contract.
//!
//! A plugin is a named, prioritized bundle of optional hooks. Every hook has a
//! default implementation that contributes nothing, so a plugin only
//! implements the hooks it cares about.
//!
//! # Example
//!
//! ```
//! use sheaf_document::{Node, NodeId};
//! use sheaf_renderer::{Plugin, PluginError, priority};
//!
//! /// Marks every callout as highlighted.
//! struct HighlightCallouts;
//!
//! impl Plugin for HighlightCallouts {
//!     fn name(&self) -> &str {
//!         "highlight-callouts"
//!     }
//!
//!     fn priority(&self) -> i32 {
//!         priority::EARLY
//!     }
//!
//!     fn transform_block(&self, node: &Node, _id: &NodeId) -> Result<Option<Node>, PluginError> {
//!         if node.node_type != "callout" {
//!             return Ok(None);
//!         }
//!         Ok(Some(node.clone().with_format("highlight", true)))
//!     }
//! }
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};
use sheaf_document::{Node, NodeId};

use crate::renderer::BlockRenderer;

/// Priority tiers. Lower values run earlier.
pub mod priority {
    pub const FIRST: i32 = 0;
    pub const EARLY: i32 = 25;
    /// Assigned to plugins that do not choose a priority.
    pub const DEFAULT: i32 = 50;
    pub const LATE: i32 = 75;
    pub const LAST: i32 = 100;
}

/// Error raised by a plugin hook.
///
/// Hook errors never escape the pipeline: they are logged with the plugin's
/// name and the plugin's contribution for that invocation is discarded.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("{0}")]
    Message(String),
    /// The hook panicked; the payload message is preserved.
    #[error("panicked: {0}")]
    Panicked(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl PluginError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Renderer chosen by a plugin for a node, with extra render-time properties.
///
/// Produced fresh per node per render pass.
#[derive(Clone)]
pub struct OverrideResult {
    pub renderer: Arc<dyn BlockRenderer>,
    pub props: Map<String, Value>,
}

impl OverrideResult {
    #[must_use]
    pub fn new(renderer: Arc<dyn BlockRenderer>) -> Self {
        Self {
            renderer,
            props: Map::new(),
        }
    }

    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Debug for OverrideResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideResult")
            .field("props", &self.props)
            .finish_non_exhaustive()
    }
}

/// Byte range of rewritten text that should render as `html` instead of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplacementSpan {
    pub start: usize,
    pub end: usize,
    pub html: String,
}

impl ReplacementSpan {
    #[must_use]
    pub fn new(start: usize, end: usize, html: impl Into<String>) -> Self {
        Self {
            start,
            end,
            html: html.into(),
        }
    }
}

/// Output of a text-transform hook.
///
/// Span offsets are measured against `text`, not against the hook's input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextTransformResult {
    pub text: String,
    pub spans: Vec<ReplacementSpan>,
}

impl TextTransformResult {
    #[must_use]
    pub fn new(text: impl Into<String>, spans: Vec<ReplacementSpan>) -> Self {
        Self {
            text: text.into(),
            spans,
        }
    }

    /// Result that leaves the text as-is with no replacements.
    #[must_use]
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }
}

/// Extension point of the rendering pipeline.
///
/// Plugins are shared across threads when sibling subtrees render in parallel,
/// so any internal state must be synchronized by the plugin itself.
pub trait Plugin: Send + Sync {
    /// Unique name used in diagnostics.
    fn name(&self) -> &str;

    /// Position in every pipeline stage; see [`priority`].
    fn priority(&self) -> i32 {
        priority::DEFAULT
    }

    /// Choose a renderer for the node. The first plugin returning `Some` wins.
    fn override_block(
        &self,
        _node: &Node,
        _id: &NodeId,
    ) -> Result<Option<OverrideResult>, PluginError> {
        Ok(None)
    }

    /// Rewrite the node before it is rendered. `None` leaves it unchanged.
    fn transform_block(&self, _node: &Node, _id: &NodeId) -> Result<Option<Node>, PluginError> {
        Ok(None)
    }

    /// Rewrite an undecorated run of inline text. `None` leaves it unchanged.
    fn transform_text(
        &self,
        _text: &str,
        _node: &Node,
    ) -> Result<Option<TextTransformResult>, PluginError> {
        Ok(None)
    }

    /// Called with the transformed node before its renderer is resolved.
    fn before_render(&self, _node: &Node, _id: &NodeId) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called after the node has been rendered.
    fn after_render(&self, _node: &Node, _id: &NodeId) -> Result<(), PluginError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl Plugin for Bare {
        fn name(&self) -> &str {
            "bare"
        }
    }

    #[test]
    fn test_default_hooks_contribute_nothing() {
        let node = Node::new("a", "text");
        let id = NodeId::from("a");
        let plugin = Bare;

        assert_eq!(plugin.priority(), priority::DEFAULT);
        assert!(plugin.override_block(&node, &id).unwrap().is_none());
        assert!(plugin.transform_block(&node, &id).unwrap().is_none());
        assert!(plugin.transform_text("hi", &node).unwrap().is_none());
        assert!(plugin.before_render(&node, &id).is_ok());
        assert!(plugin.after_render(&node, &id).is_ok());
    }

    #[test]
    fn test_plugin_error_display() {
        assert_eq!(PluginError::new("bad input").to_string(), "bad input");
        assert_eq!(
            PluginError::Panicked("boom".to_owned()).to_string(),
            "panicked: boom"
        );
    }
}
