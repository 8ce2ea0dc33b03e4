//! Block renderer trait and the properties passed to it.

use serde_json::{Map, Value};
use sheaf_document::{Node, NodeId};

use crate::diagnostics::Diagnostics;
use crate::inline::{InlineContext, InlineRun, render_runs};

/// Error returned by a block renderer.
///
/// Caught by the per-node error boundary and replaced by a fallback.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{0}")]
    Message(String),
    #[error("missing property: {0}")]
    MissingProperty(String),
    #[error("panicked: {0}")]
    Panicked(String),
}

impl RenderError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Whether the pass can wait for asynchronous work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Non-interactive render: lazy boundaries always show their placeholder.
    #[default]
    Server,
    /// Interactive render: lazy boundaries load in the background and swap in
    /// the real renderer on a later pass.
    Interactive,
}

/// Everything a renderer receives for one node.
pub struct BlockProps<'a> {
    /// The node after block transforms.
    pub node: &'a Node,
    pub id: &'a NodeId,
    /// Depth below the render root (root is 0).
    pub level: usize,
    /// Concatenated HTML of rendered children, or `None` if the node has none.
    pub children: Option<String>,
    /// Extra properties supplied by the override that selected this renderer.
    pub extra: &'a Map<String, Value>,
    pub mode: RenderMode,
    /// Production mode hides diagnostic placeholders.
    pub production: bool,
    pub inline: InlineContext<'a>,
}

impl BlockProps<'_> {
    /// Run a property through the text transform pipeline.
    #[must_use]
    pub fn inline_runs(&self, name: &str) -> Vec<InlineRun> {
        self.node
            .runs(name)
            .map(|runs| self.inline.transform(runs, self.node))
            .unwrap_or_default()
    }

    /// Transform and render a property as inline HTML. Missing properties
    /// render as an empty string.
    #[must_use]
    pub fn text_html(&self, name: &str) -> String {
        render_runs(&self.inline_runs(name))
    }

    /// Children HTML, or an empty string.
    #[must_use]
    pub fn children_html(&self) -> &str {
        self.children.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        self.inline.diagnostics
    }
}

/// Renders one node to an HTML fragment, or nothing.
pub trait BlockRenderer: Send + Sync {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError>;
}

/// Renderer backed by a closure; see [`render_fn`].
pub struct FnRenderer<F>(F);

impl<F> BlockRenderer for FnRenderer<F>
where
    F: Fn(&BlockProps<'_>) -> Result<Option<String>, RenderError> + Send + Sync,
{
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        (self.0)(props)
    }
}

/// Wrap a closure as a [`BlockRenderer`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use sheaf_renderer::{BlockRenderer, render_fn};
///
/// let renderer: Arc<dyn BlockRenderer> =
///     Arc::new(render_fn(|props| Ok(Some(format!("<p>{}</p>", props.text_html("title"))))));
/// ```
pub fn render_fn<F>(f: F) -> FnRenderer<F>
where
    F: Fn(&BlockProps<'_>) -> Result<Option<String>, RenderError> + Send + Sync,
{
    FnRenderer(f)
}
