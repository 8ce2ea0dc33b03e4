//! Tree walker: renders a document subtree through the plugin pipeline.

use std::collections::HashSet;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use rayon::prelude::*;
use sheaf_document::{Document, Node, NodeId};

use crate::block_transform::transform_block;
use crate::chain::PluginChain;
use crate::diagnostics::{Diagnostic, Diagnostics, Stage};
use crate::inline::InlineContext;
use crate::plugin::Plugin;
use crate::renderer::{BlockProps, BlockRenderer, RenderError, RenderMode};
use crate::resolve::RendererTable;
use crate::util::{escape_html, panic_message};

/// Default recursion limit; see [`DocumentRenderer::with_max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Result of rendering a document subtree.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML. Empty when the root rendered nothing.
    pub html: String,
    /// Failures contained during the pass, in the order they were recorded.
    pub diagnostics: Vec<Diagnostic>,
}

/// Which rendered blocks get the copy-link affordance.
#[derive(Clone, Default)]
pub enum Affordance {
    #[default]
    Never,
    Always,
    /// Blocks whose type tag is in the set.
    Types(HashSet<String>),
    /// Blocks whose type tag satisfies the predicate.
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Affordance {
    pub fn types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Types(types.into_iter().map(Into::into).collect())
    }

    pub fn predicate(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    #[must_use]
    pub fn applies(&self, node_type: &str) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::Types(types) => types.contains(node_type),
            Self::Predicate(f) => f(node_type),
        }
    }
}

impl From<bool> for Affordance {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Always } else { Self::Never }
    }
}

impl fmt::Debug for Affordance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("Never"),
            Self::Always => f.write_str("Always"),
            Self::Types(types) => f.debug_tuple("Types").field(types).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Renders nodes of a [`Document`] to HTML.
///
/// For each node the walker:
///
/// 1. skips missing, dead, and hidden nodes (they render nothing);
/// 2. folds block transforms over the node;
/// 3. notifies `before_render` hooks;
/// 4. resolves a renderer (caller override, plugin override, built-in, unknown);
/// 5. renders children, in parallel when enabled;
/// 6. renders the node;
/// 7. adds the copy-link affordance if configured;
/// 8. notifies `after_render` hooks.
///
/// Steps 2 to 8 run inside an error boundary: a renderer that fails or panics
/// is replaced by a fallback for that node alone.
///
/// # Example
///
/// ```
/// use sheaf_document::{Document, Node};
/// use sheaf_renderer::DocumentRenderer;
///
/// let document = Document::from_nodes([
///     Node::new("root", "page").with_text("title", "Notes").with_children(["p1"]),
///     Node::new("p1", "text").with_text("title", "Hello"),
/// ]);
///
/// let result = DocumentRenderer::new(Vec::new()).render(&document, &"root".into());
/// assert!(result.html.contains("<p>Hello</p>"));
/// ```
pub struct DocumentRenderer {
    chain: PluginChain,
    table: RendererTable,
    hidden: HashSet<NodeId>,
    affordance: Affordance,
    mode: RenderMode,
    production: bool,
    parallel: bool,
    max_depth: usize,
}

impl DocumentRenderer {
    /// Create a renderer. Plugins are sorted by priority once, here.
    #[must_use]
    pub fn new(plugins: Vec<Arc<dyn Plugin>>) -> Self {
        Self {
            chain: PluginChain::new(plugins),
            table: RendererTable::new(),
            hidden: HashSet::new(),
            affordance: Affordance::Never,
            mode: RenderMode::Server,
            production: false,
            parallel: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Register a caller override for a type tag.
    ///
    /// Caller overrides take precedence over every plugin.
    #[must_use]
    pub fn with_override(
        mut self,
        node_type: impl Into<String>,
        renderer: Arc<dyn BlockRenderer>,
    ) -> Self {
        self.table.set_override(node_type, renderer);
        self
    }

    /// Node ids that render nothing, e.g. blocks consumed as front matter.
    #[must_use]
    pub fn with_hidden<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        self.hidden.extend(ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_affordance(mut self, affordance: impl Into<Affordance>) -> Self {
        self.affordance = affordance.into();
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Production mode hides unknown-block placeholders.
    #[must_use]
    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Render sibling subtrees on the rayon pool.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Nodes nested deeper than `depth` below the root render nothing.
    ///
    /// Guards against cyclic child lists the content source failed to reject.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn chain(&self) -> &PluginChain {
        &self.chain
    }

    /// Render the subtree rooted at `root`.
    ///
    /// Never fails: every plugin and renderer failure is contained and
    /// reported in [`RenderResult::diagnostics`].
    #[must_use]
    pub fn render(&self, document: &Document, root: &NodeId) -> RenderResult {
        tracing::debug!(root = %root, nodes = document.len(), plugins = self.chain.len(), "Rendering document");
        let diagnostics = Diagnostics::new();
        let html = self
            .render_into(document, root, &diagnostics)
            .unwrap_or_default();
        RenderResult {
            html,
            diagnostics: diagnostics.into_entries(),
        }
    }

    /// Render the subtree rooted at `root`, recording into a caller-owned sink.
    ///
    /// Returns `None` if the root rendered nothing.
    pub fn render_into(
        &self,
        document: &Document,
        root: &NodeId,
        diagnostics: &Diagnostics,
    ) -> Option<String> {
        let pass = Pass {
            renderer: self,
            document,
            diagnostics,
        };
        pass.render_node(root, 0)
    }
}

impl fmt::Debug for DocumentRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentRenderer")
            .field("chain", &self.chain)
            .field("hidden", &self.hidden)
            .field("affordance", &self.affordance)
            .field("mode", &self.mode)
            .field("production", &self.production)
            .field("parallel", &self.parallel)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

/// State shared by every node of one render pass.
#[derive(Clone, Copy)]
struct Pass<'a> {
    renderer: &'a DocumentRenderer,
    document: &'a Document,
    diagnostics: &'a Diagnostics,
}

impl Pass<'_> {
    fn render_node(self, id: &NodeId, level: usize) -> Option<String> {
        let node = self.document.get(id)?;
        if !node.alive || self.renderer.hidden.contains(id) {
            return None;
        }
        if level > self.renderer.max_depth {
            self.diagnostics.record(Stage::MaxDepth, id.as_str(), level);
            return None;
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| self.render_live(node, id, level)))
            .unwrap_or_else(|payload| Err(RenderError::Panicked(panic_message(payload.as_ref()))));

        match outcome {
            Ok(html) => html,
            Err(err) => {
                self.diagnostics.record(
                    Stage::Render,
                    format!("{id} {}", node.node_type),
                    &err,
                );
                Some(fallback(id, &node.node_type))
            }
        }
    }

    fn render_live(
        self,
        node: &Node,
        id: &NodeId,
        level: usize,
    ) -> Result<Option<String>, RenderError> {
        let chain = &self.renderer.chain;
        let working = transform_block(node, id, chain, self.diagnostics);

        for plugin in chain.iter() {
            self.diagnostics.run_hook(Stage::BeforeRender, plugin, || {
                plugin.before_render(&working, id)
            });
        }

        let resolved = self
            .renderer
            .table
            .resolve(&working, id, chain, self.diagnostics);

        let children = self.render_children(&working, level);

        let props = BlockProps {
            node: &working,
            id,
            level,
            children,
            extra: &resolved.extra,
            mode: self.renderer.mode,
            production: self.renderer.production,
            inline: InlineContext::new(chain, self.diagnostics),
        };
        let html = resolved
            .renderer
            .render(&props)?
            .map(|html| self.with_affordance(html, &working, id));

        for plugin in chain.iter() {
            self.diagnostics.run_hook(Stage::AfterRender, plugin, || {
                plugin.after_render(&working, id)
            });
        }

        Ok(html)
    }

    /// Concatenated children HTML, or `None` for a leaf.
    fn render_children(self, node: &Node, level: usize) -> Option<String> {
        if node.children.is_empty() {
            return None;
        }
        let rendered: Vec<Option<String>> = if self.renderer.parallel {
            node.children
                .par_iter()
                .map(|child| self.render_node(child, level + 1))
                .collect()
        } else {
            node.children
                .iter()
                .map(|child| self.render_node(child, level + 1))
                .collect()
        };
        Some(rendered.into_iter().flatten().collect())
    }

    fn with_affordance(self, html: String, node: &Node, id: &NodeId) -> String {
        if !self.renderer.affordance.applies(&node.node_type) {
            return html;
        }
        let id = escape_html(id.as_str());
        format!(
            r##"<div class="block-actions" data-block-id="{id}">{html}<button class="copy-link" type="button" data-href="#{id}" aria-label="Copy link">#</button></div>"##
        )
    }
}

fn fallback(id: &NodeId, node_type: &str) -> String {
    format!(
        r#"<div class="block-error" data-block-id="{}" data-block-type="{}">Failed to render block</div>"#,
        escape_html(id.as_str()),
        escape_html(node_type)
    )
}
