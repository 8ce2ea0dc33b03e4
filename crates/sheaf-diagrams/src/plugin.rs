//! Diagram override plugin.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use sheaf_document::{Node, NodeId};
use sheaf_renderer::{
    BlockProps, BlockRenderer, LazyRenderer, LoadStatus, OverrideResult, Plugin, PluginError,
    RenderError, escape_html, priority, render_fn,
};

use crate::language::DiagramLanguage;

/// What a diagram shows until its renderer has loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiagramPlaceholder {
    /// Empty busy skeleton.
    #[default]
    Skeleton,
    /// The escaped diagram source.
    Source,
}

/// Renders `code` blocks written in a diagram language through a lazy boundary.
///
/// One [`LazyRenderer`] is kept per language for the lifetime of the plugin,
/// so a load started by one interactive pass is reused by the next.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use sheaf_diagrams::{DiagramLanguage, DiagramPlugin};
/// use sheaf_document::{Document, Node};
/// use sheaf_renderer::DocumentRenderer;
///
/// let plugin = DiagramPlugin::new().with_languages([DiagramLanguage::Mermaid]);
/// let document = Document::from_nodes([Node::new("d", "code")
///     .with_text("title", "graph TD; A-->B")
///     .with_text("language", "mermaid")]);
///
/// let result = DocumentRenderer::new(vec![Arc::new(plugin)]).render(&document, &"d".into());
/// assert!(result.html.contains("lazy-placeholder"));
/// ```
pub struct DiagramPlugin {
    priority: i32,
    languages: Option<HashSet<DiagramLanguage>>,
    placeholder: DiagramPlaceholder,
    boundaries: Mutex<HashMap<DiagramLanguage, Arc<LazyRenderer>>>,
}

impl Default for DiagramPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagramPlugin {
    /// Plugin handling every supported language.
    #[must_use]
    pub fn new() -> Self {
        Self {
            priority: priority::EARLY,
            languages: None,
            placeholder: DiagramPlaceholder::default(),
            boundaries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Restrict the plugin to the given languages.
    #[must_use]
    pub fn with_languages(mut self, languages: impl IntoIterator<Item = DiagramLanguage>) -> Self {
        self.languages = Some(languages.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: DiagramPlaceholder) -> Self {
        self.placeholder = placeholder;
        self
    }

    fn handles(&self, language: DiagramLanguage) -> bool {
        self.languages
            .as_ref()
            .is_none_or(|languages| languages.contains(&language))
    }

    /// Lazy boundary for a language, created on first use.
    fn boundary(&self, language: DiagramLanguage) -> Arc<LazyRenderer> {
        let mut boundaries = self
            .boundaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let placeholder = self.placeholder;
        Arc::clone(boundaries.entry(language).or_insert_with(|| {
            let lazy = LazyRenderer::new(language.as_str(), move || {
                tracing::debug!(language = %language, "Loading diagram renderer");
                Ok(Arc::new(DiagramRenderer { language }) as Arc<dyn BlockRenderer>)
            });
            let lazy = match placeholder {
                DiagramPlaceholder::Skeleton => lazy,
                DiagramPlaceholder::Source => lazy.with_placeholder(Arc::new(render_fn(
                    move |props| Ok(Some(source_placeholder(language, props))),
                ))),
            };
            Arc::new(lazy)
        }))
    }

    /// Wait for every started diagram load to settle.
    ///
    /// Returns `true` if all boundaries are loaded or failed before `timeout`.
    #[must_use]
    pub fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let boundaries: Vec<Arc<LazyRenderer>> = self
            .boundaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        boundaries.iter().all(|lazy| {
            let remaining = deadline.saturating_duration_since(Instant::now());
            !matches!(lazy.wait(remaining), LoadStatus::Pending)
        })
    }
}

impl Plugin for DiagramPlugin {
    fn name(&self) -> &str {
        "diagrams"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn override_block(
        &self,
        node: &Node,
        _id: &NodeId,
    ) -> Result<Option<OverrideResult>, PluginError> {
        if node.node_type != "code" {
            return Ok(None);
        }
        let Some(language) = node
            .plain_text("language")
            .as_deref()
            .and_then(DiagramLanguage::parse)
        else {
            return Ok(None);
        };
        if !self.handles(language) {
            return Ok(None);
        }
        Ok(Some(
            OverrideResult::new(self.boundary(language)).with_prop("language", language.as_str()),
        ))
    }
}

/// The loaded renderer: a figure with the diagram source for client-side rendering.
struct DiagramRenderer {
    language: DiagramLanguage,
}

impl BlockRenderer for DiagramRenderer {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        let source = props.node.plain_text("title").unwrap_or_default();
        let lang = self.language.as_str();
        Ok(Some(format!(
            r#"<figure class="diagram diagram-{lang}"><pre class="{lang}">{}</pre></figure>"#,
            escape_html(&source)
        )))
    }
}

fn source_placeholder(language: DiagramLanguage, props: &BlockProps<'_>) -> String {
    let source = props.node.plain_text("title").unwrap_or_default();
    format!(
        r#"<pre class="diagram-source" data-lazy="{language}" aria-busy="true">{}</pre>"#,
        escape_html(&source)
    )
}
