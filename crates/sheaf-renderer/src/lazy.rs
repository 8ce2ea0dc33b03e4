//! Lazy render boundary.
//!
//! A [`LazyRenderer`] stands in for a renderer that is expensive to obtain.
//! The load runs on the rayon pool and never blocks a render pass:
//!
//! - in [`RenderMode::Server`] the placeholder is always rendered and no load
//!   is ever started;
//! - in [`RenderMode::Interactive`] the first render starts the load and shows
//!   the placeholder; once loaded, later passes delegate to the real renderer.
//!
//! A failed load renders an error placeholder and records a diagnostic instead
//! of failing the node.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::diagnostics::Stage;
use crate::renderer::{BlockProps, BlockRenderer, RenderError, RenderMode};
use crate::util::{escape_html, panic_message};

/// Error returned by a lazy loader.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{0}")]
    Message(String),
    #[error("panicked: {0}")]
    Panicked(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl LoadError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Produces the real renderer. Runs at most once per [`LazyRenderer`].
pub type Loader = dyn Fn() -> Result<Arc<dyn BlockRenderer>, LoadError> + Send + Sync;

/// Observable state of a lazy load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// No load has been requested yet.
    Idle,
    Pending,
    Ready,
    /// The load failed with the given message.
    Failed(String),
}

enum LoadState {
    Idle,
    Pending,
    Ready(Arc<dyn BlockRenderer>),
    Failed(String),
}

impl LoadState {
    fn status(&self) -> LoadStatus {
        match self {
            Self::Idle => LoadStatus::Idle,
            Self::Pending => LoadStatus::Pending,
            Self::Ready(_) => LoadStatus::Ready,
            Self::Failed(message) => LoadStatus::Failed(message.clone()),
        }
    }
}

struct Shared {
    state: Mutex<LoadState>,
    done: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Renderer obtained through a background load, with placeholder fallbacks.
pub struct LazyRenderer {
    name: String,
    loader: Arc<Loader>,
    placeholder: Option<Arc<dyn BlockRenderer>>,
    shared: Arc<Shared>,
}

impl LazyRenderer {
    /// Create a boundary. `name` appears in placeholders and diagnostics.
    pub fn new<F>(name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn BlockRenderer>, LoadError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            loader: Arc::new(loader),
            placeholder: None,
            shared: Arc::new(Shared {
                state: Mutex::new(LoadState::Idle),
                done: Condvar::new(),
            }),
        }
    }

    /// Replace the default skeleton shown while the load is pending.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: Arc<dyn BlockRenderer>) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn status(&self) -> LoadStatus {
        self.shared.lock().status()
    }

    /// Start the load in the background if it has not been started yet.
    pub fn preload(&self) {
        let mut state = self.shared.lock();
        if !matches!(*state, LoadState::Idle) {
            return;
        }
        *state = LoadState::Pending;
        drop(state);

        tracing::debug!(name = %self.name, "Starting lazy load");
        let loader = Arc::clone(&self.loader);
        let shared = Arc::clone(&self.shared);
        let name = self.name.clone();
        rayon::spawn(move || {
            let outcome = catch_unwind(AssertUnwindSafe(&*loader))
                .unwrap_or_else(|payload| Err(LoadError::Panicked(panic_message(payload.as_ref()))));
            let next = match outcome {
                Ok(renderer) => {
                    tracing::debug!(name = %name, "Lazy load finished");
                    LoadState::Ready(renderer)
                }
                Err(err) => LoadState::Failed(err.to_string()),
            };
            *shared.lock() = next;
            shared.done.notify_all();
        });
    }

    /// Block until a started load finishes or `timeout` elapses.
    ///
    /// Returns immediately when no load has been started.
    #[must_use]
    pub fn wait(&self, timeout: Duration) -> LoadStatus {
        let guard = self.shared.lock();
        let (guard, _) = self
            .shared
            .done
            .wait_timeout_while(guard, timeout, |state| matches!(state, LoadState::Pending))
            .unwrap_or_else(PoisonError::into_inner);
        guard.status()
    }

    fn render_placeholder(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        match &self.placeholder {
            Some(placeholder) => placeholder.render(props),
            None => Ok(Some(format!(
                r#"<div class="lazy-placeholder" data-lazy="{}" aria-busy="true"></div>"#,
                escape_html(&self.name)
            ))),
        }
    }

    fn render_failure(&self, props: &BlockProps<'_>, message: &str) -> String {
        props.diagnostics().record(Stage::LazyLoad, self.name.as_str(), message);
        let name = escape_html(&self.name);
        format!(r#"<div class="lazy-error" data-lazy="{name}">Failed to load {name}</div>"#)
    }
}

impl BlockRenderer for LazyRenderer {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        if props.mode == RenderMode::Server {
            return self.render_placeholder(props);
        }

        let settled = match &*self.shared.lock() {
            LoadState::Ready(renderer) => Some(Ok(Arc::clone(renderer))),
            LoadState::Failed(message) => Some(Err(message.clone())),
            LoadState::Idle | LoadState::Pending => None,
        };

        match settled {
            Some(Ok(renderer)) => renderer.render(props),
            Some(Err(message)) => Ok(Some(self.render_failure(props, &message))),
            None => {
                self.preload();
                self.render_placeholder(props)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::PluginChain;
    use crate::diagnostics::Diagnostics;
    use crate::inline::InlineContext;
    use crate::renderer::render_fn;
    use pretty_assertions::assert_eq;
    use serde_json::Map;
    use sheaf_document::Node;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn render_with(
        lazy: &LazyRenderer,
        mode: RenderMode,
        diagnostics: &Diagnostics,
    ) -> Option<String> {
        let chain = PluginChain::empty();
        let extra = Map::new();
        let node = Node::new("d", "code").with_text("title", "graph TD");
        let props = BlockProps {
            node: &node,
            id: &node.id,
            level: 0,
            children: None,
            extra: &extra,
            mode,
            production: false,
            inline: InlineContext::new(&chain, diagnostics),
        };
        lazy.render(&props).unwrap()
    }

    fn loaded() -> Result<Arc<dyn BlockRenderer>, LoadError> {
        Ok(Arc::new(render_fn(|_| Ok(Some("<svg></svg>".to_owned())))))
    }

    #[test]
    fn test_server_mode_renders_placeholder_and_never_loads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lazy = LazyRenderer::new("mermaid", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            loaded()
        });

        let html = render_with(&lazy, RenderMode::Server, &Diagnostics::new());

        assert_eq!(
            html.unwrap(),
            r#"<div class="lazy-placeholder" data-lazy="mermaid" aria-busy="true"></div>"#
        );
        assert_eq!(lazy.status(), LoadStatus::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_server_mode_placeholder_even_when_ready() {
        let lazy = LazyRenderer::new("mermaid", loaded);
        lazy.preload();
        assert_eq!(lazy.wait(TIMEOUT), LoadStatus::Ready);

        let html = render_with(&lazy, RenderMode::Server, &Diagnostics::new());
        assert!(html.unwrap().contains("lazy-placeholder"));
    }

    #[test]
    fn test_interactive_mode_loads_then_delegates() {
        let lazy = LazyRenderer::new("mermaid", loaded);
        let diagnostics = Diagnostics::new();

        let first = render_with(&lazy, RenderMode::Interactive, &diagnostics);
        // The loader may already have finished, but the first pass never waits
        assert!(first.unwrap().contains("lazy-placeholder"));

        assert_eq!(lazy.wait(TIMEOUT), LoadStatus::Ready);
        let second = render_with(&lazy, RenderMode::Interactive, &diagnostics);
        assert_eq!(second.unwrap(), "<svg></svg>");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_loader_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lazy = LazyRenderer::new("mermaid", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            loaded()
        });

        lazy.preload();
        lazy.preload();
        assert_eq!(lazy.wait(TIMEOUT), LoadStatus::Ready);
        lazy.preload();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_renders_error_placeholder() {
        let lazy = LazyRenderer::new("plotly", || Err(LoadError::new("module not found")));
        lazy.preload();
        assert_eq!(
            lazy.wait(TIMEOUT),
            LoadStatus::Failed("module not found".to_owned())
        );

        let diagnostics = Diagnostics::new();
        let html = render_with(&lazy, RenderMode::Interactive, &diagnostics);
        assert_eq!(
            html.unwrap(),
            r#"<div class="lazy-error" data-lazy="plotly">Failed to load plotly</div>"#
        );
        assert_eq!(
            diagnostics.into_entries()[0].to_string(),
            "lazy load error: plotly module not found"
        );
    }

    #[test]
    fn test_panicking_loader_is_contained() {
        let lazy = LazyRenderer::new("plotly", || panic!("bad bundle"));
        lazy.preload();
        assert_eq!(
            lazy.wait(TIMEOUT),
            LoadStatus::Failed("panicked: bad bundle".to_owned())
        );
    }

    #[test]
    fn test_custom_placeholder() {
        let lazy = LazyRenderer::new("mermaid", loaded).with_placeholder(Arc::new(render_fn(
            |props| Ok(Some(format!("<pre>{}</pre>", props.text_html("title")))),
        )));
        let html = render_with(&lazy, RenderMode::Server, &Diagnostics::new());
        assert_eq!(html.unwrap(), "<pre>graph TD</pre>");
    }

    #[test]
    fn test_wait_without_load_returns_idle() {
        let lazy = LazyRenderer::new("mermaid", loaded);
        assert_eq!(lazy.wait(Duration::from_millis(1)), LoadStatus::Idle);
    }
}
