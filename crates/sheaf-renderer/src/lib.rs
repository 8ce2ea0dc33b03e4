//! Plugin-driven renderer for sheaf block trees.
//!
//! This crate renders a [`sheaf_document::Document`] to HTML through an
//! ordered chain of [`Plugin`]s. Plugins can rewrite nodes before rendering,
//! pick the renderer for a node, and splice replacement HTML into inline text.
//!
//! # Architecture
//!
//! - [`PluginChain`]: plugins sorted by priority, shared by every stage
//! - [`transform_block`]: folds block transforms over a node
//! - [`RendererTable`]: caller override, plugin override, built-in, unknown
//! - [`transform_text`]: splices plugin replacement spans into text runs
//! - [`LazyRenderer`]: placeholder-first boundary around a background load
//! - [`DocumentRenderer`]: walks the tree and contains every failure per node
//!
//! Plugin and renderer failures never abort a render. They are logged with
//! `tracing` and returned as [`Diagnostic`]s alongside the HTML.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sheaf_document::{Document, Node, NodeId};
//! use sheaf_renderer::{DocumentRenderer, Plugin, PluginError, ReplacementSpan, TextTransformResult};
//!
//! /// Renders `TODO` as a badge.
//! struct TodoBadge;
//!
//! impl Plugin for TodoBadge {
//!     fn name(&self) -> &str {
//!         "todo-badge"
//!     }
//!
//!     fn transform_text(
//!         &self,
//!         text: &str,
//!         _node: &Node,
//!     ) -> Result<Option<TextTransformResult>, PluginError> {
//!         let Some(start) = text.find("TODO") else {
//!             return Ok(None);
//!         };
//!         let span = ReplacementSpan::new(start, start + 4, r#"<span class="badge">todo</span>"#);
//!         Ok(Some(TextTransformResult::new(text, vec![span])))
//!     }
//! }
//!
//! let document = Document::from_nodes([Node::new("p", "text").with_text("title", "TODO: ship")]);
//! let result = DocumentRenderer::new(vec![Arc::new(TodoBadge)]).render(&document, &NodeId::from("p"));
//! assert_eq!(result.html, r#"<p><span class="badge">todo</span>: ship</p>"#);
//! ```

mod block_transform;
mod blocks;
mod chain;
mod diagnostics;
mod inline;
mod lazy;
mod plugin;
mod renderer;
mod resolve;
mod text_transform;
mod util;
mod walker;

pub use block_transform::transform_block;
pub use blocks::{BlockType, UnknownBlock, builtin_renderer};
pub use chain::{PluginChain, sort_by_priority};
pub use diagnostics::{Diagnostic, Diagnostics, Stage};
pub use inline::{InlineContext, InlineRun, Replacement, render_runs};
pub use lazy::{LazyRenderer, LoadError, LoadStatus, Loader};
pub use plugin::{OverrideResult, Plugin, PluginError, ReplacementSpan, TextTransformResult, priority};
pub use renderer::{BlockProps, BlockRenderer, FnRenderer, RenderError, RenderMode, render_fn};
pub use resolve::{OverrideMatch, RendererSource, RendererTable, Resolved, resolve_override};
pub use text_transform::transform_text;
pub use util::escape_html;
pub use walker::{Affordance, DEFAULT_MAX_DEPTH, DocumentRenderer, RenderResult};
