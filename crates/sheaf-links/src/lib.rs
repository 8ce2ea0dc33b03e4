//! Inline link plugins for sheaf.
//!
//! - [`WikilinkPlugin`]: `[[Target]]` and `[[Target|Label]]`
//! - [`HashtagPlugin`]: `#tag`
//!
//! Both are text transforms: they rewrite undecorated text runs and mark the
//! link text as a replacement span. Register wikilinks first so that a `#`
//! inside a wikilink label is never seen by the hashtag matcher.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sheaf_document::{Document, Node};
//! use sheaf_links::{HashtagPlugin, WikilinkPlugin};
//! use sheaf_renderer::DocumentRenderer;
//!
//! let document = Document::from_nodes([
//!     Node::new("p", "text").with_text("title", "[[C#]] notes #lang"),
//! ]);
//! let renderer = DocumentRenderer::new(vec![
//!     Arc::new(WikilinkPlugin::new("/wiki/")),
//!     Arc::new(HashtagPlugin::new("/tags/")),
//! ]);
//!
//! let html = renderer.render(&document, &"p".into()).html;
//! assert_eq!(
//!     html,
//!     r##"<p><a class="wikilink" href="/wiki/C#">C#</a> notes <a class="hashtag" href="/tags/lang">#lang</a></p>"##
//! );
//! ```

mod hashtag;
mod rewrite;
mod wikilink;

pub use hashtag::HashtagPlugin;
pub use wikilink::WikilinkPlugin;
