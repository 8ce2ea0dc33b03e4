//! `#tag` links.

use std::sync::LazyLock;

use regex::Regex;
use sheaf_document::Node;
use sheaf_renderer::{Plugin, PluginError, TextTransformResult, escape_html, priority};

use crate::rewrite::{Found, rewrite};

// A tag starts with a letter and is not preceded by a word character, `&`,
// `/` or another `#`, so `a#b`, `&#39;` and URL fragments are not tags.
static HASHTAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^\w&/#])#(\p{L}[\p{L}\p{N}_-]*)").unwrap());

/// Replaces `#tag` with an anchor to `<base><tag>`.
///
/// The `#` is dropped from the rewritten text; the span covers the tag word.
#[derive(Debug, Clone)]
pub struct HashtagPlugin {
    base: String,
    priority: i32,
}

impl Default for HashtagPlugin {
    fn default() -> Self {
        Self::new("/tags/")
    }
}

impl HashtagPlugin {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            priority: priority::DEFAULT,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Plugin for HashtagPlugin {
    fn name(&self) -> &str {
        "hashtags"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn transform_text(
        &self,
        text: &str,
        _node: &Node,
    ) -> Result<Option<TextTransformResult>, PluginError> {
        let found = HASHTAG_PATTERN.captures_iter(text).filter_map(|caps| {
            let whole = caps.get(0)?;
            let lead = caps.get(1)?.as_str();
            let tag = caps.get(2)?.as_str();
            Some(Found {
                range: whole.range(),
                lead,
                display: tag.to_owned(),
                html: format!(
                    r#"<a class="hashtag" href="{}{}">#{}</a>"#,
                    escape_html(&self.base),
                    escape_html(&tag.to_lowercase()),
                    escape_html(tag)
                ),
            })
        });
        Ok(rewrite(text, found))
    }
}
