//! `[[Target]]` and `[[Target|Label]]` links.

use std::sync::LazyLock;

use regex::Regex;
use sheaf_document::Node;
use sheaf_renderer::{Plugin, PluginError, TextTransformResult, escape_html, priority};

use crate::rewrite::{Found, rewrite};

static WIKILINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]|]+)(?:\|([^\[\]]+))?\]\]").unwrap());

/// Replaces wikilinks with anchors to `<base><slug>`.
///
/// The slug is the trimmed target with whitespace runs collapsed to `-`.
/// Links with a blank target are left as literal text.
#[derive(Debug, Clone)]
pub struct WikilinkPlugin {
    base: String,
    priority: i32,
}

impl Default for WikilinkPlugin {
    fn default() -> Self {
        Self::new("/")
    }
}

impl WikilinkPlugin {
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

    fn href(&self, target: &str) -> String {
        let slug = target.split_whitespace().collect::<Vec<_>>().join("-");
        format!("{}{slug}", self.base)
    }
}

impl Plugin for WikilinkPlugin {
    fn name(&self) -> &str {
        "wikilinks"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn transform_text(
        &self,
        text: &str,
        _node: &Node,
    ) -> Result<Option<TextTransformResult>, PluginError> {
        let found = WIKILINK_PATTERN.captures_iter(text).filter_map(|caps| {
            let whole = caps.get(0)?;
            let target = caps.get(1)?.as_str().trim();
            if target.is_empty() {
                return None;
            }
            let label = caps
                .get(2)
                .map(|m| m.as_str().trim())
                .filter(|label| !label.is_empty())
                .unwrap_or(target);
            Some(Found {
                range: whole.range(),
                lead: "",
                display: label.to_owned(),
                html: format!(
                    r#"<a class="wikilink" href="{}">{}</a>"#,
                    escape_html(&self.href(target)),
                    escape_html(label)
                ),
            })
        });
        Ok(rewrite(text, found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheaf_renderer::ReplacementSpan;

    fn transform(plugin: &WikilinkPlugin, text: &str) -> Option<TextTransformResult> {
        plugin.transform_text(text, &Node::new("p", "text")).unwrap()
    }

    #[test]
    fn test_simple_link() {
        let result = transform(&WikilinkPlugin::new("/wiki/"), "see [[Home]] now").unwrap();
        assert_eq!(result.text, "see Home now");
        assert_eq!(
            result.spans,
            vec![ReplacementSpan::new(
                4,
                8,
                r#"<a class="wikilink" href="/wiki/Home">Home</a>"#
            )]
        );
    }

    #[test]
    fn test_labelled_link_and_slug() {
        let result = transform(&WikilinkPlugin::default(), "[[Getting  Started|the guide]]").unwrap();
        assert_eq!(result.text, "the guide");
        assert_eq!(
            result.spans[0].html,
            r#"<a class="wikilink" href="/Getting-Started">the guide</a>"#
        );
    }

    #[test]
    fn test_multiple_links() {
        let result = transform(&WikilinkPlugin::default(), "[[A]] and [[B|bee]]").unwrap();
        assert_eq!(result.text, "A and bee");
        let covered: Vec<&str> = result
            .spans
            .iter()
            .map(|span| &result.text[span.start..span.end])
            .collect();
        assert_eq!(covered, vec!["A", "bee"]);
    }

    #[test]
    fn test_label_is_escaped() {
        let result = transform(&WikilinkPlugin::default(), "[[Q&A|<Q&A>]]").unwrap();
        assert_eq!(
            result.spans[0].html,
            r#"<a class="wikilink" href="/Q&amp;A">&lt;Q&amp;A&gt;</a>"#
        );
    }

    #[test]
    fn test_blank_target_left_alone() {
        assert!(transform(&WikilinkPlugin::default(), "[[ ]]").is_none());
        assert!(transform(&WikilinkPlugin::default(), "no links [here]").is_none());
    }
}
