//! Built-in block renderers.
//!
//! A deliberately small HTML renderer per known type tag. Applications that
//! need richer output register caller overrides or override plugins.

use std::fmt::Write;
use std::sync::Arc;

use crate::renderer::{BlockProps, BlockRenderer, RenderError};
use crate::util::escape_html;

/// Type tags with a built-in renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Page,
    Text,
    Header,
    SubHeader,
    SubSubHeader,
    Quote,
    Callout,
    Code,
    Divider,
    BulletedList,
    NumberedList,
    ToDo,
    Toggle,
    Image,
    ColumnList,
    Column,
}

impl BlockType {
    pub const ALL: [Self; 16] = [
        Self::Page,
        Self::Text,
        Self::Header,
        Self::SubHeader,
        Self::SubSubHeader,
        Self::Quote,
        Self::Callout,
        Self::Code,
        Self::Divider,
        Self::BulletedList,
        Self::NumberedList,
        Self::ToDo,
        Self::Toggle,
        Self::Image,
        Self::ColumnList,
        Self::Column,
    ];

    /// Parse a node type tag. Returns `None` for tags without a built-in renderer.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "page" => Some(Self::Page),
            "text" => Some(Self::Text),
            "header" => Some(Self::Header),
            "sub_header" => Some(Self::SubHeader),
            "sub_sub_header" => Some(Self::SubSubHeader),
            "quote" => Some(Self::Quote),
            "callout" => Some(Self::Callout),
            "code" => Some(Self::Code),
            "divider" => Some(Self::Divider),
            "bulleted_list" => Some(Self::BulletedList),
            "numbered_list" => Some(Self::NumberedList),
            "to_do" => Some(Self::ToDo),
            "toggle" => Some(Self::Toggle),
            "image" => Some(Self::Image),
            "column_list" => Some(Self::ColumnList),
            "column" => Some(Self::Column),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Text => "text",
            Self::Header => "header",
            Self::SubHeader => "sub_header",
            Self::SubSubHeader => "sub_sub_header",
            Self::Quote => "quote",
            Self::Callout => "callout",
            Self::Code => "code",
            Self::Divider => "divider",
            Self::BulletedList => "bulleted_list",
            Self::NumberedList => "numbered_list",
            Self::ToDo => "to_do",
            Self::Toggle => "toggle",
            Self::Image => "image",
            Self::ColumnList => "column_list",
            Self::Column => "column",
        }
    }
}

/// Built-in renderer for a block type.
#[must_use]
pub fn builtin_renderer(kind: BlockType) -> Arc<dyn BlockRenderer> {
    match kind {
        BlockType::Page => Arc::new(Page),
        BlockType::Text => Arc::new(Paragraph),
        BlockType::Header => Arc::new(Heading(2)),
        BlockType::SubHeader => Arc::new(Heading(3)),
        BlockType::SubSubHeader => Arc::new(Heading(4)),
        BlockType::Quote => Arc::new(Quote),
        BlockType::Callout => Arc::new(Callout),
        BlockType::Code => Arc::new(Code),
        BlockType::Divider => Arc::new(Divider),
        BlockType::BulletedList => Arc::new(ListItem { ordered: false }),
        BlockType::NumberedList => Arc::new(ListItem { ordered: true }),
        BlockType::ToDo => Arc::new(ToDo),
        BlockType::Toggle => Arc::new(Toggle),
        BlockType::Image => Arc::new(Image),
        BlockType::ColumnList => Arc::new(Container("column-list")),
        BlockType::Column => Arc::new(Container("column")),
    }
}

/// Placeholder for type tags nothing else handles.
///
/// Shows the raw type tag outside production mode, renders nothing in it.
pub struct UnknownBlock;

impl BlockRenderer for UnknownBlock {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        if props.production {
            return Ok(None);
        }
        let tag = escape_html(&props.node.node_type);
        Ok(Some(format!(
            r#"<div class="unknown-block" data-block-type="{tag}">Unknown block type: {tag}</div>"#
        )))
    }
}

struct Page;

impl BlockRenderer for Page {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        let mut out = format!(
            r#"<article class="page" data-block-id="{}">"#,
            escape_html(props.id.as_str())
        );
        let title = props.text_html("title");
        if !title.is_empty() {
            let _ = write!(out, r#"<h1 class="page-title">{title}</h1>"#);
        }
        out.push_str(props.children_html());
        out.push_str("</article>");
        Ok(Some(out))
    }
}

struct Paragraph;

impl BlockRenderer for Paragraph {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        let mut out = format!("<p>{}</p>", props.text_html("title"));
        if let Some(children) = &props.children {
            let _ = write!(out, r#"<div class="block-children">{children}</div>"#);
        }
        Ok(Some(out))
    }
}

struct Heading(u8);

impl BlockRenderer for Heading {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        let level = self.0;
        Ok(Some(format!(
            r#"<h{level} id="{}">{}</h{level}>"#,
            escape_html(props.id.as_str()),
            props.text_html("title")
        )))
    }
}

struct Quote;

impl BlockRenderer for Quote {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        Ok(Some(format!(
            "<blockquote>{}{}</blockquote>",
            props.text_html("title"),
            props.children_html()
        )))
    }
}

struct Callout;

impl BlockRenderer for Callout {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        let icon = props
            .node
            .format_str("icon")
            .map(|icon| format!(r#"<span class="callout-icon">{}</span>"#, escape_html(icon)))
            .unwrap_or_default();
        Ok(Some(format!(
            r#"<div class="callout">{icon}<div class="callout-text">{}{}</div></div>"#,
            props.text_html("title"),
            props.children_html()
        )))
    }
}

struct Code;

impl BlockRenderer for Code {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        // Code is shown verbatim: its text never goes through text transforms
        let content = props.node.plain_text("title").unwrap_or_default();
        let lang = props
            .node
            .plain_text("language")
            .map(|lang| lang.to_lowercase())
            .filter(|lang| !lang.is_empty());
        let html = match lang {
            Some(lang) => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(&lang),
                escape_html(&content)
            ),
            None => format!("<pre><code>{}</code></pre>", escape_html(&content)),
        };
        Ok(Some(html))
    }
}

struct Divider;

impl BlockRenderer for Divider {
    fn render(&self, _props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        Ok(Some("<hr>".to_owned()))
    }
}

struct ListItem {
    ordered: bool,
}

impl BlockRenderer for ListItem {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        let tag = if self.ordered { "ol" } else { "ul" };
        Ok(Some(format!(
            "<{tag}><li>{}{}</li></{tag}>",
            props.text_html("title"),
            props.children_html()
        )))
    }
}

struct ToDo;

impl BlockRenderer for ToDo {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        let checked = props
            .node
            .plain_text("checked")
            .is_some_and(|value| value == "Yes");
        let marker = if checked {
            r#"<input type="checkbox" checked disabled> "#
        } else {
            r#"<input type="checkbox" disabled> "#
        };
        Ok(Some(format!(
            r#"<div class="to-do">{marker}{}{}</div>"#,
            props.text_html("title"),
            props.children_html()
        )))
    }
}

struct Toggle;

impl BlockRenderer for Toggle {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        Ok(Some(format!(
            "<details><summary>{}</summary>{}</details>",
            props.text_html("title"),
            props.children_html()
        )))
    }
}

struct Image;

impl BlockRenderer for Image {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        let src = props
            .node
            .format_str("display_source")
            .map(ToOwned::to_owned)
            .or_else(|| props.node.plain_text("source"))
            .ok_or_else(|| RenderError::MissingProperty("source".to_owned()))?;
        let caption = props.text_html("caption");
        let alt = props.node.plain_text("caption").unwrap_or_default();

        let mut out = format!(
            r#"<figure><img src="{}" alt="{}">"#,
            escape_html(&src),
            escape_html(&alt)
        );
        if !caption.is_empty() {
            let _ = write!(out, "<figcaption>{caption}</figcaption>");
        }
        out.push_str("</figure>");
        Ok(Some(out))
    }
}

struct Container(&'static str);

impl BlockRenderer for Container {
    fn render(&self, props: &BlockProps<'_>) -> Result<Option<String>, RenderError> {
        Ok(Some(format!(
            r#"<div class="{}">{}</div>"#,
            self.0,
            props.children_html()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::PluginChain;
    use crate::diagnostics::Diagnostics;
    use crate::inline::InlineContext;
    use crate::renderer::RenderMode;
    use pretty_assertions::assert_eq;
    use serde_json::Map;
    use sheaf_document::{Decoration, Node, TextRun};

    fn render(node: &Node, children: Option<&str>, production: bool) -> Option<String> {
        let chain = PluginChain::empty();
        let diagnostics = Diagnostics::new();
        let extra = Map::new();
        let props = BlockProps {
            node,
            id: &node.id,
            level: 1,
            children: children.map(ToOwned::to_owned),
            extra: &extra,
            mode: RenderMode::Server,
            production,
            inline: InlineContext::new(&chain, &diagnostics),
        };
        let kind = BlockType::parse(&node.node_type);
        match kind {
            Some(kind) => builtin_renderer(kind).render(&props).unwrap(),
            None => UnknownBlock.render(&props).unwrap(),
        }
    }

    #[test]
    fn test_parse_round_trips() {
        for kind in BlockType::ALL {
            assert_eq!(BlockType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(BlockType::parse("embed"), None);
    }

    #[test]
    fn test_paragraph_with_decorations() {
        let node = Node::new("p", "text").with_runs(
            "title",
            vec![
                TextRun::plain("Hello "),
                TextRun::decorated("world", vec![Decoration::Bold]),
            ],
        );
        assert_eq!(
            render(&node, None, false).unwrap(),
            "<p>Hello <strong>world</strong></p>"
        );
    }

    #[test]
    fn test_paragraph_children() {
        let node = Node::new("p", "text").with_text("title", "parent");
        assert_eq!(
            render(&node, Some("<p>child</p>"), false).unwrap(),
            r#"<p>parent</p><div class="block-children"><p>child</p></div>"#
        );
    }

    #[test]
    fn test_heading_levels() {
        let node = Node::new("h", "sub_header").with_text("title", "Intro");
        assert_eq!(render(&node, None, false).unwrap(), r#"<h3 id="h">Intro</h3>"#);
    }

    #[test]
    fn test_code_block_is_escaped_and_lowercased() {
        let node = Node::new("c", "code")
            .with_text("title", "a < b")
            .with_text("language", "JavaScript");
        assert_eq!(
            render(&node, None, false).unwrap(),
            r#"<pre><code class="language-javascript">a &lt; b</code></pre>"#
        );
    }

    #[test]
    fn test_to_do_checked() {
        let node = Node::new("t", "to_do")
            .with_text("title", "ship")
            .with_text("checked", "Yes");
        let html = render(&node, None, false).unwrap();
        assert!(html.contains("checked disabled"));
        assert!(html.contains("ship"));
    }

    #[test]
    fn test_image_requires_source() {
        let chain = PluginChain::empty();
        let diagnostics = Diagnostics::new();
        let extra = Map::new();
        let node = Node::new("i", "image");
        let props = BlockProps {
            node: &node,
            id: &node.id,
            level: 0,
            children: None,
            extra: &extra,
            mode: RenderMode::Server,
            production: false,
            inline: InlineContext::new(&chain, &diagnostics),
        };
        let err = Image.render(&props).unwrap_err();
        assert!(matches!(err, RenderError::MissingProperty(_)));
    }

    #[test]
    fn test_image_with_caption() {
        let node = Node::new("i", "image")
            .with_format("display_source", "/img/a.png")
            .with_text("caption", "Diagram");
        assert_eq!(
            render(&node, None, false).unwrap(),
            r#"<figure><img src="/img/a.png" alt="Diagram"><figcaption>Diagram</figcaption></figure>"#
        );
    }

    #[test]
    fn test_unknown_block_diagnostic_mode() {
        let node = Node::new("x", "kanban_board");
        assert_eq!(
            render(&node, None, false).unwrap(),
            r#"<div class="unknown-block" data-block-type="kanban_board">Unknown block type: kanban_board</div>"#
        );
    }

    #[test]
    fn test_unknown_block_production_renders_nothing() {
        let node = Node::new("x", "kanban_board");
        assert!(render(&node, None, true).is_none());
    }
}
