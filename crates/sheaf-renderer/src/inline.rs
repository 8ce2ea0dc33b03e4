//! Inline runs after text transformation, and their HTML rendering.

use sheaf_document::{Decoration, Node, TextRun};

use crate::chain::PluginChain;
use crate::diagnostics::Diagnostics;
use crate::text_transform::transform_text;
use crate::util::escape_html;

/// Content produced by a text-transform plugin in place of a span of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replacement {
    /// The text the span covered.
    pub source: String,
    /// HTML to emit verbatim.
    pub html: String,
    /// Name of the plugin that produced it.
    pub plugin: String,
}

/// One run of inline content.
///
/// `Replaced` runs are opaque: no later text transform looks inside them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InlineRun {
    Text(TextRun),
    Replaced(Replacement),
}

impl InlineRun {
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Text(TextRun::plain(text))
    }

    /// Text of a plain run that transforms may rewrite; `None` for decorated
    /// and replaced runs.
    #[must_use]
    pub fn transformable_text(&self) -> Option<&str> {
        match self {
            Self::Text(run) if !run.is_decorated() => Some(&run.text),
            _ => None,
        }
    }
}

impl From<TextRun> for InlineRun {
    fn from(run: TextRun) -> Self {
        Self::Text(run)
    }
}

/// Plugin chain and diagnostics sink handed to renderers for inline text.
#[derive(Clone, Copy)]
pub struct InlineContext<'a> {
    pub chain: &'a PluginChain,
    pub diagnostics: &'a Diagnostics,
}

impl<'a> InlineContext<'a> {
    #[must_use]
    pub fn new(chain: &'a PluginChain, diagnostics: &'a Diagnostics) -> Self {
        Self { chain, diagnostics }
    }

    #[must_use]
    pub fn transform(&self, runs: &[TextRun], node: &Node) -> Vec<InlineRun> {
        transform_text(runs, node, self.chain, self.diagnostics)
    }
}

/// Render inline runs to HTML.
#[must_use]
pub fn render_runs(runs: &[InlineRun]) -> String {
    let mut out = String::new();
    for run in runs {
        match run {
            InlineRun::Text(run) => render_text_run(run, &mut out),
            InlineRun::Replaced(replacement) => out.push_str(&replacement.html),
        }
    }
    out
}

fn render_text_run(run: &TextRun, out: &mut String) {
    // Equations replace their text with the expression source
    let text = run
        .decorations
        .iter()
        .find_map(|d| match d {
            Decoration::Equation(expr) => Some(expr.as_str()),
            _ => None,
        })
        .unwrap_or(&run.text);

    let mut html = escape_html(text);
    // Innermost decoration first so the first listed ends up outermost
    for decoration in run.decorations.iter().rev() {
        html = wrap(decoration, &html);
    }
    out.push_str(&html);
}

/// Schemes a link decoration may use. Scheme-less hrefs are relative and allowed.
const LINK_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Whether `href` is relative or uses an allowed scheme.
///
/// Browsers ignore leading whitespace and embedded tabs or newlines when
/// reading a scheme, so those are stripped before the check.
fn is_safe_href(href: &str) -> bool {
    let cleaned: String = href
        .trim_start_matches(|c: char| c.is_ascii_whitespace() || c.is_control())
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();
    let Some(colon) = cleaned.find(':') else {
        return true;
    };
    let scheme = &cleaned[..colon];
    // A `/`, `?` or `#` before the colon means the colon is part of a path
    if scheme.contains(['/', '?', '#']) {
        return true;
    }
    LINK_SCHEMES
        .iter()
        .any(|allowed| scheme.eq_ignore_ascii_case(allowed))
}

fn wrap(decoration: &Decoration, inner: &str) -> String {
    let (open, close) = match decoration {
        Decoration::Link(href) if !is_safe_href(href) => {
            tracing::debug!(href = %href, "Dropping link with disallowed scheme");
            return inner.to_owned();
        }
        Decoration::Bold => ("<strong>".to_owned(), "</strong>"),
        Decoration::Italic => ("<em>".to_owned(), "</em>"),
        Decoration::Strikethrough => ("<s>".to_owned(), "</s>"),
        Decoration::Underline => ("<u>".to_owned(), "</u>"),
        Decoration::Code => ("<code>".to_owned(), "</code>"),
        Decoration::Link(href) => (format!(r#"<a href="{}">"#, escape_html(href)), "</a>"),
        Decoration::Color(color) => (
            format!(
                r#"<span class="color-{}">"#,
                escape_html(&color.replace('_', "-"))
            ),
            "</span>",
        ),
        Decoration::Equation(_) => (r#"<span class="equation">"#.to_owned(), "</span>"),
        Decoration::Mention(target) => (
            format!(
                r#"<span class="mention" data-target="{}">"#,
                escape_html(target)
            ),
            "</span>",
        ),
        Decoration::Comment(id) => (
            format!(r#"<span class="comment" data-comment="{}">"#, escape_html(id)),
            "</span>",
        ),
    };
    format!("{open}{inner}{close}")
}
