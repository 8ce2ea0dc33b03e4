//! Text transform pipeline.
//!
//! Folds every plugin's text hook over the undecorated runs of a property.
//! Each plugin sees the run list produced by the plugins before it:
//!
//! ```text
//! [plain "see [[Home]] #ops"]
//!   -- wikilinks -->  [plain "see "] [Replaced "Home"] [plain " #ops"]
//!   -- hashtags  -->  [plain "see "] [Replaced "Home"] [plain " "] [Replaced "ops"]
//! ```
//!
//! Decorated runs and replacement runs pass through every plugin untouched.

use sheaf_document::{Node, TextRun};

use crate::chain::PluginChain;
use crate::diagnostics::{Diagnostics, Stage};
use crate::inline::{InlineRun, Replacement};
use crate::plugin::{Plugin, ReplacementSpan, TextTransformResult};

/// Transform inline text runs through the plugin chain.
#[must_use]
pub fn transform_text(
    runs: &[TextRun],
    node: &Node,
    chain: &PluginChain,
    diagnostics: &Diagnostics,
) -> Vec<InlineRun> {
    let initial: Vec<InlineRun> = runs.iter().cloned().map(InlineRun::Text).collect();
    chain.iter().fold(initial, |current, plugin| {
        apply_plugin(current, node, plugin, diagnostics)
    })
}

fn apply_plugin(
    runs: Vec<InlineRun>,
    node: &Node,
    plugin: &dyn Plugin,
    diagnostics: &Diagnostics,
) -> Vec<InlineRun> {
    let mut out = Vec::with_capacity(runs.len());
    for run in runs {
        let Some(text) = run.transformable_text() else {
            out.push(run);
            continue;
        };

        match diagnostics.run_hook(Stage::TextTransform, plugin, || {
            plugin.transform_text(text, node)
        }) {
            Some(Some(result)) => splice(result, plugin.name(), &mut out),
            // No contribution, or the hook failed: keep the run as it was
            _ => out.push(run),
        }
    }
    out
}

/// Convert a hook result back into runs.
fn splice(result: TextTransformResult, plugin: &str, out: &mut Vec<InlineRun>) {
    let TextTransformResult { text, spans } = result;
    let spans = valid_spans(spans, &text);

    let mut cursor = 0;
    for span in spans {
        if span.start > cursor {
            out.push(InlineRun::plain(&text[cursor..span.start]));
        }
        out.push(InlineRun::Replaced(Replacement {
            source: text[span.start..span.end].to_owned(),
            html: span.html,
            plugin: plugin.to_owned(),
        }));
        cursor = span.end;
    }
    if cursor < text.len() {
        out.push(InlineRun::plain(&text[cursor..]));
    }
}

/// Sort spans by start and drop invalid or overlapping ones individually.
///
/// A span is invalid if it is empty, ends past the text, or does not fall on
/// character boundaries. A span overlapping an earlier kept span is dropped.
pub(crate) fn valid_spans(mut spans: Vec<ReplacementSpan>, text: &str) -> Vec<ReplacementSpan> {
    spans.retain(|span| {
        span.start < span.end
            && span.end <= text.len()
            && text.is_char_boundary(span.start)
            && text.is_char_boundary(span.end)
    });
    spans.sort_by_key(|span| span.start);

    let mut kept: Vec<ReplacementSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if kept.last().is_some_and(|last| span.start < last.end) {
            continue;
        }
        kept.push(span);
    }
    kept
}
