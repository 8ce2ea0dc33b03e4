//! Decorated text runs.

use serde::{Deserialize, Serialize};

/// Formatting marker attached to a [`TextRun`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Decoration {
    Bold,
    Italic,
    Strikethrough,
    Underline,
    Code,
    /// Hyperlink target URL.
    Link(String),
    /// Named text or background color (e.g. `red`, `blue_background`).
    Color(String),
    /// Inline expression source (e.g. `TeX`).
    Equation(String),
    /// Id of the mentioned node, user or page.
    Mention(String),
    /// Id of the attached comment discussion.
    Comment(String),
}

/// A fragment of text with its formatting markers.
///
/// A run that carries at least one decoration is *already decorated*: inline
/// text transforms leave it untouched so that, for example, a literal
/// `[[...]]` inside inline code renders as written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorations: Vec<Decoration>,
}

impl TextRun {
    /// Create an undecorated run.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            decorations: Vec::new(),
        }
    }

    /// Create a run with the given decorations.
    #[must_use]
    pub fn decorated(text: impl Into<String>, decorations: Vec<Decoration>) -> Self {
        Self {
            text: text.into(),
            decorations,
        }
    }

    /// Whether the run carries any formatting marker.
    #[must_use]
    pub fn is_decorated(&self) -> bool {
        !self.decorations.is_empty()
    }
}

/// Concatenate the raw text of a list of runs, dropping decorations.
#[must_use]
pub fn plain_text(runs: &[TextRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}
