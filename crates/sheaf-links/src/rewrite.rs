//! Building a text transform result from pattern matches.

use std::ops::Range;

use sheaf_renderer::{ReplacementSpan, TextTransformResult};

/// One match to replace.
pub(crate) struct Found<'t> {
    /// Byte range of the whole match in the input.
    pub range: Range<usize>,
    /// Leading input text captured by the match that must be kept as-is.
    pub lead: &'t str,
    /// Text the replacement span covers in the rewritten string.
    pub display: String,
    pub html: String,
}

/// Rewrite `text`, replacing each match with its display text and recording a
/// span over it. Returns `None` if nothing matched.
///
/// Matches must be in order and non-overlapping, as regex iterators yield them.
pub(crate) fn rewrite<'t>(
    text: &'t str,
    found: impl IntoIterator<Item = Found<'t>>,
) -> Option<TextTransformResult> {
    let mut rewritten = String::with_capacity(text.len());
    let mut spans = Vec::new();
    let mut cursor = 0;

    for m in found {
        rewritten.push_str(&text[cursor..m.range.start]);
        rewritten.push_str(m.lead);
        let start = rewritten.len();
        rewritten.push_str(&m.display);
        spans.push(ReplacementSpan::new(start, rewritten.len(), m.html));
        cursor = m.range.end;
    }

    if spans.is_empty() {
        return None;
    }
    rewritten.push_str(&text[cursor..]);
    Some(TextTransformResult::new(rewritten, spans))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_offsets_measured_against_rewritten_text() {
        let text = "a [[B]] c [[D]]";
        let found = vec![
            Found {
                range: 2..7,
                lead: "",
                display: "B".to_owned(),
                html: "<b>".to_owned(),
            },
            Found {
                range: 10..15,
                lead: "",
                display: "D".to_owned(),
                html: "<d>".to_owned(),
            },
        ];
        let result = rewrite(text, found).unwrap();
        assert_eq!(result.text, "a B c D");
        assert_eq!(
            result.spans,
            vec![
                ReplacementSpan::new(2, 3, "<b>"),
                ReplacementSpan::new(6, 7, "<d>"),
            ]
        );
    }

    #[test]
    fn test_lead_is_kept_before_span() {
        let found = vec![Found {
            range: 1..6,
            lead: " ",
            display: "tag".to_owned(),
            html: "<t>".to_owned(),
        }];
        let result = rewrite("x #tag y", found).unwrap();
        assert_eq!(result.text, "x tag y");
        assert_eq!(result.spans, vec![ReplacementSpan::new(2, 5, "<t>")]);
    }

    #[test]
    fn test_no_matches() {
        assert!(rewrite("plain", Vec::new()).is_none());
    }
}
