//! Diagram languages recognized on `code` blocks.

use std::fmt;

/// Supported diagram languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramLanguage {
    PlantUml,
    C4PlantUml,
    Mermaid,
    GraphViz,
    Ditaa,
    Erd,
    Nomnoml,
    Svgbob,
    Vega,
    VegaLite,
    WaveDrom,
}

impl DiagramLanguage {
    pub const ALL: [Self; 11] = [
        Self::PlantUml,
        Self::C4PlantUml,
        Self::Mermaid,
        Self::GraphViz,
        Self::Ditaa,
        Self::Erd,
        Self::Nomnoml,
        Self::Svgbob,
        Self::Vega,
        Self::VegaLite,
        Self::WaveDrom,
    ];

    /// Parse a code block language.
    ///
    /// Matching ignores case and surrounding whitespace. A `kroki-` prefix is
    /// accepted (`kroki-mermaid`), and `dot` is an alias for `graphviz`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let lang = s.trim().to_ascii_lowercase();
        let lang = lang.strip_prefix("kroki-").unwrap_or(&lang);

        match lang {
            "plantuml" => Some(Self::PlantUml),
            "c4plantuml" => Some(Self::C4PlantUml),
            "mermaid" => Some(Self::Mermaid),
            "graphviz" | "dot" => Some(Self::GraphViz),
            "ditaa" => Some(Self::Ditaa),
            "erd" => Some(Self::Erd),
            "nomnoml" => Some(Self::Nomnoml),
            "svgbob" => Some(Self::Svgbob),
            "vega" => Some(Self::Vega),
            "vegalite" => Some(Self::VegaLite),
            "wavedrom" => Some(Self::WaveDrom),
            _ => None,
        }
    }

    /// Canonical name, used in CSS classes and lazy boundary names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlantUml => "plantuml",
            Self::C4PlantUml => "c4plantuml",
            Self::Mermaid => "mermaid",
            Self::GraphViz => "graphviz",
            Self::Ditaa => "ditaa",
            Self::Erd => "erd",
            Self::Nomnoml => "nomnoml",
            Self::Svgbob => "svgbob",
            Self::Vega => "vega",
            Self::VegaLite => "vegalite",
            Self::WaveDrom => "wavedrom",
        }
    }
}

impl fmt::Display for DiagramLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_languages_parse_from_canonical_name() {
        for lang in DiagramLanguage::ALL {
            assert_eq!(DiagramLanguage::parse(lang.as_str()), Some(lang));

            // kroki- prefixed form
            let prefixed = format!("kroki-{lang}");
            assert_eq!(
                DiagramLanguage::parse(&prefixed),
                Some(lang),
                "Failed to parse: {prefixed}"
            );
        }
    }

    #[test]
    fn test_dot_alias() {
        assert_eq!(DiagramLanguage::parse("dot"), Some(DiagramLanguage::GraphViz));
    }

    #[test]
    fn test_parse_ignores_case_and_whitespace() {
        assert_eq!(
            DiagramLanguage::parse(" Mermaid "),
            Some(DiagramLanguage::Mermaid)
        );
        assert_eq!(
            DiagramLanguage::parse("PlantUML"),
            Some(DiagramLanguage::PlantUml)
        );
    }

    #[test]
    fn test_unknown_languages() {
        assert!(DiagramLanguage::parse("javascript").is_none());
        assert!(DiagramLanguage::parse("kroki-unknown").is_none());
        assert!(DiagramLanguage::parse("kroki-").is_none());
        assert!(DiagramLanguage::parse("").is_none());
    }
}
