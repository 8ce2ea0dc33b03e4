//! Diagram blocks for sheaf.
//!
//! [`DiagramPlugin`] overrides `code` blocks whose language is a diagram
//! language (`mermaid`, `plantuml`, `graphviz`, ...) with a lazily loaded
//! renderer. Server renders show a placeholder; interactive renders start the
//! load and swap in the diagram figure on a later pass.

mod language;
mod plugin;

pub use language::DiagramLanguage;
pub use plugin::{DiagramPlaceholder, DiagramPlugin};
