//! Block tree and decorated text model for sheaf.
//!
//! A document is an id-indexed arena of [`Node`]s. Children and parents are
//! referenced by [`NodeId`], never by owning pointers, so the map can be shared
//! read-only across a render pass without lifetimes tying nodes together.
//!
//! Inline text is modelled as a list of [`TextRun`]s, each pairing raw text with
//! zero or more [`Decoration`]s.
//!
//! # Example
//!
//! ```
//! use sheaf_document::{Document, NodeId};
//!
//! let json = r#"{
//!     "root": { "id": "root", "type": "page", "children": ["p1"] },
//!     "p1": {
//!         "id": "p1",
//!         "type": "text",
//!         "parent": "root",
//!         "properties": { "title": [{ "text": "Hello" }] }
//!     }
//! }"#;
//!
//! let doc = Document::from_json(json).unwrap();
//! let para = doc.get(&NodeId::from("p1")).unwrap();
//! assert_eq!(para.plain_text("title").as_deref(), Some("Hello"));
//! ```

mod document;
mod node;
mod text;

pub use document::{Document, DocumentError};
pub use node::{Node, NodeId};
pub use text::{Decoration, TextRun, plain_text};
