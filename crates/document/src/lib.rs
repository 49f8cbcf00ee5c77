//! # Input documents (`document`)
//!
//! The document side of a matching pass: an [`InputDocument`] is built once
//! from named text fields, analysed into per-value [`Segment`]s, and exposed
//! through a [`DocumentSearcher`]. Query evaluation reads it through a
//! [`LeafReader`], the flattened single-leaf view of all segments.
//!
//! ```
//! use document::InputDocument;
//!
//! let doc = InputDocument::builder("doc-1")
//!     .add_field("body", "The borrow checker enforces aliasing rules")
//!     .build()
//!     .expect("valid document");
//!
//! let leaf = doc.searcher().leaf_reader().expect("open reader");
//! assert_eq!(leaf.term_freq("body", "borrow"), 1);
//! ```
//!
//! Analysis is deliberately small: Unicode word segmentation plus
//! lowercasing. Queries normalize their terms with [`normalize_term`] so both
//! sides agree.

mod analysis;
mod document;
mod error;
mod reader;

pub use crate::analysis::{analyze, normalize_term, Token};
pub use crate::document::{DocumentSearcher, InputDocument, InputDocumentBuilder};
pub use crate::error::DocumentError;
pub use crate::reader::{IndexReader, LeafReader, Posting, Segment, POSITION_GAP};
