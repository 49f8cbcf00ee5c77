//! Error types produced by the document crate.
use thiserror::Error;

/// Errors raised while building an [`InputDocument`](crate::InputDocument) or
/// opening a reader over it.
///
/// Cloneable and comparable so they can be carried inside per-query failure
/// records without losing information.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentError {
    /// Document identifiers must be non-empty after trimming.
    #[error("document id must not be empty")]
    EmptyId,

    /// A field was added with an empty name.
    #[error("field name must not be empty (document {0})")]
    EmptyFieldName(String),

    /// The document was closed; its readers can no longer be opened.
    #[error("document {0} is closed")]
    Closed(String),

    /// The underlying handle could not be read.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DocumentError {
    fn from(value: std::io::Error) -> Self {
        DocumentError::Io(value.to_string())
    }
}
