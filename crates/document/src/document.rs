use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::DocumentError;
use crate::reader::{IndexReader, LeafReader, Segment};

/// A single document that candidate queries are run against.
///
/// Immutable once built. Closing it releases nothing in memory but makes every
/// later attempt to open a reader fail, which is how callers model a handle
/// that has gone away underneath an in-flight matching pass.
#[derive(Debug)]
pub struct InputDocument {
    id: String,
    searcher: DocumentSearcher,
}

impl InputDocument {
    /// Start building a document with the given identifier.
    pub fn builder(id: impl Into<String>) -> InputDocumentBuilder {
        InputDocumentBuilder {
            id: id.into(),
            values: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn searcher(&self) -> &DocumentSearcher {
        &self.searcher
    }

    /// Mark the document closed. Idempotent.
    pub fn close(&self) {
        self.searcher.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.searcher.closed.load(Ordering::Acquire)
    }
}

/// Builder for [`InputDocument`]. Validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct InputDocumentBuilder {
    id: String,
    values: Vec<(String, String)>,
}

impl InputDocumentBuilder {
    /// Add one value for `field`. A field may be added more than once.
    pub fn add_field(mut self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.values.push((field.into(), text.into()));
        self
    }

    pub fn build(self) -> Result<InputDocument, DocumentError> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(DocumentError::EmptyId);
        }

        let mut segments = Vec::with_capacity(self.values.len());
        for (field, text) in &self.values {
            let field = field.trim();
            if field.is_empty() {
                return Err(DocumentError::EmptyFieldName(id));
            }
            segments.push(Arc::new(Segment::from_value(field, text)));
        }

        let searcher = DocumentSearcher {
            doc_id: id.clone(),
            reader: IndexReader::new(segments),
            closed: AtomicBool::new(false),
        };
        Ok(InputDocument { id, searcher })
    }
}

/// Queryable handle over an [`InputDocument`].
#[derive(Debug)]
pub struct DocumentSearcher {
    doc_id: String,
    reader: IndexReader,
    closed: AtomicBool,
}

impl DocumentSearcher {
    /// Composite reader over every segment of the document.
    pub fn index_reader(&self) -> Result<&IndexReader, DocumentError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DocumentError::Closed(self.doc_id.clone()));
        }
        Ok(&self.reader)
    }

    /// Open the composite reader and flatten it to a single leaf.
    pub fn leaf_reader(&self) -> Result<LeafReader, DocumentError> {
        self.index_reader().map(LeafReader::wrap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_trims_id_and_indexes_fields() {
        let doc = InputDocument::builder("  doc-1 ")
            .add_field("title", "Memory safety")
            .add_field("body", "Rust gives you memory safety")
            .build()
            .expect("document should build");

        assert_eq!(doc.id(), "doc-1");
        let leaf = doc.searcher().leaf_reader().expect("open reader");
        assert_eq!(leaf.term_freq("body", "memory"), 1);
        assert_eq!(leaf.term_freq("title", "safety"), 1);
    }

    #[test]
    fn empty_id_is_rejected() {
        let err = InputDocument::builder("   ").build().expect_err("empty id");
        assert_eq!(err, DocumentError::EmptyId);
    }

    #[test]
    fn empty_field_name_is_rejected() {
        let err = InputDocument::builder("doc")
            .add_field(" ", "text")
            .build()
            .expect_err("empty field");
        assert_eq!(err, DocumentError::EmptyFieldName("doc".into()));
    }

    #[test]
    fn closed_document_refuses_readers() {
        let doc = InputDocument::builder("doc")
            .add_field("body", "text")
            .build()
            .expect("build");
        doc.close();
        doc.close();

        assert!(doc.is_closed());
        assert_eq!(
            doc.searcher().index_reader().err(),
            Some(DocumentError::Closed("doc".into()))
        );
        assert!(doc.searcher().leaf_reader().is_err());
    }
}
