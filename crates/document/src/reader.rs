//! Segmented reader over one document and its flattened single-leaf view.
//!
//! Every value added to an [`InputDocument`](crate::InputDocument) is analysed
//! into its own [`Segment`]. Evaluation code never walks segments directly; it
//! asks for a [`LeafReader`], which merges all segments into one term
//! dictionary per field. Positions of later values are shifted by
//! [`POSITION_GAP`] so phrases cannot match across value boundaries, and byte
//! offsets are shifted as if values were joined by a single separator byte.
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyze;

/// Position increment inserted between two values of the same field.
pub const POSITION_GAP: u32 = 100;

/// One occurrence of a term inside a field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Posting {
    pub position: u32,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FieldPostings {
    terms: BTreeMap<String, Vec<Posting>>,
    values: usize,
    tokens: u32,
    next_position: u32,
    text_len: usize,
}

impl FieldPostings {
    fn from_value(text: &str) -> Self {
        let tokens = analyze(text);
        let mut terms: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
        for token in &tokens {
            terms.entry(token.text.clone()).or_default().push(Posting {
                position: token.position,
                start: token.start,
                end: token.end,
            });
        }
        Self {
            terms,
            values: 1,
            tokens: tokens.len() as u32,
            next_position: tokens.len() as u32,
            text_len: text.len(),
        }
    }

    fn append(&mut self, other: &FieldPostings) {
        let (position_base, byte_base) = if self.values == 0 {
            (0, 0)
        } else {
            (self.next_position + POSITION_GAP, self.text_len + 1)
        };

        for (term, postings) in &other.terms {
            let merged = self.terms.entry(term.clone()).or_default();
            merged.extend(postings.iter().map(|p| Posting {
                position: p.position + position_base,
                start: p.start + byte_base,
                end: p.end + byte_base,
            }));
        }

        self.values += other.values;
        self.tokens += other.tokens;
        self.next_position = position_base + other.next_position;
        self.text_len = byte_base + other.text_len;
    }
}

/// Immutable postings for the values analysed in one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    fields: BTreeMap<String, FieldPostings>,
}

impl Segment {
    /// Analyse a single field value into a fresh segment.
    pub fn from_value(field: &str, text: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), FieldPostings::from_value(text));
        Self { fields }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Composite reader over every segment of a document.
#[derive(Debug, Clone, Default)]
pub struct IndexReader {
    segments: Vec<Arc<Segment>>,
}

impl IndexReader {
    pub fn new(segments: Vec<Arc<Segment>>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }
}

/// Flattened, single-leaf view of an [`IndexReader`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafReader {
    fields: BTreeMap<String, FieldPostings>,
}

impl LeafReader {
    /// Merge all segments of `reader` into one term dictionary per field.
    pub fn wrap(reader: &IndexReader) -> Self {
        let mut fields: BTreeMap<String, FieldPostings> = BTreeMap::new();
        for segment in reader.segments() {
            for (name, postings) in &segment.fields {
                fields.entry(name.clone()).or_default().append(postings);
            }
        }
        Self { fields }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Terms indexed for `field`, in lexicographic order.
    pub fn terms<'a>(&'a self, field: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .get(field)
            .into_iter()
            .flat_map(|f| f.terms.keys().map(String::as_str))
    }

    /// Postings for `term` in `field`, ordered by position. Empty when absent.
    pub fn postings(&self, field: &str, term: &str) -> &[Posting] {
        self.fields
            .get(field)
            .and_then(|f| f.terms.get(term))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn term_freq(&self, field: &str, term: &str) -> usize {
        self.postings(field, term).len()
    }

    /// Number of tokens indexed for `field` across all of its values.
    pub fn field_length(&self, field: &str) -> u32 {
        self.fields.get(field).map(|f| f.tokens).unwrap_or(0)
    }

    /// Number of values merged into `field`.
    pub fn value_count(&self, field: &str) -> usize {
        self.fields.get(field).map(|f| f.values).unwrap_or(0)
    }
}
