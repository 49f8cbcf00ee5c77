use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use document::LeafReader;
use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::explanation::Explanation;

/// A matched region of a field, in token positions and byte offsets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start_position: u32,
    pub end_position: u32,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Matched spans grouped by field.
pub type FieldSpans = BTreeMap<String, BTreeSet<Span>>;

/// Everything a matching strategy may need to build its match value.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub score: f32,
    pub explanation: Explanation,
    pub spans: FieldSpans,
}

impl Evaluation {
    pub fn new(score: f32, explanation: Explanation) -> Self {
        Self {
            score,
            explanation,
            spans: FieldSpans::new(),
        }
    }

    pub fn with_spans(mut self, spans: FieldSpans) -> Self {
        self.spans = spans;
        self
    }
}

/// Union `other` into `into`, field by field.
pub fn merge_spans(into: &mut FieldSpans, other: FieldSpans) {
    for (field, spans) in other {
        into.entry(field).or_default().extend(spans);
    }
}

/// Opaque query predicate evaluated against one document.
///
/// Returns `Ok(None)` when the document does not match. Implementations must
/// be shareable across threads so one matcher can evaluate several
/// candidates concurrently.
pub trait Predicate: Send + Sync + fmt::Debug {
    fn evaluate(&self, reader: &LeafReader) -> Result<Option<Evaluation>, EvalError>;
}
