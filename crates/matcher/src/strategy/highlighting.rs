use query::{merge_spans, EvalError, FieldSpans, Predicate, Span};
use serde::Serialize;

use super::{EvalContext, MatchStrategy};
use crate::types::{MatchResult, Metadata, QueryMatch};

/// A match carrying the spans it hit, grouped by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightsMatch {
    #[serde(flatten)]
    query_match: QueryMatch,
    hits: FieldSpans,
}

impl HighlightsMatch {
    pub fn new(query_match: QueryMatch, hits: FieldSpans) -> Self {
        Self { query_match, hits }
    }

    pub fn hits(&self) -> &FieldSpans {
        &self.hits
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.hits.keys().map(String::as_str)
    }

    /// Spans hit in `field`, in document order.
    pub fn field_hits<'a>(&'a self, field: &str) -> impl Iterator<Item = &'a Span> + 'a {
        self.hits.get(field).into_iter().flatten()
    }

    /// Total number of distinct spans across all fields.
    pub fn hit_count(&self) -> usize {
        self.hits.values().map(|spans| spans.len()).sum()
    }
}

impl MatchResult for HighlightsMatch {
    fn query_match(&self) -> &QueryMatch {
        &self.query_match
    }
}

/// Highlighting. Partial matches union their spans per field, so the result
/// is independent of arrival order.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightingMatching;

impl MatchStrategy for HighlightingMatching {
    type Match = HighlightsMatch;

    fn name(&self) -> &'static str {
        "highlighting"
    }

    fn do_match_query(
        &self,
        ctx: &EvalContext<'_>,
        predicate: &dyn Predicate,
        _metadata: &Metadata,
    ) -> Result<Option<HighlightsMatch>, EvalError> {
        Ok(predicate
            .evaluate(ctx.reader())?
            .map(|eval| HighlightsMatch::new(ctx.query_match(), eval.spans)))
    }

    fn resolve(&self, first: HighlightsMatch, second: HighlightsMatch) -> HighlightsMatch {
        let HighlightsMatch {
            query_match,
            mut hits,
        } = first;
        merge_spans(&mut hits, second.hits);
        HighlightsMatch::new(query_match, hits)
    }
}
