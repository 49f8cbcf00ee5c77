//! Matching strategies: the per-strategy half of a matching pass.
//!
//! [`CandidateMatcher`](crate::CandidateMatcher) owns all bookkeeping (hit
//! tracking, merging, error capture, timing). A strategy only decides what a
//! match looks like ([`MatchStrategy::do_match_query`]) and how two matches
//! for the same query combine ([`MatchStrategy::resolve`]).
use document::LeafReader;
use query::{EvalError, Predicate};

use crate::types::{MatchResult, Metadata, QueryMatch};

mod explaining;
mod highlighting;
mod scoring;
mod simple;

pub use self::explaining::{ExplainingMatch, ExplainingMatching};
pub use self::highlighting::{HighlightingMatching, HighlightsMatch};
pub use self::scoring::{ScoringMatch, ScoringMatching};
pub use self::simple::SimpleMatching;

/// Per-query view handed to [`MatchStrategy::do_match_query`].
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    doc_id: &'a str,
    query_id: &'a str,
    reader: &'a LeafReader,
}

impl<'a> EvalContext<'a> {
    pub(crate) fn new(doc_id: &'a str, query_id: &'a str, reader: &'a LeafReader) -> Self {
        Self {
            doc_id,
            query_id,
            reader,
        }
    }

    pub fn doc_id(&self) -> &'a str {
        self.doc_id
    }

    pub fn query_id(&self) -> &'a str {
        self.query_id
    }

    /// Flattened reader over the document being matched.
    pub fn reader(&self) -> &'a LeafReader {
        self.reader
    }

    /// Identity of a match for the current query and document.
    pub fn query_match(&self) -> QueryMatch {
        QueryMatch::from_validated(self.query_id, self.doc_id)
    }
}

/// How one kind of match is produced and combined.
///
/// `resolve` must be associative and commutative enough that any number of
/// partial matches for one query converge to the same value regardless of
/// arrival order.
pub trait MatchStrategy: Send + Sync {
    type Match: MatchResult;

    /// Short name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Evaluate `predicate` against the document. `Ok(None)` means no match.
    fn do_match_query(
        &self,
        ctx: &EvalContext<'_>,
        predicate: &dyn Predicate,
        metadata: &Metadata,
    ) -> Result<Option<Self::Match>, EvalError>;

    /// Combine two matches for the same query. `first` is the value already
    /// stored, `second` the newly found one.
    fn resolve(&self, first: Self::Match, second: Self::Match) -> Self::Match;
}
