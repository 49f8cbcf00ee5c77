use query::{EvalError, Predicate};
use serde::Serialize;

use super::{EvalContext, MatchStrategy};
use crate::types::{MatchResult, Metadata, QueryMatch};

/// A match carrying the predicate's score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringMatch {
    #[serde(flatten)]
    query_match: QueryMatch,
    score: f32,
}

impl ScoringMatch {
    pub fn new(query_match: QueryMatch, score: f32) -> Self {
        Self { query_match, score }
    }

    pub fn score(&self) -> f32 {
        self.score
    }
}

impl MatchResult for ScoringMatch {
    fn query_match(&self) -> &QueryMatch {
        &self.query_match
    }
}

/// Scored matching. Partial matches for one query add their scores.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringMatching;

impl MatchStrategy for ScoringMatching {
    type Match = ScoringMatch;

    fn name(&self) -> &'static str {
        "scoring"
    }

    fn do_match_query(
        &self,
        ctx: &EvalContext<'_>,
        predicate: &dyn Predicate,
        _metadata: &Metadata,
    ) -> Result<Option<ScoringMatch>, EvalError> {
        Ok(predicate
            .evaluate(ctx.reader())?
            .map(|eval| ScoringMatch::new(ctx.query_match(), eval.score)))
    }

    fn resolve(&self, first: ScoringMatch, second: ScoringMatch) -> ScoringMatch {
        ScoringMatch::new(first.query_match, first.score + second.score)
    }
}
