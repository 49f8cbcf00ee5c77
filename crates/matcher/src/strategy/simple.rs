use query::{EvalError, Predicate};

use super::{EvalContext, MatchStrategy};
use crate::types::{Metadata, QueryMatch};

/// Boolean matching: a query either matches the document or it does not.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMatching;

impl MatchStrategy for SimpleMatching {
    type Match = QueryMatch;

    fn name(&self) -> &'static str {
        "simple"
    }

    fn do_match_query(
        &self,
        ctx: &EvalContext<'_>,
        predicate: &dyn Predicate,
        _metadata: &Metadata,
    ) -> Result<Option<QueryMatch>, EvalError> {
        Ok(predicate
            .evaluate(ctx.reader())?
            .map(|_| ctx.query_match()))
    }

    fn resolve(&self, first: QueryMatch, _second: QueryMatch) -> QueryMatch {
        first
    }
}
