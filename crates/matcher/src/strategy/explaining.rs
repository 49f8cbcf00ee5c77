use query::{EvalError, Explanation, Predicate};
use serde::Serialize;

use super::{EvalContext, MatchStrategy};
use crate::types::{MatchResult, Metadata, QueryMatch};

/// A match carrying the explanation of its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainingMatch {
    #[serde(flatten)]
    query_match: QueryMatch,
    explanation: Explanation,
}

impl ExplainingMatch {
    pub fn new(query_match: QueryMatch, explanation: Explanation) -> Self {
        Self {
            query_match,
            explanation,
        }
    }

    pub fn explanation(&self) -> &Explanation {
        &self.explanation
    }

    pub fn score(&self) -> f32 {
        self.explanation.value
    }
}

impl MatchResult for ExplainingMatch {
    fn query_match(&self) -> &QueryMatch {
        &self.query_match
    }
}

/// Matching with explanations. Partial matches are joined under one flat,
/// canonically ordered `sum of:` node.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplainingMatching;

impl MatchStrategy for ExplainingMatching {
    type Match = ExplainingMatch;

    fn name(&self) -> &'static str {
        "explaining"
    }

    fn do_match_query(
        &self,
        ctx: &EvalContext<'_>,
        predicate: &dyn Predicate,
        _metadata: &Metadata,
    ) -> Result<Option<ExplainingMatch>, EvalError> {
        Ok(predicate
            .evaluate(ctx.reader())?
            .map(|eval| ExplainingMatch::new(ctx.query_match(), eval.explanation)))
    }

    fn resolve(&self, first: ExplainingMatch, second: ExplainingMatch) -> ExplainingMatch {
        let explanation = Explanation::flat_sum(vec![first.explanation, second.explanation]);
        ExplainingMatch::new(first.query_match, explanation)
    }
}
