//! Drives a [`CandidateMatcher`] over a batch of candidate queries.
//!
//! The matcher itself only knows how to run one query at a time; this module
//! supplies the loop around it. Evaluation failures are recorded on the pass
//! with [`CandidateMatcher::report_error`] and never abort the batch. Misuse
//! (empty ids, calls after `finish`) is returned to the caller.
use std::sync::Arc;
use std::time::{Duration, Instant};

use document::InputDocument;
use query::{Predicate, Query};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{Clock, MonotonicClock};
use crate::config::MatcherConfig;
use crate::engine::CandidateMatcher;
use crate::matches::Matches;
use crate::strategy::MatchStrategy;
use crate::types::{MatchError, MatcherError, Metadata};

/// One query selected for a document, ready to be evaluated.
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    query_id: String,
    predicate: Arc<dyn Predicate>,
    metadata: Metadata,
}

impl CandidateQuery {
    pub fn new(query_id: impl Into<String>, predicate: Arc<dyn Predicate>) -> Self {
        Self {
            query_id: query_id.into(),
            predicate,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// One candidate per top-level disjunct of `query`, all sharing `query_id`.
    ///
    /// Each part is matched on its own and the partial results converge
    /// through [`MatchStrategy::resolve`].
    pub fn decomposed(query_id: &str, query: Query, metadata: &Metadata) -> Vec<Self> {
        query
            .disjuncts()
            .into_iter()
            .map(|part| Self::new(query_id, Arc::new(part)).with_metadata(metadata.clone()))
            .collect()
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    pub fn predicate(&self) -> &dyn Predicate {
        self.predicate.as_ref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// A registered query as it is stored and configured, e.g. loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorQuery {
    pub id: String,
    pub query: Query,
    #[serde(default)]
    pub metadata: Metadata,
}

impl MonitorQuery {
    pub fn new(id: impl Into<String>, query: Query) -> Self {
        Self {
            id: id.into(),
            query,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Candidates to evaluate for this query.
    pub fn candidates(&self, decompose: bool) -> Vec<CandidateQuery> {
        if decompose {
            CandidateQuery::decomposed(&self.id, self.query.clone(), &self.metadata)
        } else {
            vec![CandidateQuery::new(self.id.clone(), Arc::new(self.query.clone()))
                .with_metadata(self.metadata.clone())]
        }
    }
}

/// Flatten a set of registered queries into candidates.
pub fn build_candidates(queries: &[MonitorQuery], decompose: bool) -> Vec<CandidateQuery> {
    queries
        .iter()
        .flat_map(|q| q.candidates(decompose))
        .collect()
}

fn run_candidate<S: MatchStrategy>(
    matcher: &CandidateMatcher<S>,
    candidate: &CandidateQuery,
) -> Result<(), MatcherError> {
    match matcher.match_query(
        candidate.query_id(),
        candidate.predicate(),
        candidate.metadata(),
    ) {
        Ok(_) => Ok(()),
        Err(MatcherError::Evaluation(cause)) => {
            matcher.report_error(MatchError::new(candidate.query_id(), cause))
        }
        Err(other) => Err(other),
    }
}

/// Run every candidate in order. Returns the number of candidates run.
pub fn match_candidates<S: MatchStrategy>(
    matcher: &CandidateMatcher<S>,
    candidates: &[CandidateQuery],
) -> Result<usize, MatcherError> {
    for candidate in candidates {
        run_candidate(matcher, candidate)?;
    }
    Ok(candidates.len())
}

/// Like [`match_candidates`] but fans the candidates out over rayon.
///
/// With `worker_threads` set a dedicated pool of that size is built for the
/// call; otherwise the global pool is used. The first usage error stops the
/// fan-out and is returned.
pub fn match_candidates_parallel<S: MatchStrategy>(
    matcher: &CandidateMatcher<S>,
    candidates: &[CandidateQuery],
    worker_threads: Option<usize>,
) -> Result<usize, MatcherError> {
    let run = || {
        candidates
            .par_iter()
            .try_for_each(|candidate| run_candidate(matcher, candidate))
    };
    match worker_threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| MatcherError::InvalidConfig(e.to_string()))?;
            pool.install(run)?;
        }
        None => run()?,
    }
    Ok(candidates.len())
}

/// Run one complete pass for `doc` and return its result.
pub fn run_pass<S: MatchStrategy>(
    doc: Arc<InputDocument>,
    strategy: S,
    candidates: &[CandidateQuery],
    cfg: &MatcherConfig,
    query_build_time: Duration,
) -> Result<Matches<S::Match>, MatcherError> {
    run_pass_with_clock(
        doc,
        strategy,
        candidates,
        cfg,
        query_build_time,
        Arc::new(MonotonicClock::new()),
    )
}

/// [`run_pass`] with an explicit clock.
pub fn run_pass_with_clock<S: MatchStrategy>(
    doc: Arc<InputDocument>,
    strategy: S,
    candidates: &[CandidateQuery],
    cfg: &MatcherConfig,
    query_build_time: Duration,
    clock: Arc<dyn Clock>,
) -> Result<Matches<S::Match>, MatcherError> {
    cfg.validate()?;
    let started = Instant::now();

    let matcher = CandidateMatcher::with_clock(doc, strategy, clock);
    matcher.set_slow_log_limit(cfg.slow_log_limit())?;

    let queries_run = if cfg.parallel {
        match_candidates_parallel(&matcher, candidates, cfg.worker_threads)?
    } else {
        match_candidates(&matcher, candidates)?
    };
    matcher.finish(query_build_time, queries_run)?;

    debug!(
        doc_id = %matcher.doc_id(),
        candidates = candidates.len(),
        parallel = cfg.parallel,
        elapsed_micros = started.elapsed().as_micros() as u64,
        "match_pass_completed"
    );
    matcher.into_matches()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::strategy::{ScoringMatching, SimpleMatching};
    use query::EvalError;

    fn doc(id: &str, body: &str) -> Arc<InputDocument> {
        Arc::new(
            InputDocument::builder(id)
                .add_field("body", body)
                .build()
                .expect("valid document"),
        )
    }

    #[test]
    fn failing_candidates_are_reported_not_propagated() {
        let d = doc("d1", "rust is fast");
        let candidates = vec![
            CandidateQuery::new("ok", Arc::new(Query::term("body", "rust"))),
            CandidateQuery::new("bad", Arc::new(Query::and(vec![]))),
            CandidateQuery::new("miss", Arc::new(Query::term("body", "java"))),
        ];

        let matches = run_pass(
            d,
            SimpleMatching,
            &candidates,
            &MatcherConfig::default(),
            Duration::from_millis(3),
        )
        .expect("pass succeeds");

        assert_eq!(matches.matched_ids().collect::<Vec<_>>(), vec!["ok"]);
        assert_eq!(matches.error_count(), 1);
        assert_eq!(matches.errors()[0].query_id(), "bad");
        assert!(matches!(matches.errors()[0].cause(), EvalError::Invalid(_)));
        assert_eq!(matches.presearcher_hits().len(), 3);
        assert_eq!(matches.queries_run(), 3);
        assert_eq!(matches.query_build_time_ms(), 3);
    }

    #[test]
    fn usage_errors_abort_the_batch() {
        let d = doc("d1", "rust");
        let matcher = CandidateMatcher::new(d, SimpleMatching);
        let candidates = vec![CandidateQuery::new(" ", Arc::new(Query::term("body", "rust")))];
        assert_eq!(
            match_candidates(&matcher, &candidates),
            Err(MatcherError::EmptyQueryId)
        );
    }

    #[test]
    fn decomposed_candidates_share_an_id_and_sum_scores() {
        let q = MonitorQuery::new(
            "q1",
            Query::or(vec![Query::term("body", "rust"), Query::term("body", "fast")]),
        );
        let candidates = q.candidates(true);
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.query_id() == "q1"));

        let matches = run_pass(
            doc("d1", "rust is fast"),
            ScoringMatching,
            &candidates,
            &MatcherConfig::default(),
            Duration::ZERO,
        )
        .expect("pass succeeds");
        let score = matches.get("q1").expect("q1 matched").score();
        assert!((score - 2.0).abs() < 1e-6);
        assert_eq!(matches.matches_count(), 1);
    }

    #[test]
    fn parallel_pass_matches_sequential_pass() {
        let queries: Vec<MonitorQuery> = (0..50)
            .map(|i| {
                let term = if i % 2 == 0 { "rust" } else { "go" };
                MonitorQuery::new(format!("q{i}"), Query::term("body", term))
            })
            .collect();
        let candidates = build_candidates(&queries, true);

        let sequential = run_pass_with_clock(
            doc("d1", "rust rust"),
            ScoringMatching,
            &candidates,
            &MatcherConfig::default(),
            Duration::ZERO,
            Arc::new(ManualClock::new()),
        )
        .expect("sequential pass");

        let cfg = MatcherConfig {
            parallel: true,
            worker_threads: Some(4),
            ..MatcherConfig::default()
        };
        let parallel = run_pass_with_clock(
            doc("d1", "rust rust"),
            ScoringMatching,
            &candidates,
            &cfg,
            Duration::ZERO,
            Arc::new(ManualClock::new()),
        )
        .expect("parallel pass");

        assert_eq!(sequential, parallel);
        assert_eq!(parallel.matches_count(), 25);
    }

    #[test]
    fn invalid_config_is_rejected_before_matching() {
        let cfg = MatcherConfig {
            version: String::new(),
            ..MatcherConfig::default()
        };
        let err = run_pass(doc("d1", "rust"), SimpleMatching, &[], &cfg, Duration::ZERO)
            .expect_err("config invalid");
        assert!(matches!(err, MatcherError::InvalidConfig(_)));
    }

    #[test]
    fn closed_document_failures_become_match_errors() {
        let d = doc("d1", "rust");
        d.close();
        let candidates = vec![CandidateQuery::new("q1", Arc::new(Query::term("body", "rust")))];
        let matches = run_pass(
            d,
            SimpleMatching,
            &candidates,
            &MatcherConfig::default(),
            Duration::ZERO,
        )
        .expect("pass succeeds");
        assert_eq!(matches.matches_count(), 0);
        assert_eq!(matches.error_count(), 1);
        assert!(matches!(matches.errors()[0].cause(), EvalError::Io(_)));
        assert!(matches.presearcher_hits().contains("q1"));
    }

    #[test]
    fn monitor_queries_load_from_json() {
        let raw = r#"[
            {"id": "q1", "query": {"type": "term", "field": "body", "term": "rust"}},
            {"id": "q2", "query": {"type": "term", "field": "body", "term": "go"},
             "metadata": {"owner": "ops"}}
        ]"#;
        let queries: Vec<MonitorQuery> = serde_json::from_str(raw).expect("parse");
        assert_eq!(queries.len(), 2);
        assert!(queries[0].metadata.is_empty());
        assert_eq!(queries[1].metadata.get("owner").map(String::as_str), Some("ops"));
    }
}
