use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use document::{DocumentError, InputDocument, LeafReader};
use once_cell::sync::OnceCell;
use query::{EvalError, Predicate};
use tracing::{debug, info, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::matches::Matches;
use crate::metrics::{metrics_recorder, PassStats};
use crate::slowlog::SlowLog;
use crate::strategy::{EvalContext, MatchStrategy};
use crate::types::{MatchError, MatchResult, MatcherError, Metadata, Phase};


struct PassState<T> {
    phase: Phase,
    presearcher_hits: BTreeSet<String>,
    matches: BTreeMap<String, T>,
    errors: Vec<MatchError>,
    slow_log: SlowLog,
    query_build_time: Duration,
    search_time: Duration,
    queries_run: usize,
}

impl<T: MatchResult> PassState<T> {
    fn new() -> Self {
        Self {
            phase: Phase::Created,
            presearcher_hits: BTreeSet::new(),
            matches: BTreeMap::new(),
            errors: Vec::new(),
            slow_log: SlowLog::new(),
            query_build_time: Duration::ZERO,
            search_time: Duration::ZERO,
            queries_run: 0,
        }
    }

    /// Fails once the pass is finished; otherwise moves it into `Matching`.
    fn begin(&mut self, op: &'static str) -> Result<(), MatcherError> {
        if self.phase == Phase::Finished {
            return Err(MatcherError::InvalidPhase {
                op,
                phase: self.phase,
            });
        }
        self.phase = Phase::Matching;
        Ok(())
    }

    fn merge(&mut self, query_id: &str, found: T, resolve: impl FnOnce(T, T) -> T) {
        self.presearcher_hits.insert(query_id.to_string());
        let merged = match self.matches.remove(query_id) {
            Some(existing) => resolve(existing, found),
            None => found,
        };
        self.matches.insert(query_id.to_string(), merged);
    }

    fn snapshot(&self, doc_id: &str) -> Matches<T> {
        Matches::new(
            doc_id.to_string(),
            self.presearcher_hits.clone(),
            self.matches.clone(),
            self.errors.clone(),
            self.query_build_time,
            self.search_time,
            self.queries_run,
            self.slow_log.clone(),
        )
    }

    fn stats(&self) -> PassStats {
        PassStats {
            presearcher_hits: self.presearcher_hits.len(),
            matches: self.matches.len(),
            errors: self.errors.len(),
            queries_run: self.queries_run,
            slow_queries: self.slow_log.len(),
            query_build_time: self.query_build_time,
            search_time: self.search_time,
        }
    }
}

/// Runs candidate queries against one document and aggregates the outcome.
///
/// One matcher serves exactly one document for one pass:
/// `Created → Matching → Finished`. Queries, matches and errors are accepted
/// until [`finish`](Self::finish); results can be read only afterwards.
///
/// All methods take `&self`. Pass state sits behind a mutex and evaluation
/// runs outside it, so a driver may evaluate candidates for the same document
/// from several threads.
pub struct CandidateMatcher<S: MatchStrategy> {
    doc: Arc<InputDocument>,
    strategy: S,
    clock: Arc<dyn Clock>,
    started: Duration,
    reader: OnceCell<LeafReader>,
    state: Mutex<PassState<S::Match>>,
}

impl<S: MatchStrategy> CandidateMatcher<S> {
    /// Create a matcher for `doc` timed by a [`MonotonicClock`].
    pub fn new(doc: Arc<InputDocument>, strategy: S) -> Self {
        Self::with_clock(doc, strategy, Arc::new(MonotonicClock::new()))
    }

    /// Create a matcher that reads time from `clock`. The start timestamp is
    /// taken here.
    pub fn with_clock(doc: Arc<InputDocument>, strategy: S, clock: Arc<dyn Clock>) -> Self {
        let started = clock.now();
        Self {
            doc,
            strategy,
            clock,
            started,
            reader: OnceCell::new(),
            state: Mutex::new(PassState::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PassState<S::Match>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn doc_id(&self) -> &str {
        self.doc.id()
    }

    pub fn document(&self) -> &InputDocument {
        &self.doc
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Set the slow-log limit. Only allowed before any query has run.
    pub fn set_slow_log_limit(&self, limit: Duration) -> Result<(), MatcherError> {
        let mut state = self.lock();
        if state.phase != Phase::Created {
            return Err(MatcherError::InvalidPhase {
                op: "set the slow log limit",
                phase: state.phase,
            });
        }
        state.slow_log.set_limit(limit);
        Ok(())
    }

    pub fn slow_log_limit(&self) -> Duration {
        self.lock().slow_log.limit()
    }

    /// Run `predicate` for `query_id` against the document.
    ///
    /// The id is recorded as a presearcher hit before evaluation, whatever
    /// the outcome. A match is merged into the pass and also returned.
    /// Evaluation failures come back as [`MatcherError::Evaluation`] and are
    /// not recorded; the caller decides whether to
    /// [`report_error`](Self::report_error).
    pub fn match_query(
        &self,
        query_id: &str,
        predicate: &dyn Predicate,
        metadata: &Metadata,
    ) -> Result<Option<S::Match>, MatcherError> {
        if query_id.trim().is_empty() {
            return Err(MatcherError::EmptyQueryId);
        }
        {
            let mut state = self.lock();
            state.begin("match a query")?;
            state.presearcher_hits.insert(query_id.to_string());
        }

        let reader = self.leaf_reader().map_err(EvalError::from)?;
        let ctx = EvalContext::new(self.doc.id(), query_id, reader);

        let started = self.clock.now();
        let outcome = self.strategy.do_match_query(&ctx, predicate, metadata);
        let elapsed = self.clock.now().saturating_sub(started);

        let mut state = self.lock();
        state.begin("match a query")?;
        let slow = state.slow_log.add_query(query_id, elapsed);
        debug!(
            doc_id = %self.doc.id(),
            query_id,
            elapsed_micros = elapsed.as_micros() as u64,
            slow,
            matched = matches!(outcome, Ok(Some(_))),
            "query_evaluated"
        );

        let found = outcome?;
        if let Some(ref m) = found {
            state.merge(query_id, m.clone(), |a, b| self.strategy.resolve(a, b));
        }
        Ok(found)
    }

    /// Add a match found for `query_id`, resolving it against any match
    /// already stored for the same id.
    pub fn add_match(&self, query_id: &str, found: S::Match) -> Result<(), MatcherError> {
        if query_id.trim().is_empty() {
            return Err(MatcherError::EmptyQueryId);
        }
        if found.query_id() != query_id {
            return Err(MatcherError::QueryIdMismatch {
                expected: query_id.to_string(),
                found: found.query_id().to_string(),
            });
        }
        let mut state = self.lock();
        state.begin("add a match")?;
        state.merge(query_id, found, |a, b| self.strategy.resolve(a, b));
        Ok(())
    }

    /// Record a per-query failure. Existing matches for the same id are kept.
    pub fn report_error(&self, error: MatchError) -> Result<(), MatcherError> {
        let mut state = self.lock();
        state.begin("report an error")?;
        warn!(
            doc_id = %self.doc.id(),
            query_id = %error.query_id(),
            kind = error.cause().kind(),
            error = %error.cause(),
            "query_failed"
        );
        state.errors.push(error);
        Ok(())
    }

    /// Close the pass: stores the caller's build time and query count and
    /// measures search time since construction. Allowed exactly once.
    pub fn finish(
        &self,
        query_build_time: Duration,
        queries_run: usize,
    ) -> Result<(), MatcherError> {
        let stats = {
            let mut state = self.lock();
            if state.phase == Phase::Finished {
                return Err(MatcherError::InvalidPhase {
                    op: "finish",
                    phase: state.phase,
                });
            }
            state.query_build_time = query_build_time;
            state.queries_run = queries_run;
            state.search_time = self.clock.now().saturating_sub(self.started);
            state.phase = Phase::Finished;
            state.stats()
        };

        info!(
            doc_id = %self.doc.id(),
            strategy = self.strategy.name(),
            hits = stats.presearcher_hits,
            matches = stats.matches,
            errors = stats.errors,
            queries_run = stats.queries_run,
            slow_queries = stats.slow_queries,
            search_time_ms = stats.search_time.as_millis() as u64,
            "match_pass_finished"
        );
        if let Some(recorder) = metrics_recorder() {
            recorder.record_pass(self.doc.id(), self.strategy.name(), &stats);
        }
        Ok(())
    }

    /// Snapshot of the finished pass. Repeated calls return equal values.
    pub fn matches(&self) -> Result<Matches<S::Match>, MatcherError> {
        let state = self.lock();
        if state.phase != Phase::Finished {
            return Err(MatcherError::InvalidPhase {
                op: "read matches",
                phase: state.phase,
            });
        }
        Ok(state.snapshot(self.doc.id()))
    }

    /// Consume the matcher and return its finished pass without cloning.
    pub fn into_matches(self) -> Result<Matches<S::Match>, MatcherError> {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.phase != Phase::Finished {
            return Err(MatcherError::InvalidPhase {
                op: "read matches",
                phase: state.phase,
            });
        }
        Ok(Matches::new(
            self.doc.id().to_string(),
            state.presearcher_hits,
            state.matches,
            state.errors,
            state.query_build_time,
            state.search_time,
            state.queries_run,
            state.slow_log,
        ))
    }

    /// Match currently stored for `query_id`, if any.
    pub fn get_match(&self, query_id: &str) -> Option<S::Match> {
        self.lock().matches.get(query_id).cloned()
    }

    /// Open a fresh flattened reader over the document.
    pub fn index_reader(&self) -> Result<LeafReader, DocumentError> {
        self.doc.searcher().leaf_reader()
    }

    /// Flattened view shared by every query of the pass. Fails once the
    /// document has been closed, even if the view was already built.
    fn leaf_reader(&self) -> Result<&LeafReader, DocumentError> {
        self.doc.searcher().index_reader()?;
        self.reader.get_or_try_init(|| self.doc.searcher().leaf_reader())
    }
}
