use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::Serialize;

use crate::serde_duration;
use crate::slowlog::SlowLog;
use crate::types::{MatchError, MatchResult};

/// Immutable outcome of one document's matching pass.
///
/// Every key of [`matches`](Self::matches) is also a member of
/// [`presearcher_hits`](Self::presearcher_hits). A query id may appear in
/// both the matches and the errors when separate evaluations of it disagreed;
/// the two are never reconciled here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matches<T> {
    doc_id: String,
    presearcher_hits: BTreeSet<String>,
    matches: BTreeMap<String, T>,
    errors: Vec<MatchError>,
    #[serde(rename = "query_build_time_ms", serialize_with = "serde_duration::millis")]
    query_build_time: Duration,
    #[serde(rename = "search_time_ms", serialize_with = "serde_duration::millis")]
    search_time: Duration,
    queries_run: usize,
    slow_log: SlowLog,
}

impl<T: MatchResult> Matches<T> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        doc_id: String,
        presearcher_hits: BTreeSet<String>,
        matches: BTreeMap<String, T>,
        errors: Vec<MatchError>,
        query_build_time: Duration,
        search_time: Duration,
        queries_run: usize,
        slow_log: SlowLog,
    ) -> Self {
        debug_assert!(matches.keys().all(|id| presearcher_hits.contains(id)));
        Self {
            doc_id,
            presearcher_hits,
            matches,
            errors,
            query_build_time,
            search_time,
            queries_run,
            slow_log,
        }
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Query ids that were attempted during the pass.
    pub fn presearcher_hits(&self) -> &BTreeSet<String> {
        &self.presearcher_hits
    }

    /// Merged matches keyed by query id.
    pub fn matches(&self) -> &BTreeMap<String, T> {
        &self.matches
    }

    pub fn get(&self, query_id: &str) -> Option<&T> {
        self.matches.get(query_id)
    }

    pub fn matched_ids(&self) -> impl Iterator<Item = &str> {
        self.matches.keys().map(String::as_str)
    }

    pub fn matches_count(&self) -> usize {
        self.matches.len()
    }

    pub fn errors(&self) -> &[MatchError] {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Time the caller spent building the candidate set, as supplied to
    /// `finish`.
    pub fn query_build_time(&self) -> Duration {
        self.query_build_time
    }

    pub fn query_build_time_ms(&self) -> u64 {
        self.query_build_time.as_millis() as u64
    }

    /// Time between matcher construction and `finish`.
    pub fn search_time(&self) -> Duration {
        self.search_time
    }

    pub fn search_time_ms(&self) -> u64 {
        self.search_time.as_millis() as u64
    }

    pub fn queries_run(&self) -> usize {
        self.queries_run
    }

    pub fn slow_log(&self) -> &SlowLog {
        &self.slow_log
    }
}
