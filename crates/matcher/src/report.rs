use serde::{Deserialize, Serialize};

use crate::matches::Matches;
use crate::types::MatchResult;

/// One failed query in a [`MatchReport`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorSummary {
    pub query_id: String,
    pub kind: String,
    pub message: String,
}

/// One slow evaluation in a [`MatchReport`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlowQuery {
    pub query_id: String,
    pub duration_ns: u64,
}

/// Strategy-independent summary of a finished pass, for logs and APIs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchReport {
    pub doc_id: String,
    pub presearcher_hits: usize,
    pub matched: Vec<String>,
    pub errors: Vec<ErrorSummary>,
    pub queries_run: usize,
    pub query_build_time_ms: u64,
    pub search_time_ms: u64,
    pub slow_queries: Vec<SlowQuery>,
}

impl MatchReport {
    pub fn matches_count(&self) -> usize {
        self.matched.len()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl<T: MatchResult> From<&Matches<T>> for MatchReport {
    fn from(m: &Matches<T>) -> Self {
        Self {
            doc_id: m.doc_id().to_string(),
            presearcher_hits: m.presearcher_hits().len(),
            matched: m.matched_ids().map(str::to_string).collect(),
            errors: m
                .errors()
                .iter()
                .map(|e| ErrorSummary {
                    query_id: e.query_id().to_string(),
                    kind: e.cause().kind().to_string(),
                    message: e.cause().to_string(),
                })
                .collect(),
            queries_run: m.queries_run(),
            query_build_time_ms: m.query_build_time_ms(),
            search_time_ms: m.search_time_ms(),
            slow_queries: m
                .slow_log()
                .iter()
                .map(|entry| SlowQuery {
                    query_id: entry.query_id.clone(),
                    duration_ns: entry.duration.as_nanos() as u64,
                })
                .collect(),
        }
    }
}
