// Metrics hooks for the `matcher` crate.
//
// Callers install a global `MatchMetrics` implementation via [`set_match_metrics`];
// every `CandidateMatcher::finish` then reports one `PassStats` for its document.
// This keeps instrumentation decoupled from any specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

/// Summary of one finished matching pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    pub presearcher_hits: usize,
    pub matches: usize,
    pub errors: usize,
    pub queries_run: usize,
    pub slow_queries: usize,
    pub query_build_time: Duration,
    pub search_time: Duration,
}

/// Metrics observer for matching passes.
pub trait MatchMetrics: Send + Sync {
    /// Record the outcome of one document's pass.
    ///
    /// `strategy` is the [`MatchStrategy::name`](crate::MatchStrategy::name)
    /// of the matcher that ran it.
    fn record_pass(&self, doc_id: &str, strategy: &'static str, stats: &PassStats);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn MatchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn MatchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn MatchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global match metrics recorder.
///
/// This is typically called once during service startup so all matchers
/// share the same metrics backend.
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
