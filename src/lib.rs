//! Workspace umbrella crate for qmonitor.
//!
//! Stitches the document model, query predicates and the candidate matcher
//! together so callers can match registered queries against a document with a
//! single call. YAML configuration and log setup live in [`config`].

pub mod config;

pub use crate::config::{init_tracing, ConfigLoadError, LoggingConfig, MonitorConfig};
pub use document::{DocumentError, InputDocument, InputDocumentBuilder, LeafReader};
pub use matcher::{
    build_candidates, run_pass, set_match_metrics, CandidateMatcher, CandidateQuery,
    ExplainingMatch, ExplainingMatching, HighlightingMatching, HighlightsMatch, MatchError,
    MatchMetrics, MatchReport, MatchResult, MatchStrategy, MatcherConfig, MatcherError, Matches,
    Metadata, MonitorQuery, PassStats, QueryMatch, ScoringMatch, ScoringMatching, SimpleMatching,
    SlowLog, StrategyKind,
};
pub use query::{EvalError, Evaluation, Explanation, Predicate, Query};

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

/// Match `queries` against `doc` using the strategy named in `cfg` and
/// summarize the pass.
///
/// The time spent turning `queries` into candidates is reported as the
/// pass's query build time. Per-query evaluation failures end up in the
/// report; only misuse and invalid configuration are returned as errors.
pub fn process_document(
    doc: Arc<InputDocument>,
    queries: &[MonitorQuery],
    cfg: &MatcherConfig,
) -> Result<MatchReport, MatcherError> {
    cfg.validate()?;
    let build_start = Instant::now();
    let candidates = build_candidates(queries, cfg.decompose);
    let query_build_time = build_start.elapsed();

    let report = match cfg.strategy {
        StrategyKind::Simple => {
            let m = run_pass(doc, SimpleMatching, &candidates, cfg, query_build_time)?;
            MatchReport::from(&m)
        }
        StrategyKind::Scoring => {
            let m = run_pass(doc, ScoringMatching, &candidates, cfg, query_build_time)?;
            MatchReport::from(&m)
        }
        StrategyKind::Explaining => {
            let m = run_pass(doc, ExplainingMatching, &candidates, cfg, query_build_time)?;
            MatchReport::from(&m)
        }
        StrategyKind::Highlighting => {
            let m = run_pass(doc, HighlightingMatching, &candidates, cfg, query_build_time)?;
            MatchReport::from(&m)
        }
    };

    info!(
        doc_id = %report.doc_id,
        queries = queries.len(),
        candidates = candidates.len(),
        matches = report.matches_count(),
        errors = report.errors.len(),
        "document_processed"
    );
    Ok(report)
}
