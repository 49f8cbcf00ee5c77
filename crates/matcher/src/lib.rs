//! # Candidate Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` runs the candidate queries selected for one document, merges
//! partial matches for the same query into a single result, records per-query
//! failures without aborting the batch, and keeps a slow log of expensive
//! evaluations. Each pass ends in an immutable [`Matches`] record.
//!
//! Documents come from the `document` crate and predicates from `query`;
//! query pre-selection happens upstream and is not part of this crate.
//!
//! ## Core Types
//!
//! - [`CandidateMatcher`]: one document, one pass. `match_query`, `add_match`
//!   and `report_error` feed it; `finish` closes it; `matches` reads it.
//! - [`MatchStrategy`]: the two hooks a strategy supplies, evaluating one
//!   predicate (`do_match_query`) and merging two results for the same query
//!   (`resolve`). Built-in strategies:
//!   - [`SimpleMatching`]: boolean, keeps the first match.
//!   - [`ScoringMatching`]: sums scores.
//!   - [`ExplainingMatching`]: joins explanations under `sum of:`.
//!   - [`HighlightingMatching`]: unions highlighted spans per field.
//! - [`SlowLog`]: queries whose evaluation strictly exceeded a limit.
//! - [`MatchError`]: a query id and the evaluation failure it raised.
//! - [`MatcherConfig`]: slow-log limit, strategy, decomposition and
//!   parallelism for driven passes.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use document::InputDocument;
//! use matcher::{CandidateMatcher, Metadata, ScoringMatching};
//! use query::Query;
//!
//! let doc = InputDocument::builder("doc-1")
//!     .add_field("body", "rust makes systems programming fun")
//!     .build()
//!     .expect("valid document");
//! let matcher = CandidateMatcher::new(Arc::new(doc), ScoringMatching);
//!
//! let query = Query::or(vec![Query::term("body", "rust"), Query::term("body", "fun")]);
//! for part in query.disjuncts() {
//!     matcher
//!         .match_query("q1", &part, &Metadata::new())
//!         .expect("query evaluates");
//! }
//! matcher.finish(Duration::ZERO, 1).expect("first finish");
//!
//! let matches = matcher.matches().expect("finished");
//! assert_eq!(matches.matches_count(), 1);
//! assert!((matches.get("q1").unwrap().score() - 2.0).abs() < 1e-6);
//! ```
//!
//! ## Observability
//!
//! Every pass emits a `match_pass_finished` tracing event. Install a
//! [`MatchMetrics`] implementation via [`set_match_metrics`] to receive one
//! [`PassStats`] per finished pass.

pub mod clock;
pub mod config;
pub mod driver;
pub mod engine;
pub mod matches;
pub mod metrics;
pub mod report;
mod serde_duration;
pub mod slowlog;
pub mod strategy;
pub mod types;

pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::config::{MatcherConfig, StrategyKind};
pub use crate::driver::{
    build_candidates, match_candidates, match_candidates_parallel, run_pass,
    run_pass_with_clock, CandidateQuery, MonitorQuery,
};
pub use crate::engine::CandidateMatcher;
pub use crate::matches::Matches;
pub use crate::metrics::{set_match_metrics, MatchMetrics, PassStats};
pub use crate::report::{ErrorSummary, MatchReport, SlowQuery};
pub use crate::slowlog::{SlowLog, SlowLogEntry, DEFAULT_SLOW_LOG_LIMIT};
pub use crate::strategy::{
    EvalContext, ExplainingMatch, ExplainingMatching, HighlightingMatching, HighlightsMatch,
    MatchStrategy, ScoringMatch, ScoringMatching, SimpleMatching,
};
pub use crate::types::{MatchError, MatchResult, MatcherError, Metadata, Phase, QueryMatch};
