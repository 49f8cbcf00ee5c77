use std::collections::HashMap;
use std::fmt;

use query::EvalError;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Free-form key/value metadata stored alongside a registered query.
pub type Metadata = HashMap<String, String>;

/// Identifies which query matched which document.
///
/// Both ids are non-empty and fixed at construction. Every strategy's match
/// type embeds one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QueryMatch {
    query_id: String,
    doc_id: String,
}

impl QueryMatch {
    pub fn new(
        query_id: impl Into<String>,
        doc_id: impl Into<String>,
    ) -> Result<Self, MatcherError> {
        let query_id = query_id.into();
        let doc_id = doc_id.into();
        if query_id.trim().is_empty() {
            return Err(MatcherError::EmptyQueryId);
        }
        if doc_id.trim().is_empty() {
            return Err(MatcherError::EmptyDocId);
        }
        Ok(Self { query_id, doc_id })
    }

    /// Both ids were validated by the caller.
    pub(crate) fn from_validated(query_id: &str, doc_id: &str) -> Self {
        Self {
            query_id: query_id.to_string(),
            doc_id: doc_id.to_string(),
        }
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }
}

/// A strategy-specific match value.
pub trait MatchResult: Clone + fmt::Debug + Send + Sync + 'static {
    fn query_match(&self) -> &QueryMatch;

    fn query_id(&self) -> &str {
        self.query_match().query_id()
    }

    fn doc_id(&self) -> &str {
        self.query_match().doc_id()
    }
}

impl MatchResult for QueryMatch {
    fn query_match(&self) -> &QueryMatch {
        self
    }
}

/// A candidate query that failed to evaluate.
///
/// Recorded by the matcher and carried into [`Matches`](crate::Matches); it
/// never aborts the rest of the document's pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("query {query_id} failed: {cause}")]
pub struct MatchError {
    query_id: String,
    #[source]
    cause: EvalError,
}

impl MatchError {
    pub fn new(query_id: impl Into<String>, cause: EvalError) -> Self {
        Self {
            query_id: query_id.into(),
            cause,
        }
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    pub fn cause(&self) -> &EvalError {
        &self.cause
    }
}

impl Serialize for MatchError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("MatchError", 3)?;
        state.serialize_field("query_id", &self.query_id)?;
        state.serialize_field("kind", self.cause.kind())?;
        state.serialize_field("message", &self.cause.to_string())?;
        state.end()
    }
}

/// Lifecycle of a [`CandidateMatcher`](crate::CandidateMatcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Constructed; slow-log limit may still be changed.
    Created,
    /// At least one query, match or error has been recorded.
    Matching,
    /// `finish` was called; only reads are allowed.
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Created => "created",
            Phase::Matching => "matching",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Errors produced by the matching layer.
///
/// Everything except [`Evaluation`](MatcherError::Evaluation) signals driver
/// misuse and should not be turned into a [`MatchError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatcherError {
    #[error("query id must not be empty")]
    EmptyQueryId,

    #[error("document id must not be empty")]
    EmptyDocId,

    /// Operation called out of lifecycle order.
    #[error("cannot {op} while the matcher is {phase}")]
    InvalidPhase { op: &'static str, phase: Phase },

    /// A match was added under an id other than its own.
    #[error("match for query {found} added under query id {expected}")]
    QueryIdMismatch { expected: String, found: String },

    #[error("invalid matcher config: {0}")]
    InvalidConfig(String),

    /// The query could not be evaluated against the document.
    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvalError),
}

impl MatcherError {
    /// `true` when the error indicates a programming mistake rather than a
    /// data-dependent failure.
    pub fn is_usage(&self) -> bool {
        !matches!(self, MatcherError::Evaluation(_))
    }
}
