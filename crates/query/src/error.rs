use std::time::Duration;

use document::DocumentError;
use thiserror::Error;

/// Failure raised while evaluating one query predicate against a document.
///
/// These are data-dependent failures: the matcher records them per query and
/// carries on with the rest of the candidate set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
    /// The document handle could not be opened or read.
    #[error("io error: {0}")]
    Io(String),

    /// The predicate referenced a field it requires but the document lacks.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The predicate itself is malformed.
    #[error("invalid query: {0}")]
    Invalid(String),

    /// Evaluation was abandoned by the caller after the given budget.
    #[error("evaluation timed out after {0:?}")]
    Timeout(Duration),
}

impl EvalError {
    /// Short, stable label for logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            EvalError::Io(_) => "io",
            EvalError::UnknownField(_) => "unknown_field",
            EvalError::Invalid(_) => "invalid",
            EvalError::Timeout(_) => "timeout",
        }
    }
}

impl From<DocumentError> for EvalError {
    fn from(value: DocumentError) -> Self {
        EvalError::Io(value.to_string())
    }
}

impl From<std::io::Error> for EvalError {
    fn from(value: std::io::Error) -> Self {
        EvalError::Io(value.to_string())
    }
}
