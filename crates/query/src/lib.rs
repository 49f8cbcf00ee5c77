//! # Query predicates (`query`)
//!
//! The matching layer treats a query as an opaque [`Predicate`]: something
//! that, given a flattened [`LeafReader`](document::LeafReader), either
//! matches and yields an [`Evaluation`] (score, [`Explanation`], highlighted
//! [`Span`]s) or does not. Failures surface as [`EvalError`].
//!
//! [`Query`] is a small reference implementation of that capability with
//! term, phrase and boolean clauses, plus [`Query::disjuncts`] for splitting a
//! disjunction into separately matchable parts.

mod error;
mod explanation;
mod predicate;
mod query;

pub use crate::error::EvalError;
pub use crate::explanation::Explanation;
pub use crate::predicate::{merge_spans, Evaluation, FieldSpans, Predicate, Span};
pub use crate::query::Query;
