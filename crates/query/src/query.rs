//! Reference query language used by tests, benches and the demo binary.
//!
//! Scoring is intentionally simple (`sqrt(freq)` per term or phrase, summed
//! over clauses). It exists so matching strategies have a real score,
//! explanation and span set to carry, not to rank documents.
use std::collections::BTreeSet;
use std::fmt;

use document::{normalize_term, LeafReader, Posting};
use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::explanation::Explanation;
use crate::predicate::{merge_spans, Evaluation, FieldSpans, Predicate, Span};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    /// Single term in a field.
    Term { field: String, term: String },
    /// Consecutive terms in a field.
    Phrase { field: String, terms: Vec<String> },
    /// Every clause must match.
    And { clauses: Vec<Query> },
    /// At least one clause must match.
    Or { clauses: Vec<Query> },
    /// `include` must match and `exclude` must not.
    AndNot {
        include: Box<Query>,
        exclude: Box<Query>,
    },
}

impl Query {
    pub fn term(field: impl Into<String>, term: impl Into<String>) -> Self {
        Query::Term {
            field: field.into(),
            term: term.into(),
        }
    }

    pub fn phrase<I, T>(field: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Query::Phrase {
            field: field.into(),
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn and(clauses: Vec<Query>) -> Self {
        Query::And { clauses }
    }

    pub fn or(clauses: Vec<Query>) -> Self {
        Query::Or { clauses }
    }

    pub fn and_not(include: Query, exclude: Query) -> Self {
        Query::AndNot {
            include: Box::new(include),
            exclude: Box::new(exclude),
        }
    }

    /// Split a query into independently matchable disjuncts.
    ///
    /// Nested top-level disjunctions are flattened; anything else is returned
    /// whole. Each disjunct matching on its own implies the original matches.
    pub fn disjuncts(self) -> Vec<Query> {
        match self {
            Query::Or { clauses } if !clauses.is_empty() => {
                clauses.into_iter().flat_map(Query::disjuncts).collect()
            }
            other => vec![other],
        }
    }

    fn eval(&self, reader: &LeafReader) -> Result<Option<Evaluation>, EvalError> {
        match self {
            Query::Term { field, term } => {
                let term = normalize_term(term);
                if term.is_empty() {
                    return Err(EvalError::Invalid(format!("empty term for field {field}")));
                }
                let postings = reader.postings(field, &term);
                if postings.is_empty() {
                    return Ok(None);
                }
                let spans = postings.iter().map(single_span).collect();
                Ok(Some(frequency_match(field, &term, postings.len(), spans)))
            }
            Query::Phrase { field, terms } => {
                let terms: Vec<String> = terms.iter().map(|t| normalize_term(t)).collect();
                if terms.is_empty() || terms.iter().any(String::is_empty) {
                    return Err(EvalError::Invalid(format!("empty phrase for field {field}")));
                }
                let spans = phrase_spans(reader, field, &terms);
                if spans.is_empty() {
                    return Ok(None);
                }
                let joined = format!("\"{}\"", terms.join(" "));
                Ok(Some(frequency_match(field, &joined, spans.len(), spans)))
            }
            Query::And { clauses } => {
                if clauses.is_empty() {
                    return Err(EvalError::Invalid("conjunction without clauses".into()));
                }
                let mut parts = Vec::with_capacity(clauses.len());
                for clause in clauses {
                    match clause.eval(reader)? {
                        Some(part) => parts.push(part),
                        None => return Ok(None),
                    }
                }
                Ok(Some(combine(parts)))
            }
            Query::Or { clauses } => {
                if clauses.is_empty() {
                    return Err(EvalError::Invalid("disjunction without clauses".into()));
                }
                let mut parts = Vec::new();
                for clause in clauses {
                    if let Some(part) = clause.eval(reader)? {
                        parts.push(part);
                    }
                }
                if parts.is_empty() {
                    return Ok(None);
                }
                Ok(Some(combine(parts)))
            }
            Query::AndNot { include, exclude } => {
                let Some(included) = include.eval(reader)? else {
                    return Ok(None);
                };
                if exclude.eval(reader)?.is_some() {
                    return Ok(None);
                }
                Ok(Some(included))
            }
        }
    }
}

impl Predicate for Query {
    fn evaluate(&self, reader: &LeafReader) -> Result<Option<Evaluation>, EvalError> {
        self.eval(reader)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, clauses: &[Query], op: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, clause) in clauses.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{clause}")?;
            }
            write!(f, ")")
        }

        match self {
            Query::Term { field, term } => write!(f, "{field}:{term}"),
            Query::Phrase { field, terms } => write!(f, "{field}:\"{}\"", terms.join(" ")),
            Query::And { clauses } => join(f, clauses, "AND"),
            Query::Or { clauses } => join(f, clauses, "OR"),
            Query::AndNot { include, exclude } => write!(f, "({include} NOT {exclude})"),
        }
    }
}

fn single_span(p: &Posting) -> Span {
    Span {
        start_position: p.position,
        end_position: p.position,
        start_offset: p.start,
        end_offset: p.end,
    }
}

fn phrase_spans(reader: &LeafReader, field: &str, terms: &[String]) -> BTreeSet<Span> {
    let first = reader.postings(field, &terms[0]);
    let rest: Vec<&[Posting]> = terms[1..]
        .iter()
        .map(|t| reader.postings(field, t))
        .collect();

    first
        .iter()
        .filter_map(|start| {
            let mut last = start;
            for (offset, postings) in rest.iter().enumerate() {
                let want = start.position + offset as u32 + 1;
                let idx = postings.binary_search_by_key(&want, |p| p.position).ok()?;
                last = &postings[idx];
            }
            Some(Span {
                start_position: start.position,
                end_position: last.position,
                start_offset: start.start,
                end_offset: last.end,
            })
        })
        .collect()
}

fn frequency_match(field: &str, what: &str, freq: usize, spans: BTreeSet<Span>) -> Evaluation {
    let score = (freq as f32).sqrt();
    let explanation = Explanation::new(score, format!("weight({field}:{what}), sqrt of:"))
        .with_details(vec![Explanation::new(freq as f32, "freq")]);
    let mut field_spans = FieldSpans::new();
    field_spans.insert(field.to_string(), spans);
    Evaluation::new(score, explanation).with_spans(field_spans)
}

fn combine(mut parts: Vec<Evaluation>) -> Evaluation {
    if parts.len() == 1 {
        if let Some(only) = parts.pop() {
            return only;
        }
    }
    let mut spans = FieldSpans::new();
    let mut details = Vec::with_capacity(parts.len());
    for part in parts {
        merge_spans(&mut spans, part.spans);
        details.push(part.explanation);
    }
    let explanation = Explanation::sum(details);
    Evaluation::new(explanation.value, explanation).with_spans(spans)
}
