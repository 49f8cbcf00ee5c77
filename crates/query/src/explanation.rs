use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

const SUM: &str = "sum of:";

/// Tree describing how a score was computed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Explanation {
    pub value: f32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Explanation>,
}

impl Explanation {
    pub fn new(value: f32, description: impl Into<String>) -> Self {
        Self {
            value,
            description: description.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<Explanation>) -> Self {
        self.details = details;
        self
    }

    /// `sum of:` node whose value is the sum of its children.
    pub fn sum(details: Vec<Explanation>) -> Self {
        let value = details.iter().map(|d| d.value).sum();
        Self::new(value, SUM).with_details(details)
    }

    /// Join `parts` under one flat `sum of:` node.
    ///
    /// Top-level `sum of:` nodes in `parts` are inlined and the children are
    /// put in a canonical order, so repeated joins give the same tree
    /// whatever order the parts arrive in.
    pub fn flat_sum(parts: Vec<Explanation>) -> Self {
        let mut details = Vec::with_capacity(parts.len());
        for part in parts {
            if part.description == SUM {
                details.extend(part.details);
            } else {
                details.push(part);
            }
        }
        details.sort_by(Explanation::canonical_cmp);
        Self::sum(details)
    }

    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.description
            .cmp(&other.description)
            .then_with(|| self.value.total_cmp(&other.value))
            .then_with(|| self.details.len().cmp(&other.details.len()))
            .then_with(|| {
                self.details
                    .iter()
                    .zip(&other.details)
                    .map(|(a, b)| a.canonical_cmp(b))
                    .find(|ord| ord.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{} = {}", "", self.value, self.description, indent = depth * 2)?;
        for detail in &self.details {
            detail.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_adds_child_values() {
        let exp = Explanation::sum(vec![
            Explanation::new(1.5, "a"),
            Explanation::new(2.0, "b"),
        ]);
        assert_eq!(exp.value, 3.5);
        assert_eq!(exp.details.len(), 2);
    }

    #[test]
    fn flat_sum_inlines_nested_sums_in_canonical_order() {
        let ab =
            Explanation::flat_sum(vec![Explanation::new(2.0, "b"), Explanation::new(1.0, "a")]);
        let abc = Explanation::flat_sum(vec![Explanation::new(3.0, "c"), ab]);
        let descriptions: Vec<&str> = abc.details.iter().map(|d| d.description.as_str()).collect();
        assert_eq!(descriptions, vec!["a", "b", "c"]);
        assert_eq!(abc.value, 6.0);
    }

    #[test]
    fn flat_sum_keeps_non_sum_subtrees_intact() {
        let weighted =
            Explanation::new(2.0, "weight").with_details(vec![Explanation::new(4.0, "freq")]);
        let joined = Explanation::flat_sum(vec![weighted.clone(), Explanation::new(1.0, "a")]);
        assert_eq!(joined.details, vec![Explanation::new(1.0, "a"), weighted]);
    }

    #[test]
    fn display_indents_children() {
        let exp = Explanation::sum(vec![Explanation::new(1.0, "leaf")]);
        assert_eq!(exp.to_string(), "1 = sum of:\n  1 = leaf\n");
    }
}
