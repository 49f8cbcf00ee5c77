//! Threshold-based recorder of slow query evaluations.
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::serde_duration;

/// Limit applied when none is configured.
pub const DEFAULT_SLOW_LOG_LIMIT: Duration = Duration::from_millis(2);

/// One query whose evaluation exceeded the slow-log limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlowLogEntry {
    pub query_id: String,
    #[serde(rename = "duration_ns", serialize_with = "serde_duration::nanos")]
    pub duration: Duration,
}

/// Per-pass record of queries slower than a configured limit.
///
/// Entries keep insertion order. A query evaluated more than once (for
/// example one entry per disjunct) may appear more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlowLog {
    #[serde(rename = "limit_ns", serialize_with = "serde_duration::nanos")]
    limit: Duration,
    entries: Vec<SlowLogEntry>,
}

impl SlowLog {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_SLOW_LOG_LIMIT)
    }

    pub fn with_limit(limit: Duration) -> Self {
        Self {
            limit,
            entries: Vec::new(),
        }
    }

    pub fn set_limit(&mut self, limit: Duration) {
        self.limit = limit;
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Record `duration` for `query_id` if it strictly exceeds the limit.
    /// Returns whether an entry was added.
    pub fn add_query(&mut self, query_id: &str, duration: Duration) -> bool {
        if duration <= self.limit {
            return false;
        }
        self.entries.push(SlowLogEntry {
            query_id: query_id.to_string(),
            duration,
        });
        true
    }

    /// Append every entry of `other`, keeping this log's limit.
    pub fn merge(&mut self, other: &SlowLog) {
        self.entries.extend(other.entries.iter().cloned());
    }

    pub fn entries(&self) -> &[SlowLogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SlowLogEntry> {
        self.entries.iter()
    }

    pub fn contains(&self, query_id: &str) -> bool {
        self.entries.iter().any(|e| e.query_id == query_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SlowLog {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a SlowLog {
    type Item = &'a SlowLogEntry;
    type IntoIter = std::slice::Iter<'a, SlowLogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for SlowLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Limit: {}ns", self.limit.as_nanos())?;
        for entry in &self.entries {
            writeln!(f, "\t{} [{}ns]", entry.query_id, entry.duration.as_nanos())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_only_durations_above_limit() {
        let mut log = SlowLog::with_limit(Duration::from_millis(1));
        assert!(!log.add_query("fast", Duration::from_micros(100)));
        assert!(!log.add_query("edge", Duration::from_millis(1)));
        assert!(log.add_query("slow", Duration::from_millis(5)));

        assert_eq!(log.len(), 1);
        assert!(log.contains("slow"));
        assert_eq!(log.entries()[0].duration, Duration::from_millis(5));
    }

    #[test]
    fn default_limit_is_two_millis() {
        assert_eq!(SlowLog::default().limit(), DEFAULT_SLOW_LOG_LIMIT);
        assert!(SlowLog::default().is_empty());
    }

    #[test]
    fn merge_appends_entries_and_keeps_own_limit() {
        let mut a = SlowLog::with_limit(Duration::ZERO);
        a.add_query("q1", Duration::from_nanos(10));
        let mut b = SlowLog::with_limit(Duration::from_secs(1));
        b.entries.push(SlowLogEntry {
            query_id: "q2".into(),
            duration: Duration::from_nanos(20),
        });

        a.merge(&b);
        let ids: Vec<&str> = a.iter().map(|e| e.query_id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
        assert_eq!(a.limit(), Duration::ZERO);
    }

    #[test]
    fn display_lists_limit_and_entries() {
        let mut log = SlowLog::with_limit(Duration::from_nanos(5));
        log.add_query("q1", Duration::from_nanos(7));
        assert_eq!(log.to_string(), "Limit: 5ns\n\tq1 [7ns]\n");
    }

    #[test]
    fn serializes_durations_as_nanos() {
        let mut log = SlowLog::with_limit(Duration::from_micros(1));
        log.add_query("q1", Duration::from_micros(3));
        let json = serde_json::to_value(&log).expect("serialize");
        assert_eq!(json["limit_ns"], 1_000);
        assert_eq!(json["entries"][0]["duration_ns"], 3_000);
    }
}
