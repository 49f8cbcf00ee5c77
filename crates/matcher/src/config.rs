use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::slowlog::DEFAULT_SLOW_LOG_LIMIT;
use crate::types::MatcherError;

/// Which built-in strategy a configured pass uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Boolean matching.
    #[default]
    Simple,
    /// Scores summed across partial matches.
    Scoring,
    /// Explanations joined across partial matches.
    Explaining,
    /// Highlighted spans unioned across partial matches.
    Highlighting,
}

/// Configuration for one matching pass.
///
/// Cheap to clone and serde-friendly so it can be embedded in higher-level
/// configs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatcherConfig {
    /// Configuration schema version.
    pub version: String,
    /// Evaluations strictly slower than this many nanoseconds are logged.
    #[serde(default = "MatcherConfig::default_slow_log_limit_ns")]
    pub slow_log_limit_ns: u64,
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Split registered disjunctions into separately matched parts.
    #[serde(default = "MatcherConfig::default_decompose")]
    pub decompose: bool,
    /// Evaluate candidates for one document on a rayon pool.
    #[serde(default)]
    pub parallel: bool,
    /// Worker count for parallel passes; the global rayon pool when unset.
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl MatcherConfig {
    pub(crate) fn default_slow_log_limit_ns() -> u64 {
        DEFAULT_SLOW_LOG_LIMIT.as_nanos() as u64
    }

    pub(crate) fn default_decompose() -> bool {
        true
    }

    pub fn slow_log_limit(&self) -> Duration {
        Duration::from_nanos(self.slow_log_limit_ns)
    }

    pub fn validate(&self) -> Result<(), MatcherError> {
        if self.version.trim().is_empty() {
            return Err(MatcherError::InvalidConfig(
                "version must not be empty".into(),
            ));
        }
        if self.worker_threads == Some(0) {
            return Err(MatcherError::InvalidConfig(
                "worker_threads must be greater than zero".into(),
            ));
        }
        if self.worker_threads.is_some() && !self.parallel {
            return Err(MatcherError::InvalidConfig(
                "worker_threads requires parallel = true".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            slow_log_limit_ns: Self::default_slow_log_limit_ns(),
            strategy: StrategyKind::default(),
            decompose: Self::default_decompose(),
            parallel: false,
            worker_threads: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = MatcherConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.slow_log_limit(), DEFAULT_SLOW_LOG_LIMIT);
        assert_eq!(cfg.strategy, StrategyKind::Simple);
        assert!(cfg.decompose);
    }

    #[test]
    fn zero_workers_rejected() {
        let cfg = MatcherConfig {
            parallel: true,
            worker_threads: Some(0),
            ..MatcherConfig::default()
        };
        match cfg.validate().expect_err("config should be invalid") {
            MatcherError::InvalidConfig(msg) => assert!(msg.contains("worker_threads")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn workers_without_parallel_rejected() {
        let cfg = MatcherConfig {
            worker_threads: Some(4),
            ..MatcherConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: MatcherConfig =
            serde_json::from_str(r#"{"version":"v1","strategy":"scoring"}"#).expect("parse");
        assert_eq!(cfg.strategy, StrategyKind::Scoring);
        assert_eq!(cfg.slow_log_limit_ns, 2_000_000);
        assert!(cfg.decompose);
        assert!(!cfg.parallel);
    }
}
