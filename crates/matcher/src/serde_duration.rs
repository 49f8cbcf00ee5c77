//! Serialization helpers for `Duration` fields.

use serde::Serializer;
use std::time::Duration;

/// Serialize Duration as whole milliseconds.
pub fn millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Serialize Duration as nanoseconds.
pub fn nanos<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_nanos() as u64)
}
