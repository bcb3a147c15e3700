//! In-handle query log and statistics.

use crate::value::{Value, ValueList};
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::Serialize;
use std::time::Duration;

/// Queries slower than this are reported by [`QueryLog::slow_queries`].
pub const SLOW_QUERY_THRESHOLD: Duration = Duration::from_micros(99_900);

/// One successfully executed statement.
#[derive(Debug, Clone, Serialize)]
pub struct QueryLogEntry {
    pub executed_at: DateTime<Utc>,
    pub duration: Duration,
    /// SQL as sent to the backend.
    pub sql: String,
    /// SQL with display literals in place of placeholders.
    pub formatted_sql: String,
    /// Hex md5 of `sql`.
    pub hash: String,
    pub values: Vec<Value>,
}

impl QueryLogEntry {
    pub fn new(sql: &str, values: &ValueList, duration: Duration) -> Self {
        Self {
            executed_at: Utc::now(),
            duration,
            sql: sql.to_string(),
            formatted_sql: values.interpolate(sql),
            hash: sql_hash(sql),
            values: values.values(),
        }
    }

    pub fn is_slow(&self) -> bool {
        self.duration > SLOW_QUERY_THRESHOLD
    }
}

/// Hex md5 digest identifying a SQL text.
pub fn sql_hash(sql: &str) -> String {
    hex::encode(Md5::digest(sql.as_bytes()))
}

/// Log of executed statements.
#[derive(Debug, Clone, Default)]
pub struct QueryLog {
    entries: Vec<QueryLogEntry>,
}

/// Aggregate view of a [`QueryLog`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryLogSummary {
    pub query_count: usize,
    pub total_time: Duration,
    pub slow_count: usize,
}

impl QueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: QueryLogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[QueryLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn slow_queries(&self) -> Vec<QueryLogEntry> {
        self.entries.iter().filter(|e| e.is_slow()).cloned().collect()
    }

    pub fn total_time(&self) -> Duration {
        self.entries.iter().map(|e| e.duration).sum()
    }

    pub fn summary(&self) -> QueryLogSummary {
        QueryLogSummary {
            query_count: self.entries.len(),
            total_time: self.total_time(),
            slow_count: self.entries.iter().filter(|e| e.is_slow()).count(),
        }
    }

    /// Remove and return all entries.
    pub fn drain(&mut self) -> Vec<QueryLogEntry> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ms: u64) -> QueryLogEntry {
        QueryLogEntry::new(
            "SELECT * FROM `t` WHERE `id` = ?",
            &ValueList::positional([Value::Int(3)]),
            Duration::from_millis(ms),
        )
    }

    #[test]
    fn entry_fields() {
        let e = entry(1);
        assert_eq!(e.formatted_sql, "SELECT * FROM `t` WHERE `id` = 3");
        assert_eq!(e.hash.len(), 32);
        assert_eq!(e.hash, sql_hash("SELECT * FROM `t` WHERE `id` = ?"));
        assert_eq!(e.values, vec![Value::Int(3)]);
    }

    #[test]
    fn md5_of_empty_string() {
        assert_eq!(sql_hash(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn slow_threshold_is_strict() {
        let mut log = QueryLog::new();
        log.record(entry(10));
        log.record(entry(100));
        let mut at_threshold = entry(0);
        at_threshold.duration = SLOW_QUERY_THRESHOLD;
        log.record(at_threshold);

        assert_eq!(log.slow_queries().len(), 1);
        let summary = log.summary();
        assert_eq!(summary.query_count, 3);
        assert_eq!(summary.slow_count, 1);
        assert_eq!(
            summary.total_time,
            Duration::from_millis(110) + SLOW_QUERY_THRESHOLD
        );
    }
}
