use super::types::{QueryContext, QueryMonitor, QueryResult};
use dbal_check::StatementKind;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A monitor that tracks execution statistics.
#[derive(Debug, Default)]
pub struct StatsMonitor {
    total_queries: AtomicU64,
    failed_queries: AtomicU64,
    total_duration_nanos: AtomicU64,
    max_duration_nanos: AtomicU64,
    per_kind: Mutex<BTreeMap<&'static str, u64>>,
    slowest_query: Mutex<Option<String>>,
}

/// Collected statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryStats {
    /// Total number of statements executed (failures included).
    pub total_queries: u64,
    /// Number of failed statements.
    pub failed_queries: u64,
    /// Total execution time.
    pub total_duration: Duration,
    /// Statements per kind, keyed by keyword (`"SELECT"`, `"INSERT"`, ...).
    pub per_kind: BTreeMap<&'static str, u64>,
    /// Slowest statement duration.
    pub max_duration: Duration,
    /// Slowest statement SQL.
    pub slowest_query: Option<String>,
}

impl QueryStats {
    pub fn count(&self, kind: StatementKind) -> u64 {
        self.per_kind.get(kind.as_str()).copied().unwrap_or(0)
    }
}

impl StatsMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current statistics.
    pub fn stats(&self) -> QueryStats {
        QueryStats {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(self.total_duration_nanos.load(Ordering::Relaxed)),
            per_kind: self
                .per_kind
                .lock()
                .map(|m| m.clone())
                .unwrap_or_default(),
            max_duration: Duration::from_nanos(self.max_duration_nanos.load(Ordering::Relaxed)),
            slowest_query: self
                .slowest_query
                .lock()
                .map(|s| s.clone())
                .unwrap_or_default(),
        }
    }

    pub fn reset(&self) {
        self.total_queries.store(0, Ordering::Relaxed);
        self.failed_queries.store(0, Ordering::Relaxed);
        self.total_duration_nanos.store(0, Ordering::Relaxed);
        self.max_duration_nanos.store(0, Ordering::Relaxed);
        if let Ok(mut m) = self.per_kind.lock() {
            m.clear();
        }
        if let Ok(mut s) = self.slowest_query.lock() {
            *s = None;
        }
    }
}

impl QueryMonitor for StatsMonitor {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

        self.total_queries.fetch_add(1, Ordering::Relaxed);
        let prev = self.total_duration_nanos.fetch_add(nanos, Ordering::Relaxed);
        if prev.checked_add(nanos).is_none() {
            self.total_duration_nanos.store(u64::MAX, Ordering::Relaxed);
        }
        if result.is_error() {
            self.failed_queries.fetch_add(1, Ordering::Relaxed);
        }
        if let Ok(mut m) = self.per_kind.lock() {
            *m.entry(ctx.kind.as_str()).or_insert(0) += 1;
        }

        // Update the slowest query only when we actually become the new max.
        let mut current = self.max_duration_nanos.load(Ordering::Relaxed);
        while nanos > current {
            match self.max_duration_nanos.compare_exchange_weak(
                current,
                nanos,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    if let Ok(mut s) = self.slowest_query.lock() {
                        *s = Some(ctx.sql.clone());
                    }
                    break;
                }
                Err(updated) => current = updated,
            }
        }
    }
}
