//! Statement execution monitoring.
//!
//! Monitors are attached to a [`Database`](crate::Database) and notified after
//! every statement that reached the backend, with its duration and outcome.
//!
//! # Example
//!
//! ```
//! use dbal::monitor::StatsMonitor;
//! use dbal::{Database, DatabaseConfig, Statement};
//! use std::sync::Arc;
//!
//! let stats = Arc::new(StatsMonitor::new());
//! let db = Database::new(DatabaseConfig::sqlite_memory())?.with_monitor(stats.clone());
//! db.create("t").column("id", "INTEGER").execute()?;
//! assert_eq!(stats.stats().total_queries, 1);
//! # Ok::<(), dbal::DbError>(())
//! ```

mod monitors;
mod types;

#[cfg(feature = "tracing")]
mod tracing_monitor;


pub use monitors::{QueryStats, StatsMonitor};
pub use types::{QueryContext, QueryMonitor, QueryResult};

#[cfg(feature = "tracing")]
pub use tracing_monitor::TracingMonitor;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
