use dbal_check::StatementKind;
use std::fmt;
use std::time::Duration;

/// Context information about the statement being executed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// The SQL sent to the backend.
    pub sql: String,
    /// Number of bound values.
    pub param_count: usize,
    /// Statement kind of the builder that produced the SQL.
    pub kind: StatementKind,
}

impl QueryContext {
    pub fn new(sql: &str, param_count: usize, kind: StatementKind) -> Self {
        Self {
            sql: sql.to_string(),
            param_count,
            kind,
        }
    }
}

/// Maximum length for error messages in `QueryResult::Error`.
const MAX_ERROR_LEN: usize = 512;

/// Result of a statement execution for monitoring purposes.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Statement returned a row set.
    Rows,
    /// Statement changed this many rows.
    Affected(u64),
    /// Execution failed (message truncated to 512 bytes).
    Error(String),
}

impl QueryResult {
    /// Create an error result, truncating the message to avoid monitoring data explosion.
    pub fn error(msg: String) -> Self {
        if msg.len() > MAX_ERROR_LEN {
            Self::Error(format!("{}...", super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
        } else {
            Self::Error(msg)
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows => write!(f, "rows"),
            QueryResult::Affected(n) => write!(f, "{n} affected"),
            QueryResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Observer of statement execution.
///
/// Monitors see every statement that reached the backend, failed or not.
/// Statements refused by the builder or the validation guard never get here.
pub trait QueryMonitor: Send + Sync {
    /// Called after a statement completes (success or failure).
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult);

    /// Called when a statement exceeds the slow-query threshold.
    ///
    /// Default implementation does nothing.
    fn on_slow_query(&self, _ctx: &QueryContext, _duration: Duration) {}
}
