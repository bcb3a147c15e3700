//! Error types for dbal

use dbal_check::Rejection;
use thiserror::Error;

/// Result type alias for dbal operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum DbError {
    /// Builder misuse: repeated exactly-once clause, empty IN list, bind mode mixing, ...
    #[error("Structural error: {0}")]
    Structural(String),

    /// The validation guard refused the serialized SQL; the backend was never contacted.
    #[error("Rejected SQL: {reason}")]
    Rejected { reason: Rejection, sql: String },

    /// Backend failure (connect, prepare, bind, execute, fetch, transaction control).
    #[error("Database error [{code}]: {message}")]
    Database {
        code: i64,
        message: String,
        sql: Option<String>,
    },

    /// Cursor state machine violation
    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),

    /// Value could not be coerced to the requested type
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Invalid configuration or unknown driver key
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Programming errors on a tabular result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// `next()` was called again after it already reported the end of the stream.
    #[error("next() called after end of stream")]
    AfterEnd,

    /// `rows()` requires an untouched cursor.
    #[error("rows already consumed ({consumed} fetched before rows())")]
    AlreadyConsumed { consumed: usize },

    /// Forward-only cursors cannot move back.
    #[error("cannot fetch row {requested} backwards from position {position}")]
    Backward { position: usize, requested: usize },
}

impl DbError {
    /// Create a structural (builder misuse) error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Wrap a backend failure together with the SQL that caused it.
    pub fn database(err: crate::driver::BackendError, sql: Option<&str>) -> Self {
        Self::Database {
            code: err.code,
            message: err.message,
            sql: sql.map(str::to_string),
        }
    }

    /// Check if this is a structural error
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }

    /// Check if this is a guard rejection
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Check if this is a backend error
    pub fn is_database(&self) -> bool {
        matches!(self, Self::Database { .. })
    }

    /// Check if this is a cursor state error
    pub fn is_cursor(&self) -> bool {
        matches!(self, Self::Cursor(_))
    }

    /// SQL text attached to this error, if any.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Rejected { sql, .. } => Some(sql),
            Self::Database { sql, .. } => sql.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::BackendError;

    #[test]
    fn database_error_keeps_structured_fields() {
        let err = DbError::database(
            BackendError::new(1, "no such table: users"),
            Some("SELECT * FROM `users`"),
        );
        assert!(err.is_database());
        assert_eq!(err.sql(), Some("SELECT * FROM `users`"));
        assert_eq!(err.to_string(), "Database error [1]: no such table: users");
    }

    #[test]
    fn cursor_error_converts() {
        let err: DbError = CursorError::AlreadyConsumed { consumed: 2 }.into();
        assert!(err.is_cursor());
        assert_eq!(
            err.to_string(),
            "Cursor error: rows already consumed (2 fetched before rows())"
        );
    }
}
