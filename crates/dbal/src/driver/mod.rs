//! Backend boundary: drivers, connections, prepared statements and cursors.
//!
//! The engine only talks to these traits. Drivers are looked up by exact key in a
//! [`DriverRegistry`], which callers populate explicitly (or take
//! [`DriverRegistry::with_defaults`]).

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;

use crate::config::DatabaseConfig;
use crate::error::{DbError, DbResult};
use crate::value::{BoundValue, Placeholder, Value};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// A failure reported by the backend, before it is tied to a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    /// Backend error code (`-1` when the driver has none).
    pub code: i64,
    pub message: String,
}

impl BackendError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for BackendError {}

/// Creates connections for one backend.
pub trait Driver: Send + Sync {
    /// Registry key of this driver.
    fn name(&self) -> &'static str;

    /// Character used to quote identifiers.
    fn quote_char(&self) -> char {
        '`'
    }

    fn connect(&self, config: &DatabaseConfig) -> Result<Box<dyn Connection>, BackendError>;
}

/// A single open connection.
pub trait Connection {
    fn prepare<'c>(&'c mut self, sql: &str)
    -> Result<Box<dyn PreparedStatement + 'c>, BackendError>;

    /// Row id generated by the most recent successful INSERT.
    fn last_insert_id(&self) -> i64;

    fn begin(&mut self) -> Result<(), BackendError>;

    fn commit(&mut self) -> Result<(), BackendError>;

    fn rollback(&mut self) -> Result<(), BackendError>;

    fn in_transaction(&self) -> bool;
}

/// A prepared statement awaiting values.
pub trait PreparedStatement {
    fn bind(&mut self, placeholder: &Placeholder, value: BoundValue) -> Result<(), BackendError>;

    /// Run the statement. Row-returning statements yield their rows through the cursor.
    fn execute(&mut self) -> Result<Box<dyn Cursor>, BackendError>;
}

/// Forward-only access to the outcome of one execution.
pub trait Cursor {
    fn columns(&self) -> &[String];

    /// Next row, or `None` at the end of the stream.
    fn fetch(&mut self) -> Result<Option<Vec<Value>>, BackendError>;

    /// Rows changed by a data-modifying statement.
    fn affected_rows(&self) -> u64;
}

/// Cursor over rows that are already in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCursor {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    affected_rows: u64,
}

impl MemoryCursor {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows: rows.into(),
            affected_rows: 0,
        }
    }

    /// A cursor with no columns, for statements that only change rows.
    pub fn affected(affected_rows: u64) -> Self {
        Self {
            affected_rows,
            ..Self::default()
        }
    }
}

impl Cursor for MemoryCursor {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn fetch(&mut self) -> Result<Option<Vec<Value>>, BackendError> {
        Ok(self.rows.pop_front())
    }

    fn affected_rows(&self) -> u64 {
        self.affected_rows
    }
}

/// Constructor registered under a driver key.
pub type DriverFactory = fn() -> Box<dyn Driver>;

/// Explicit mapping from driver key to driver factory.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    factories: BTreeMap<String, DriverFactory>,
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("keys", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DriverRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every driver compiled into this build.
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "sqlite")]
        registry.register("sqlite", || Box::new(SqliteDriver));
        registry
    }

    /// Register (or replace) the factory for `key`.
    pub fn register(&mut self, key: impl Into<String>, factory: DriverFactory) -> &mut Self {
        self.factories.insert(key.into(), factory);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiate the driver registered under exactly `key`.
    pub fn create(&self, key: &str) -> DbResult<Box<dyn Driver>> {
        match self.factories.get(key) {
            Some(factory) => Ok(factory()),
            None => Err(DbError::config(format!(
                "unknown driver '{key}' (registered: {})",
                self.keys().collect::<Vec<_>>().join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullDriver;

    impl Driver for NullDriver {
        fn name(&self) -> &'static str {
            "null"
        }

        fn connect(&self, _config: &DatabaseConfig) -> Result<Box<dyn Connection>, BackendError> {
            Err(BackendError::new(-1, "null driver cannot connect"))
        }
    }

    #[test]
    fn registry_lookup_is_exact() {
        let mut registry = DriverRegistry::new();
        registry.register("null", || Box::new(NullDriver));
        assert!(registry.contains("null"));
        assert_eq!(registry.create("null").unwrap().name(), "null");

        let err = registry.create("NULL").err().unwrap();
        assert!(matches!(err, DbError::Config(_)));
        assert!(err.to_string().contains("registered: null"));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn defaults_include_sqlite() {
        let registry = DriverRegistry::with_defaults();
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["sqlite"]);
        assert_eq!(registry.create("sqlite").unwrap().quote_char(), '`');
    }

    #[test]
    fn memory_cursor_drains_in_order() {
        let mut cursor = MemoryCursor::new(
            vec!["a".into()],
            vec![vec![Value::Int(1)], vec![Value::Int(2)]],
        );
        assert_eq!(cursor.columns(), ["a".to_string()]);
        assert_eq!(cursor.fetch().unwrap(), Some(vec![Value::Int(1)]));
        assert_eq!(cursor.fetch().unwrap(), Some(vec![Value::Int(2)]));
        assert_eq!(cursor.fetch().unwrap(), None);
        assert_eq!(MemoryCursor::affected(3).affected_rows(), 3);
    }
}
