//! Connection and behavior settings for a [`Database`](crate::Database) handle.

use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Configuration record consumed by [`Database::new`](crate::Database::new).
///
/// Every field has a default, so a partial TOML table deserializes:
///
/// ```
/// use dbal::DatabaseConfig;
///
/// let config: DatabaseConfig = toml::from_str(r#"
///     driver_name = "sqlite"
///     database = ":memory:"
///     table_prefix = "cms_"
///     query_logging_enabled = true
/// "#).unwrap();
/// assert_eq!(config.table_prefix, "cms_");
/// assert_eq!(config.port, 3306);
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Database name, or a file path / `:memory:` for file-based drivers.
    pub database: String,
    /// Key looked up in the [`DriverRegistry`](crate::driver::DriverRegistry).
    pub driver_name: String,
    /// Connection character set. Read by server drivers; SQLite ignores it.
    pub charset: String,
    /// Connection collation. Read by server drivers; SQLite ignores it.
    pub collation: String,
    /// Replaces the `#__` marker in table names.
    pub table_prefix: String,
    pub query_caching_enabled: bool,
    pub query_logging_enabled: bool,
    /// Driver-specific options (PRAGMAs for SQLite).
    pub driver_options: BTreeMap<String, String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: String::new(),
            password: String::new(),
            database: ":memory:".to_string(),
            driver_name: "sqlite".to_string(),
            charset: "utf8mb4".to_string(),
            collation: "utf8mb4_unicode_ci".to_string(),
            table_prefix: String::new(),
            query_caching_enabled: false,
            query_logging_enabled: false,
            driver_options: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("database", &self.database)
            .field("driver_name", &self.driver_name)
            .field("charset", &self.charset)
            .field("collation", &self.collation)
            .field("table_prefix", &self.table_prefix)
            .field("query_caching_enabled", &self.query_caching_enabled)
            .field("query_logging_enabled", &self.query_logging_enabled)
            .field("driver_options", &self.driver_options)
            .finish()
    }
}

impl DatabaseConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory SQLite database.
    pub fn sqlite_memory() -> Self {
        Self::default()
    }

    /// SQLite database stored at `path`.
    pub fn sqlite_file(path: impl Into<String>) -> Self {
        Self::default().database(path)
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn driver(mut self, driver_name: impl Into<String>) -> Self {
        self.driver_name = driver_name.into();
        self
    }

    /// Set the connection character set and collation (server drivers only).
    pub fn charset(mut self, charset: impl Into<String>, collation: impl Into<String>) -> Self {
        self.charset = charset.into();
        self.collation = collation.into();
        self
    }

    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Enable the per-handle query cache.
    pub fn enable_query_cache(mut self) -> Self {
        self.query_caching_enabled = true;
        self
    }

    /// Enable the per-handle query log.
    pub fn enable_query_log(mut self) -> Self {
        self.query_logging_enabled = true;
        self
    }

    pub fn driver_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.driver_options.insert(key.into(), value.into());
        self
    }

    /// Check the record before a handle is built from it.
    pub fn validate(&self) -> DbResult<()> {
        if self.driver_name.trim().is_empty() {
            return Err(DbError::config("driver_name must not be empty"));
        }
        if !self
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(DbError::config(format!(
                "table_prefix '{}' may only contain [A-Za-z0-9_]",
                self.table_prefix
            )));
        }
        Ok(())
    }
}
