//! The database handle.
//!
//! A [`Database`] owns one lazily opened connection, the identifier composer
//! for its table prefix, the query counter, the query log and the query
//! cache. It is the context object every statement borrows; there is no
//! global state. A handle is meant for one thread of control at a time.

use crate::cache::QueryCache;
use crate::config::DatabaseConfig;
use crate::driver::{Connection, Driver, DriverRegistry};
use crate::error::{DbError, DbResult};
use crate::ident::Composer;
use crate::log::{QueryLog, QueryLogEntry, QueryLogSummary};
use crate::monitor::QueryMonitor;
use crate::row::Row;
use crate::statement::{
    Alter, Create, Delete, Describe, DropTable, Insert, Optimize, Raw, Rename, Select, Set, Show,
    Statement, Truncate, Update,
};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Handle to one database.
///
/// # Example
///
/// ```
/// use dbal::prelude::*;
///
/// let db = Database::new(DatabaseConfig::sqlite_memory().table_prefix("app_"))?;
/// db.create("#__notes")
///     .column("id", "INTEGER PRIMARY KEY")
///     .column("body", "TEXT")
///     .execute()?;
///
/// let inserted = db.insert("#__notes").set("body", "hello").execute()?;
/// assert_eq!(inserted.last_insert_id(), Some(1));
///
/// let mut notes = db.select().from("#__notes")?.execute()?;
/// let row = notes.next()?.expect("one row");
/// assert_eq!(row.get_string("body")?, "hello");
/// assert_eq!(db.query_count(), 3);
/// # Ok::<(), DbError>(())
/// ```
pub struct Database {
    config: DatabaseConfig,
    driver: Box<dyn Driver>,
    composer: Composer,
    pub(crate) connection: RefCell<Option<Box<dyn Connection>>>,
    pub(crate) query_count: Cell<u64>,
    pub(crate) log: RefCell<QueryLog>,
    cache: RefCell<QueryCache<Row>>,
    pub(crate) monitors: Vec<Arc<dyn QueryMonitor>>,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("driver", &self.driver.name())
            .field("connected", &self.is_connected())
            .field("query_count", &self.query_count.get())
            .field("monitors", &self.monitors.len())
            .finish()
    }
}

impl Database {
    /// Create a handle using the built-in drivers. Does not connect.
    pub fn new(config: DatabaseConfig) -> DbResult<Self> {
        Self::with_registry(config, &DriverRegistry::with_defaults())
    }

    /// Create a handle, looking the driver up in `registry`. Does not connect.
    pub fn with_registry(config: DatabaseConfig, registry: &DriverRegistry) -> DbResult<Self> {
        config.validate()?;
        let driver = registry.create(&config.driver_name)?;
        let composer = Composer::new(config.table_prefix.clone(), driver.quote_char());
        Ok(Self {
            config,
            driver,
            composer,
            connection: RefCell::new(None),
            query_count: Cell::new(0),
            log: RefCell::new(QueryLog::new()),
            cache: RefCell::new(QueryCache::new()),
            monitors: Vec::new(),
        })
    }

    /// Attach a monitor notified after every statement that reached the backend.
    pub fn with_monitor(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitors.push(monitor);
        self
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn table_prefix(&self) -> &str {
        self.composer.prefix()
    }

    /// Open the connection if it is not open yet.
    pub fn connect(&self) -> DbResult<()> {
        self.with_connection(|_| Ok(()))
    }

    pub fn is_connected(&self) -> bool {
        self.connection
            .try_borrow()
            .map(|slot| slot.is_some())
            .unwrap_or(true)
    }

    /// Close the connection. The next statement reconnects.
    pub fn disconnect(&self) {
        self.connection.borrow_mut().take();
    }

    /// Run `f` on the open connection, connecting first if needed.
    pub(crate) fn with_connection<R>(
        &self,
        f: impl FnOnce(&mut dyn Connection) -> DbResult<R>,
    ) -> DbResult<R> {
        let mut slot = self.connection.borrow_mut();
        if slot.is_none() {
            let conn = self
                .driver
                .connect(&self.config)
                .map_err(|e| DbError::database(e, None))?;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "dbal.sql",
                driver = self.driver.name(),
                database = %self.config.database,
                "connected"
            );
            *slot = Some(conn);
        }
        let conn = slot
            .as_deref_mut()
            .ok_or_else(|| DbError::config("connection unavailable"))?;
        f(conn)
    }

    /// Row id generated by the most recent INSERT on this handle.
    pub fn last_insert_id(&self) -> Option<i64> {
        let slot = self.connection.try_borrow().ok()?;
        slot.as_ref().map(|conn| conn.last_insert_id())
    }

    // ── Statement factories ──────────────────────────────────────────────

    pub fn select(&self) -> Select<'_> {
        Select::new(self)
    }

    pub fn insert(&self, table: &str) -> Insert<'_> {
        Insert::new(self, table)
    }

    pub fn update(&self, table: &str) -> Update<'_> {
        Update::new(self, table)
    }

    pub fn delete(&self, table: &str) -> Delete<'_> {
        Delete::new(self, table)
    }

    pub fn create(&self, table: &str) -> Create<'_> {
        Create::new(self, table)
    }

    pub fn alter(&self, table: &str) -> Alter<'_> {
        Alter::new(self, table)
    }

    pub fn drop_table(&self, table: &str) -> DropTable<'_> {
        DropTable::new(self, table)
    }

    pub fn show(&self) -> Show<'_> {
        Show::new(self)
    }

    pub fn describe(&self, table: &str) -> Describe<'_> {
        Describe::new(self, table)
    }

    pub fn rename(&self, table: &str) -> Rename<'_> {
        Rename::new(self, table)
    }

    pub fn optimize(&self, table: &str) -> Optimize<'_> {
        Optimize::new(self, table)
    }

    pub fn truncate(&self, table: &str) -> Truncate<'_> {
        Truncate::new(self, table)
    }

    pub fn set(&self) -> Set<'_> {
        Set::new(self)
    }

    /// Trusted SQL, inserted verbatim and checked with the lenient guard only.
    ///
    /// Never pass user input here; use the builders instead.
    pub fn raw(&self, sql: &str) -> Raw<'_> {
        Raw::new(self, sql)
    }

    /// Run a `;`-delimited script, one statement at a time.
    ///
    /// Stops at the first failing statement. Returns the number executed.
    pub fn import(&self, script: &str) -> DbResult<usize> {
        // Resolve `#__` first: the splitter treats `#` as a comment.
        let script = self.composer.replace_table_prefix(script);
        let statements = dbal_check::split_script(&script);
        for sql in &statements {
            self.raw(sql).execute()?;
        }
        Ok(statements.len())
    }

    // ── Query log and statistics ─────────────────────────────────────────

    /// Statements executed successfully on this handle.
    pub fn query_count(&self) -> u64 {
        self.query_count.get()
    }

    /// Logged statements (empty unless query logging is enabled).
    pub fn query_log(&self) -> Vec<QueryLogEntry> {
        self.log.borrow().entries().to_vec()
    }

    /// Logged statements slower than [`SLOW_QUERY_THRESHOLD`](crate::SLOW_QUERY_THRESHOLD).
    pub fn slow_queries(&self) -> Vec<QueryLogEntry> {
        self.log.borrow().slow_queries()
    }

    /// Sum of logged statement durations.
    pub fn total_query_time(&self) -> Duration {
        self.log.borrow().total_time()
    }

    pub fn query_log_summary(&self) -> QueryLogSummary {
        self.log.borrow().summary()
    }

    /// Remove and return the logged entries.
    pub fn take_query_log(&self) -> Vec<QueryLogEntry> {
        self.log.borrow_mut().drain()
    }

    // ── Query cache ──────────────────────────────────────────────────────

    pub fn query_caching_enabled(&self) -> bool {
        self.config.query_caching_enabled
    }

    /// Access the query cache directly (append, inspect, evict).
    pub fn with_query_cache<R>(&self, f: impl FnOnce(&mut QueryCache<Row>) -> R) -> R {
        f(&mut self.cache.borrow_mut())
    }

    /// Column header and rows cached under `key`.
    ///
    /// Entries appended by hand without a header take it from their first row.
    pub(crate) fn cached_result(&self, key: &str) -> Option<(Vec<String>, Vec<Row>)> {
        let cache = self.cache.borrow();
        let rows = cache.get(key)?.to_vec();
        let columns = match cache.columns(key) {
            Some(columns) => columns.to_vec(),
            None => rows
                .first()
                .map(|row| row.columns().to_vec())
                .unwrap_or_default(),
        };
        Some((columns, rows))
    }

    pub(crate) fn store_cached_result(&self, key: &str, columns: Vec<String>, rows: Vec<Row>) {
        let mut cache = self.cache.borrow_mut();
        cache.remove(key);
        cache.set_columns(key, columns);
        cache.append_all(key, rows);
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        let log = self.log.get_mut();
        if log.is_empty() {
            return;
        }
        #[cfg(feature = "tracing")]
        {
            let summary = log.summary();
            tracing::debug!(
                target: "dbal.sql",
                queries = summary.query_count,
                total_ms = summary.total_time.as_secs_f64() * 1000.0,
                slow = summary.slow_count,
                "query log flushed"
            );
            for entry in log.slow_queries() {
                tracing::debug!(
                    target: "dbal.sql",
                    duration_ms = entry.duration.as_secs_f64() * 1000.0,
                    hash = %entry.hash,
                    sql = %entry.formatted_sql,
                    "slow query"
                );
            }
        }
        log.drain();
    }
}
