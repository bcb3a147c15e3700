//! # dbal
//!
//! A synchronous SQL statement builder and execution layer.
//!
//! ## Features
//!
//! - **Fluent builders** for SELECT, INSERT, UPDATE, DELETE, CREATE, ALTER, DROP, SHOW,
//!   DESCRIBE, RENAME, OPTIMIZE, TRUNCATE and SET
//! - **Table prefixes**: `#__users` resolves to the handle's configured prefix
//! - **Bound values only**: positional `?` or named `:name`, never mixed in one statement
//! - **Validation guard**: every statement is checked for injection patterns before execution
//! - **Cursor results** with monotonic consumption, plus a reducer for typed extraction
//! - **Transactions** around a callback, rolled back on error
//! - **Query log and monitors**: counts, durations, slow statements (> 0.0999 s)
//! - **Query cache** keyed by caller-chosen strings
//!
//! ## Example
//!
//! ```
//! use dbal::prelude::*;
//!
//! let db = Database::new(DatabaseConfig::sqlite_memory().table_prefix("cms_"))?;
//! db.import(
//!     "CREATE TABLE cms_users (id INTEGER PRIMARY KEY, name TEXT, active INTEGER);
//!      INSERT INTO cms_users (name, active) VALUES ('ada', 1), ('bob', 0), ('cy', 1);",
//! )?;
//!
//! let names = db
//!     .select()
//!     .columns(&["name"])
//!     .from("#__users")?
//!     .where_eq("active", true)
//!     .order_by("name", Order::Asc)
//!     .execute()?
//!     .reducer()?
//!     .column("name")?;
//! assert_eq!(names, vec![Value::from("ada"), Value::from("cy")]);
//! # Ok::<(), DbError>(())
//! ```

pub mod cache;
pub mod config;
pub mod database;
pub mod driver;
pub mod error;
mod execute;
pub mod ident;
pub mod log;
pub mod monitor;
pub mod part;
pub mod prelude;
pub mod reducer;
pub mod result;
pub mod row;
pub mod statement;
pub mod transaction;
pub mod value;

pub use cache::QueryCache;
pub use config::DatabaseConfig;
pub use database::Database;
pub use error::{CursorError, DbError, DbResult};
pub use ident::{Composer, TABLE_PREFIX_MARKER};
pub use log::{QueryLog, QueryLogEntry, QueryLogSummary, SLOW_QUERY_THRESHOLD};
pub use monitor::{QueryContext, QueryMonitor, QueryResult, QueryStats, StatsMonitor};
pub use reducer::Reducer;
pub use result::{FetchOrientation, SuccessResult, TabularResult};
pub use row::Row;
pub use statement::{
    Alter, BuiltStatement, Condition, Create, Delete, Describe, DropTable, ExecResult, Insert,
    Optimize, Order, Raw, Rename, Safety, Select, Set, Show, Statement, Truncate, Update,
};
pub use transaction::TransactionResult;
pub use value::{BindMode, Placeholder, Value, ValueList};

pub use dbal_check::{RejectReason, Rejection, StatementKind, Strictness};
