//! SQLite driver backed by `rusqlite` (bundled SQLite).

use super::{BackendError, Connection, Cursor, Driver, MemoryCursor, PreparedStatement};
use crate::config::DatabaseConfig;
use crate::value::{BoundValue, Placeholder, Value};
use rusqlite::types::ValueRef;

/// `SQLITE_RANGE`: bind index out of range.
const SQLITE_RANGE: i64 = 25;

fn backend_error(e: rusqlite::Error) -> BackendError {
    let code = match &e {
        rusqlite::Error::SqliteFailure(err, _) => i64::from(err.extended_code),
        _ => -1,
    };
    BackendError::new(code, e.to_string())
}

fn is_pragma_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Driver registered under the `"sqlite"` key.
///
/// `database` is a file path, or `:memory:` (or empty) for an in-memory
/// database. Each `driver_options` entry is applied as `PRAGMA key = value`
/// right after connecting. `host`, `port`, credentials, `charset` and
/// `collation` are not used; SQLite text is always UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn connect(&self, config: &DatabaseConfig) -> Result<Box<dyn Connection>, BackendError> {
        let conn = match config.database.as_str() {
            "" | ":memory:" => rusqlite::Connection::open_in_memory(),
            path => rusqlite::Connection::open(path),
        }
        .map_err(backend_error)?;

        for (key, value) in &config.driver_options {
            if !is_pragma_token(key) || !is_pragma_token(value) {
                return Err(BackendError::new(
                    -1,
                    format!("invalid driver option {key} = {value}"),
                ));
            }
            // Some pragmas (journal_mode) report their new value as a row.
            let mut stmt = conn
                .prepare(&format!("PRAGMA {key} = {value}"))
                .map_err(backend_error)?;
            let mut rows = stmt.raw_query();
            while rows.next().map_err(backend_error)?.is_some() {}
        }

        Ok(Box::new(SqliteConnection { conn }))
    }
}

struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl Connection for SqliteConnection {
    fn prepare<'c>(
        &'c mut self,
        sql: &str,
    ) -> Result<Box<dyn PreparedStatement + 'c>, BackendError> {
        let stmt = self.conn.prepare(sql).map_err(backend_error)?;
        Ok(Box::new(SqliteStatement { stmt }))
    }

    fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    fn begin(&mut self) -> Result<(), BackendError> {
        self.conn.execute_batch("BEGIN").map_err(backend_error)
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        self.conn.execute_batch("COMMIT").map_err(backend_error)
    }

    fn rollback(&mut self) -> Result<(), BackendError> {
        self.conn.execute_batch("ROLLBACK").map_err(backend_error)
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

struct SqliteStatement<'c> {
    stmt: rusqlite::Statement<'c>,
}

impl SqliteStatement<'_> {
    fn index_of(&self, placeholder: &Placeholder) -> Result<usize, BackendError> {
        match placeholder {
            Placeholder::Position(i) => Ok(*i),
            Placeholder::Name(name) => self
                .stmt
                .parameter_index(&format!(":{name}"))
                .map_err(backend_error)?
                .ok_or_else(|| {
                    BackendError::new(SQLITE_RANGE, format!("no parameter named :{name}"))
                }),
        }
    }
}

impl PreparedStatement for SqliteStatement<'_> {
    fn bind(&mut self, placeholder: &Placeholder, value: BoundValue) -> Result<(), BackendError> {
        let index = self.index_of(placeholder)?;
        let bound = match value {
            BoundValue::Null => self.stmt.raw_bind_parameter(index, rusqlite::types::Null),
            BoundValue::Int(n) => self.stmt.raw_bind_parameter(index, n),
            BoundValue::Bool(b) => self.stmt.raw_bind_parameter(index, b),
            BoundValue::Text(s) => self.stmt.raw_bind_parameter(index, s),
            BoundValue::Blob(b) => self.stmt.raw_bind_parameter(index, b),
        };
        bound.map_err(backend_error)
    }

    fn execute(&mut self) -> Result<Box<dyn Cursor>, BackendError> {
        let column_count = self.stmt.column_count();
        if column_count == 0 {
            let affected = self.stmt.raw_execute().map_err(backend_error)?;
            return Ok(Box::new(MemoryCursor::affected(affected as u64)));
        }

        let columns: Vec<String> = self
            .stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        let mut raw = self.stmt.raw_query();
        while let Some(row) = raw.next().map_err(backend_error)? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value = match row.get_ref(i).map_err(backend_error)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(n) => Value::Int(n),
                    ValueRef::Real(f) => Value::Float(f),
                    ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
                    ValueRef::Blob(b) => Value::Blob(b.to_vec()),
                };
                values.push(value);
            }
            rows.push(values);
        }
        Ok(Box::new(MemoryCursor::new(columns, rows)))
    }
}
