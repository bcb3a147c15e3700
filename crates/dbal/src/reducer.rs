//! Extraction helpers over a materialized row set.
//!
//! # Example
//! ```
//! use dbal::{Database, DatabaseConfig};
//!
//! let db = Database::new(DatabaseConfig::sqlite_memory())?;
//! db.import("CREATE TABLE flags (name TEXT, value TEXT);
//!            INSERT INTO flags VALUES ('beta', 'yes'), ('legacy', '0');")?;
//!
//! let flags = db.select().columns(&["value"]).from("flags")?.execute()?.reducer()?;
//! assert_eq!(flags.first_bool(), Some(true));
//! # Ok::<(), dbal::DbError>(())
//! ```

use crate::error::{DbError, DbResult};
use crate::row::Row;
use crate::value::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Typed single-value, column and grouping extraction over fetched rows.
#[derive(Debug, Clone, Default)]
pub struct Reducer {
    columns: Arc<[String]>,
    rows: Vec<Row>,
}

impl Reducer {
    pub fn new(columns: Arc<[String]>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> DbResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DbError::decode(name, "no such column"))
    }

    /// Every value of one column, in row order.
    pub fn column(&self, name: &str) -> DbResult<Vec<Value>> {
        let index = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get_index(index).cloned().unwrap_or_default())
            .collect())
    }

    /// First column of the first row.
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.get_index(0))
    }

    pub fn first_string(&self) -> Option<String> {
        self.first_value().map(Value::to_text)
    }

    pub fn first_int(&self) -> DbResult<Option<i64>> {
        self.first_typed("an integer", Value::to_int)
    }

    pub fn first_float(&self) -> DbResult<Option<f64>> {
        self.first_typed("a float", Value::to_float)
    }

    /// Boolean view of the first value: `true`, `"true"`/`"yes"` and non-zero
    /// numbers are true.
    pub fn first_bool(&self) -> Option<bool> {
        self.first_value().map(Value::to_bool)
    }

    fn first_typed<T>(&self, what: &str, f: fn(&Value) -> Option<T>) -> DbResult<Option<T>> {
        let Some(value) = self.first_value() else {
            return Ok(None);
        };
        match f(value) {
            Some(v) => Ok(Some(v)),
            None => Err(DbError::decode(
                self.columns.first().map(String::as_str).unwrap_or_default(),
                format!("cannot read {value} as {what}"),
            )),
        }
    }

    /// Index rows by a unique column. A later duplicate key replaces the earlier row.
    pub fn index_by(&self, column: &str) -> DbResult<BTreeMap<String, Row>> {
        let index = self.column_index(column)?;
        Ok(self
            .rows
            .iter()
            .map(|row| (key_at(row, index), row.clone()))
            .collect())
    }

    /// Group rows by a non-unique column, keeping row order within each group.
    pub fn group_by(&self, column: &str) -> DbResult<BTreeMap<String, Vec<Row>>> {
        let index = self.column_index(column)?;
        let mut groups: BTreeMap<String, Vec<Row>> = BTreeMap::new();
        for row in &self.rows {
            groups.entry(key_at(row, index)).or_default().push(row.clone());
        }
        Ok(groups)
    }
}

fn key_at(row: &Row, index: usize) -> String {
    row.get_index(index).map(Value::key_string).unwrap_or_default()
}

impl IntoIterator for Reducer {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reducer(rows: Vec<Vec<Value>>) -> Reducer {
        let columns: Arc<[String]> = Arc::from(vec!["k".to_string(), "v".to_string()]);
        let rows = rows
            .into_iter()
            .map(|values| Row::new(Arc::clone(&columns), values))
            .collect();
        Reducer::new(columns, rows)
    }

    #[test]
    fn boolean_coercion_of_first_value() {
        let cases = [
            (Value::from("yes"), true),
            (Value::from("1"), true),
            (Value::from("0"), false),
            (Value::Bool(true), true),
        ];
        for (value, expected) in cases {
            let r = reducer(vec![vec![value.clone(), Value::Null]]);
            assert_eq!(r.first_bool(), Some(expected), "value: {value}");
        }
        assert_eq!(reducer(vec![]).first_bool(), None);
    }

    #[test]
    fn typed_first_values() {
        let r = reducer(vec![vec![Value::from("12"), Value::Null]]);
        assert_eq!(r.first_int().unwrap(), Some(12));
        assert_eq!(r.first_float().unwrap(), Some(12.0));
        assert_eq!(r.first_string(), Some("12".to_string()));

        let r = reducer(vec![vec![Value::from("abc"), Value::Null]]);
        assert!(matches!(r.first_int(), Err(DbError::Decode { .. })));
        assert_eq!(reducer(vec![]).first_int().unwrap(), None);
    }

    #[test]
    fn column_index_and_group() {
        let r = reducer(vec![
            vec![Value::from("a"), Value::Int(1)],
            vec![Value::from("b"), Value::Int(2)],
            vec![Value::from("a"), Value::Int(3)],
        ]);
        assert_eq!(
            r.column("v").unwrap(),
            vec![Value::Int(1), Value::Int(2), Value::Int(3)]
        );
        assert!(r.column("missing").is_err());

        let indexed = r.index_by("k").unwrap();
        assert_eq!(indexed.len(), 2);
        assert_eq!(indexed["a"].get("v"), Some(&Value::Int(3)));

        let grouped = r.group_by("k").unwrap();
        assert_eq!(grouped["a"].len(), 2);
        assert_eq!(grouped["a"][0].get("v"), Some(&Value::Int(1)));
        assert_eq!(grouped["b"].len(), 1);
    }
}
