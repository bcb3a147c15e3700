//! INSERT statement builder.

use super::Statement;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::part::{Clause, Fragment, LIST_DELIMITER, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, SuccessResult};
use crate::value::{Value, ValueList};
use dbal_check::StatementKind;

const STRUCTURE: &[Clause] = &[
    Clause::bare("insert"),
    Clause::wrapped("columns", None),
    Clause::wrapped("values", Some("VALUES")),
    Clause::keyword("on duplicate key update", "ON DUPLICATE KEY UPDATE"),
];

/// INSERT statement. Executes to a [`SuccessResult`] carrying the new row id.
#[derive(Debug, Clone)]
pub struct Insert<'db> {
    db: &'db Database,
    parts: Parts,
}

impl<'db> Insert<'db> {
    pub(crate) fn new(db: &'db Database, table: &str) -> Self {
        let mut parts = Parts::new();
        parts.append_sql(
            "insert",
            format!("INSERT INTO {}", db.composer().quote_table(table)),
            SPACE_DELIMITER,
        );
        Self { db, parts }
    }

    /// Set one column to a positionally bound value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        let quoted = self.db.composer().quote_identifier(column);
        self.parts.append_sql("columns", quoted, LIST_DELIMITER);
        self.parts.append_part(
            "values",
            Fragment::with_values("?", ValueList::positional([value.into()])),
            LIST_DELIMITER,
        );
        self
    }

    /// Set several columns at once.
    pub fn set_all<C, V>(self, pairs: impl IntoIterator<Item = (C, V)>) -> Self
    where
        C: AsRef<str>,
        V: Into<Value>,
    {
        pairs
            .into_iter()
            .fold(self, |insert, (column, value)| insert.set(column.as_ref(), value))
    }

    /// Set one column to a value bound by name (`:column`).
    ///
    /// Cannot be combined with [`set`](Self::set) on the same statement.
    pub fn set_named(mut self, column: &str, value: impl Into<Value>) -> Self {
        let mut values = ValueList::Empty;
        if let Err(e) = values.push_named(column, value.into()) {
            self.parts.record(e);
            return self;
        }
        let quoted = self.db.composer().quote_identifier(column);
        self.parts.append_sql("columns", quoted, LIST_DELIMITER);
        self.parts
            .append_part("values", Fragment::with_values(format!(":{column}"), values), LIST_DELIMITER);
        self
    }

    /// On a unique-key conflict, set `column` to `value` instead.
    pub fn on_duplicate_key_update(mut self, column: &str, value: impl Into<Value>) -> Self {
        let sql = format!("{} = ?", self.db.composer().quote_identifier(column));
        self.parts.append_part(
            "on duplicate key update",
            Fragment::with_values(sql, ValueList::positional([value.into()])),
            LIST_DELIMITER,
        );
        self
    }
}

impl Statement for Insert<'_> {
    type Output = SuccessResult;

    fn kind(&self) -> StatementKind {
        StatementKind::Insert
    }

    fn structure(&self) -> &'static [Clause] {
        STRUCTURE
    }

    fn parts(&self) -> &Parts {
        &self.parts
    }

    fn database(&self) -> &Database {
        self.db
    }

    fn finalize(&self, parts: &mut Parts) -> DbResult<()> {
        if !parts.contains_part("columns") {
            return Err(DbError::structural("INSERT requires at least one column"));
        }
        Ok(())
    }

    fn results(&self, outcome: Outcome) -> DbResult<SuccessResult> {
        Ok(SuccessResult::from_outcome(&outcome).with_insert_id(outcome.last_insert_id))
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn positional_insert() {
        let db = Database::new(DatabaseConfig::sqlite_memory().table_prefix("p_")).unwrap();
        let built = db
            .insert("#__users")
            .set("name", "alice")
            .set("age", 30)
            .on_duplicate_key_update("age", 31)
            .build()
            .unwrap();
        assert_eq!(
            built.sql,
            "INSERT INTO `p_users` (`name`, `age`) VALUES (?, ?) ON DUPLICATE KEY UPDATE `age` = ?"
        );
        assert_eq!(
            built.values.values(),
            vec![Value::from("alice"), Value::Int(30), Value::Int(31)]
        );
    }

    #[test]
    fn named_insert() {
        let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
        let sql = db
            .insert("t")
            .set_named("a", 1)
            .set_named("b", 2)
            .to_sql()
            .unwrap();
        assert_eq!(sql, "INSERT INTO `t` (`a`, `b`) VALUES (:a, :b)");
    }

    #[test]
    fn mixing_bind_modes_fails() {
        let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
        let err = db.insert("t").set("a", 1).set_named("b", 2).build().unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn insert_without_columns_fails() {
        let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
        assert!(db.insert("t").build().unwrap_err().is_structural());
    }
}
