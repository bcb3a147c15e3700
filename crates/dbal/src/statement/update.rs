//! UPDATE statement builder.

use super::Statement;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::part::{Clause, Fragment, LIST_DELIMITER, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, SuccessResult};
use crate::value::{Value, ValueList};
use dbal_check::StatementKind;

const STRUCTURE: &[Clause] = &[
    Clause::bare("update"),
    Clause::keyword("set", "SET"),
    Clause::keyword("where", "WHERE"),
];

/// UPDATE statement. Executes to a [`SuccessResult`].
#[derive(Debug, Clone)]
pub struct Update<'db> {
    db: &'db Database,
    parts: Parts,
}

impl_where_methods!(Update);

impl<'db> Update<'db> {
    pub(crate) fn new(db: &'db Database, table: &str) -> Self {
        let mut parts = Parts::new();
        parts.append_sql(
            "update",
            format!("UPDATE {}", db.composer().quote_table(table)),
            SPACE_DELIMITER,
        );
        Self { db, parts }
    }

    /// `column = ?`
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        let sql = format!("{} = ?", self.db.composer().quote_identifier(column));
        self.parts.append_part(
            "set",
            Fragment::with_values(sql, ValueList::positional([value.into()])),
            LIST_DELIMITER,
        );
        self
    }

    /// `column = :column`
    pub fn set_named(mut self, column: &str, value: impl Into<Value>) -> Self {
        let mut values = ValueList::Empty;
        if let Err(e) = values.push_named(column, value.into()) {
            self.parts.record(e);
            return self;
        }
        let sql = format!("{} = :{column}", self.db.composer().quote_identifier(column));
        self.parts
            .append_part("set", Fragment::with_values(sql, values), LIST_DELIMITER);
        self
    }

    /// `column = expression`, with the expression inserted as written
    /// (after `#__` resolution), e.g. `set_raw("hits", "`hits` + 1")`.
    pub fn set_raw(mut self, column: &str, expression: &str) -> Self {
        let composer = self.db.composer();
        let sql = format!(
            "{} = {}",
            composer.quote_identifier(column),
            composer.replace_table_prefix(expression)
        );
        self.parts.append_sql("set", sql, LIST_DELIMITER);
        self
    }
}

impl Statement for Update<'_> {
    type Output = SuccessResult;

    fn kind(&self) -> StatementKind {
        StatementKind::Update
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
        if !parts.contains_part("set") {
            return Err(DbError::structural("UPDATE requires at least one SET assignment"));
        }
        Ok(())
    }

    fn results(&self, outcome: Outcome) -> DbResult<SuccessResult> {
        Ok(SuccessResult::from_outcome(&outcome))
    }
}
