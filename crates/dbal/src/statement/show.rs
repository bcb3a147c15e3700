//! SHOW statement builder (MySQL family).

use super::Statement;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::part::{Clause, Fragment, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, TabularResult};
use crate::value::{Value, ValueList};
use dbal_check::StatementKind;

const STRUCTURE: &[Clause] = &[
    Clause::bare("show"),
    Clause::bare("what"),
    Clause::keyword("from", "FROM"),
    Clause::keyword("like", "LIKE"),
];

/// SHOW statement. `from` and `like` may each be set once.
#[derive(Debug, Clone)]
pub struct Show<'db> {
    db: &'db Database,
    parts: Parts,
    full: bool,
}

impl<'db> Show<'db> {
    pub(crate) fn new(db: &'db Database) -> Self {
        Self {
            db,
            parts: Parts::new(),
            full: false,
        }
    }

    fn what(mut self, sql: String) -> Self {
        self.parts.remove_part("what");
        self.parts.append_sql("what", sql, SPACE_DELIMITER);
        self
    }

    /// `SHOW TABLES`
    pub fn tables(self) -> Self {
        self.what("TABLES".to_string())
    }

    /// `SHOW COLUMNS FROM table`
    pub fn columns(self, table: &str) -> Self {
        let sql = format!("COLUMNS FROM {}", self.db.composer().quote_table(table));
        self.what(sql)
    }

    /// `SHOW CREATE TABLE table`
    pub fn create_table(self, table: &str) -> Self {
        let sql = format!("CREATE TABLE {}", self.db.composer().quote_table(table));
        self.what(sql)
    }

    /// `SHOW FULL ...`
    pub fn full(mut self) -> Self {
        self.full = true;
        self
    }

    /// Restrict to one database/schema. Exactly once.
    pub fn from(mut self, database: &str) -> DbResult<Self> {
        if self.parts.contains_part("from") {
            return Err(DbError::structural("FROM may only be set once"));
        }
        let sql = self.db.composer().quote_identifier(database);
        self.parts.append_sql("from", sql, SPACE_DELIMITER);
        Ok(self)
    }

    /// Filter names with a bound LIKE pattern. Exactly once.
    pub fn like(mut self, pattern: impl Into<Value>) -> DbResult<Self> {
        if self.parts.contains_part("like") {
            return Err(DbError::structural("LIKE may only be set once"));
        }
        self.parts.append_part(
            "like",
            Fragment::with_values("?", ValueList::positional([pattern.into()])),
            SPACE_DELIMITER,
        );
        Ok(self)
    }
}

impl Statement for Show<'_> {
    type Output = TabularResult;

    fn kind(&self) -> StatementKind {
        StatementKind::Show
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
        if !parts.contains_part("what") {
            return Err(DbError::structural(
                "SHOW requires tables(), columns() or create_table()",
            ));
        }
        parts.append_sql("show", if self.full { "SHOW FULL" } else { "SHOW" }, SPACE_DELIMITER);
        Ok(())
    }

    fn results(&self, outcome: Outcome) -> DbResult<TabularResult> {
        Ok(TabularResult::from_outcome(outcome))
    }
}
