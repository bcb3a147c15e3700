//! Verbatim SQL, the one unsafe statement.
//!
//! Text is inserted as written (after `#__` resolution) and checked with the
//! lenient guard only. Produced by [`Database::import`] and [`Database::raw`];
//! never reachable from the builders.

use super::{Safety, Statement};
use crate::database::Database;
use crate::error::DbResult;
use crate::part::{Clause, Fragment, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, SuccessResult, TabularResult};
use crate::value::{Value, ValueList};
use dbal_check::{StatementKind, detect_statement_kind};

const STRUCTURE: &[Clause] = &[Clause::bare("sql")];

/// Result of a [`Raw`] statement: rows if the backend produced a row set.
#[derive(Debug)]
pub enum ExecResult {
    Success(SuccessResult),
    Tabular(TabularResult),
}

impl ExecResult {
    pub fn is_tabular(&self) -> bool {
        matches!(self, ExecResult::Tabular(_))
    }

    pub fn into_tabular(self) -> Option<TabularResult> {
        match self {
            ExecResult::Tabular(t) => Some(t),
            ExecResult::Success(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Raw<'db> {
    db: &'db Database,
    parts: Parts,
    kind: StatementKind,
    sql: String,
    values: ValueList,
}

impl<'db> Raw<'db> {
    pub(crate) fn new(db: &'db Database, sql: &str) -> Self {
        let sql = db.composer().replace_table_prefix(sql.trim());
        Self {
            db,
            parts: Parts::new(),
            kind: detect_statement_kind(&sql),
            sql,
            values: ValueList::Empty,
        }
    }

    /// Bind the next positional `?`.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        if let Err(e) = self.values.push_positional(value.into()) {
            self.parts.record(e);
        }
        self
    }

    /// Bind a `:name` placeholder.
    pub fn bind_named(mut self, name: &str, value: impl Into<Value>) -> Self {
        if let Err(e) = self.values.push_named(name, value.into()) {
            self.parts.record(e);
        }
        self
    }
}

impl Statement for Raw<'_> {
    type Output = ExecResult;

    fn kind(&self) -> StatementKind {
        self.kind
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

    fn safety(&self) -> Safety {
        Safety::Unsafe
    }

    fn finalize(&self, parts: &mut Parts) -> DbResult<()> {
        parts.append_part(
            "sql",
            Fragment::with_values(self.sql.clone(), self.values.clone()),
            SPACE_DELIMITER,
        );
        Ok(())
    }

    fn results(&self, outcome: Outcome) -> DbResult<ExecResult> {
        if outcome.cursor.columns().is_empty() {
            let mut result = SuccessResult::from_outcome(&outcome);
            if self.kind == StatementKind::Insert {
                result = result.with_insert_id(outcome.last_insert_id);
            }
            Ok(ExecResult::Success(result))
        } else {
            Ok(ExecResult::Tabular(TabularResult::from_outcome(outcome)))
        }
    }
}
