//! OPTIMIZE TABLE statement builder.

use super::{Statement, push_tables};
use crate::database::Database;
use crate::error::DbResult;
use crate::part::{Clause, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, TabularResult};
use dbal_check::StatementKind;

const STRUCTURE: &[Clause] = &[Clause::bare("optimize"), Clause::bare("tables")];

/// OPTIMIZE TABLE over one or more tables. MySQL answers with a status row
/// set, so this executes to a [`TabularResult`].
#[derive(Debug, Clone)]
pub struct Optimize<'db> {
    db: &'db Database,
    parts: Parts,
}

impl<'db> Optimize<'db> {
    pub(crate) fn new(db: &'db Database, table: &str) -> Self {
        let mut parts = Parts::new();
        parts.append_sql("optimize", "OPTIMIZE TABLE", SPACE_DELIMITER);
        push_tables(&mut parts, db, "tables", &[table]);
        Self { db, parts }
    }

    pub fn table(mut self, table: &str) -> Self {
        push_tables(&mut self.parts, self.db, "tables", &[table]);
        self
    }
}

impl Statement for Optimize<'_> {
    type Output = TabularResult;

    fn kind(&self) -> StatementKind {
        StatementKind::Optimize
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

    fn results(&self, outcome: Outcome) -> DbResult<TabularResult> {
        Ok(TabularResult::from_outcome(outcome))
    }
}
