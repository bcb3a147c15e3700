//! DROP TABLE statement builder.

use super::{Statement, push_tables};
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::part::{Clause, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, SuccessResult};
use dbal_check::StatementKind;

const STRUCTURE: &[Clause] = &[Clause::bare("drop"), Clause::bare("tables")];

/// DROP TABLE statement over one or more tables.
#[derive(Debug, Clone)]
pub struct DropTable<'db> {
    db: &'db Database,
    parts: Parts,
    if_exists: bool,
}

impl<'db> DropTable<'db> {
    pub(crate) fn new(db: &'db Database, table: &str) -> Self {
        let mut parts = Parts::new();
        push_tables(&mut parts, db, "tables", &[table]);
        Self {
            db,
            parts,
            if_exists: false,
        }
    }

    /// Drop another table in the same statement.
    pub fn table(mut self, table: &str) -> Self {
        push_tables(&mut self.parts, self.db, "tables", &[table]);
        self
    }

    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }
}

impl Statement for DropTable<'_> {
    type Output = SuccessResult;

    fn kind(&self) -> StatementKind {
        StatementKind::Drop
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
        if !parts.contains_part("tables") {
            return Err(DbError::structural("DROP TABLE requires a table"));
        }
        let head = if self.if_exists {
            "DROP TABLE IF EXISTS"
        } else {
            "DROP TABLE"
        };
        parts.append_sql("drop", head, SPACE_DELIMITER);
        Ok(())
    }

    fn results(&self, outcome: Outcome) -> DbResult<SuccessResult> {
        Ok(SuccessResult::from_outcome(&outcome))
    }
}
