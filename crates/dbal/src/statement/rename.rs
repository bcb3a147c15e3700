//! RENAME TABLE statement builder.

use super::Statement;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::part::{Clause, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, SuccessResult};
use dbal_check::StatementKind;

const STRUCTURE: &[Clause] = &[Clause::bare("rename"), Clause::keyword("to", "TO")];

/// RENAME TABLE from TO to.
#[derive(Debug, Clone)]
pub struct Rename<'db> {
    db: &'db Database,
    parts: Parts,
}

impl<'db> Rename<'db> {
    pub(crate) fn new(db: &'db Database, table: &str) -> Self {
        let mut parts = Parts::new();
        parts.append_sql(
            "rename",
            format!("RENAME TABLE {}", db.composer().quote_table(table)),
            SPACE_DELIMITER,
        );
        Self { db, parts }
    }

    /// Target name. Exactly once.
    pub fn to(mut self, table: &str) -> DbResult<Self> {
        if self.parts.contains_part("to") {
            return Err(DbError::structural("TO may only be set once"));
        }
        let quoted = self.db.composer().quote_table(table);
        self.parts.append_sql("to", quoted, SPACE_DELIMITER);
        Ok(self)
    }
}

impl Statement for Rename<'_> {
    type Output = SuccessResult;

    fn kind(&self) -> StatementKind {
        StatementKind::Rename
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
        if !parts.contains_part("to") {
            return Err(DbError::structural("RENAME TABLE requires a target name"));
        }
        Ok(())
    }

    fn results(&self, outcome: Outcome) -> DbResult<SuccessResult> {
        Ok(SuccessResult::from_outcome(&outcome))
    }
}
