//! TRUNCATE TABLE statement builder.

use super::Statement;
use crate::database::Database;
use crate::error::DbResult;
use crate::part::{Clause, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, SuccessResult};
use dbal_check::StatementKind;

const STRUCTURE: &[Clause] = &[Clause::bare("truncate")];

#[derive(Debug, Clone)]
pub struct Truncate<'db> {
    db: &'db Database,
    parts: Parts,
}

impl<'db> Truncate<'db> {
    pub(crate) fn new(db: &'db Database, table: &str) -> Self {
        let mut parts = Parts::new();
        parts.append_sql(
            "truncate",
            format!("TRUNCATE TABLE {}", db.composer().quote_table(table)),
            SPACE_DELIMITER,
        );
        Self { db, parts }
    }
}

impl Statement for Truncate<'_> {
    type Output = SuccessResult;

    fn kind(&self) -> StatementKind {
        StatementKind::Truncate
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

    fn results(&self, outcome: Outcome) -> DbResult<SuccessResult> {
        Ok(SuccessResult::from_outcome(&outcome))
    }
}
