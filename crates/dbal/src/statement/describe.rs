//! DESCRIBE statement builder.

use super::Statement;
use crate::database::Database;
use crate::error::DbResult;
use crate::part::{Clause, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, TabularResult};
use dbal_check::StatementKind;

const STRUCTURE: &[Clause] = &[Clause::bare("describe"), Clause::bare("column")];

/// DESCRIBE table [column].
#[derive(Debug, Clone)]
pub struct Describe<'db> {
    db: &'db Database,
    parts: Parts,
}

impl<'db> Describe<'db> {
    pub(crate) fn new(db: &'db Database, table: &str) -> Self {
        let mut parts = Parts::new();
        parts.append_sql(
            "describe",
            format!("DESCRIBE {}", db.composer().quote_table(table)),
            SPACE_DELIMITER,
        );
        Self { db, parts }
    }

    /// Describe a single column; replaces an earlier choice.
    pub fn column(mut self, name: &str) -> Self {
        self.parts.remove_part("column");
        let quoted = self.db.composer().quote_identifier(name);
        self.parts.append_sql("column", quoted, SPACE_DELIMITER);
        self
    }
}

impl Statement for Describe<'_> {
    type Output = TabularResult;

    fn kind(&self) -> StatementKind {
        StatementKind::Describe
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
