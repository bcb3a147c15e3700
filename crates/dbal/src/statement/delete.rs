//! DELETE statement builder.

use super::Statement;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::part::{Clause, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, SuccessResult};
use dbal_check::StatementKind;

const STRUCTURE: &[Clause] = &[Clause::bare("delete"), Clause::keyword("where", "WHERE")];

/// DELETE statement. Without a WHERE clause it refuses to build unless
/// [`all`](Delete::all) was called.
#[derive(Debug, Clone)]
pub struct Delete<'db> {
    db: &'db Database,
    parts: Parts,
    all_rows: bool,
}

impl_where_methods!(Delete);

impl<'db> Delete<'db> {
    pub(crate) fn new(db: &'db Database, table: &str) -> Self {
        let mut parts = Parts::new();
        parts.append_sql(
            "delete",
            format!("DELETE FROM {}", db.composer().quote_table(table)),
            SPACE_DELIMITER,
        );
        Self {
            db,
            parts,
            all_rows: false,
        }
    }

    /// Allow deleting every row of the table.
    pub fn all(mut self) -> Self {
        self.all_rows = true;
        self
    }
}

impl Statement for Delete<'_> {
    type Output = SuccessResult;

    fn kind(&self) -> StatementKind {
        StatementKind::Delete
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
        if !self.all_rows && !parts.contains_part("where") {
            return Err(DbError::structural(
                "DELETE without WHERE; call all() to delete every row",
            ));
        }
        Ok(())
    }

    fn results(&self, outcome: Outcome) -> DbResult<SuccessResult> {
        Ok(SuccessResult::from_outcome(&outcome))
    }
}
