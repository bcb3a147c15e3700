//! ALTER TABLE statement builder.

use super::Statement;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::part::{Clause, LIST_DELIMITER, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, SuccessResult};
use dbal_check::StatementKind;

const STRUCTURE: &[Clause] = &[Clause::bare("alter"), Clause::bare("changes")];

/// ALTER TABLE statement with one or more comma-separated changes.
#[derive(Debug, Clone)]
pub struct Alter<'db> {
    db: &'db Database,
    parts: Parts,
}

impl<'db> Alter<'db> {
    pub(crate) fn new(db: &'db Database, table: &str) -> Self {
        let mut parts = Parts::new();
        parts.append_sql(
            "alter",
            format!("ALTER TABLE {}", db.composer().quote_table(table)),
            SPACE_DELIMITER,
        );
        Self { db, parts }
    }

    fn change(mut self, sql: String) -> Self {
        self.parts.append_sql("changes", sql, LIST_DELIMITER);
        self
    }

    pub fn add_column(self, name: &str, definition: &str) -> Self {
        let sql = format!(
            "ADD COLUMN {} {}",
            self.db.composer().quote_identifier(name),
            definition.trim()
        );
        self.change(sql)
    }

    pub fn drop_column(self, name: &str) -> Self {
        let sql = format!("DROP COLUMN {}", self.db.composer().quote_identifier(name));
        self.change(sql)
    }

    pub fn rename_column(self, from: &str, to: &str) -> Self {
        let composer = self.db.composer();
        let sql = format!(
            "RENAME COLUMN {} TO {}",
            composer.quote_identifier(from),
            composer.quote_identifier(to)
        );
        self.change(sql)
    }

    pub fn rename_to(self, table: &str) -> Self {
        let sql = format!("RENAME TO {}", self.db.composer().quote_table(table));
        self.change(sql)
    }
}

impl Statement for Alter<'_> {
    type Output = SuccessResult;

    fn kind(&self) -> StatementKind {
        StatementKind::Alter
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
        if !parts.contains_part("changes") {
            return Err(DbError::structural("ALTER TABLE requires at least one change"));
        }
        Ok(())
    }

    fn results(&self, outcome: Outcome) -> DbResult<SuccessResult> {
        Ok(SuccessResult::from_outcome(&outcome))
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn changes_are_comma_joined() {
        let db = Database::new(DatabaseConfig::sqlite_memory().table_prefix("x_")).unwrap();
        let sql = db
            .alter("#__users")
            .add_column("email", "TEXT")
            .drop_column("legacy")
            .rename_column("nick", "handle")
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "ALTER TABLE `x_users` ADD COLUMN `email` TEXT, DROP COLUMN `legacy`, \
             RENAME COLUMN `nick` TO `handle`"
        );
        assert_eq!(
            db.alter("#__a").rename_to("#__b").to_sql().unwrap(),
            "ALTER TABLE `x_a` RENAME TO `x_b`"
        );
    }

    #[test]
    fn alter_without_changes_fails() {
        let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
        assert!(db.alter("t").build().unwrap_err().is_structural());
    }
}
