//! CREATE TABLE statement builder.

use super::Statement;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::part::{Clause, LIST_DELIMITER, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, SuccessResult};
use dbal_check::StatementKind;

const STRUCTURE: &[Clause] = &[
    Clause::bare("create"),
    Clause::wrapped("definitions", None),
    Clause::bare("options"),
];

/// CREATE TABLE statement.
///
/// Column definitions are written by the caller (`"INTEGER NOT NULL"`); only
/// names are quoted. Definitions still pass the strict guard, so string
/// literal defaults are refused.
#[derive(Debug, Clone)]
pub struct Create<'db> {
    db: &'db Database,
    parts: Parts,
    table: String,
    temporary: bool,
    if_not_exists: bool,
}

impl<'db> Create<'db> {
    pub(crate) fn new(db: &'db Database, table: &str) -> Self {
        Self {
            db,
            parts: Parts::new(),
            table: db.composer().quote_table(table),
            temporary: false,
            if_not_exists: false,
        }
    }

    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Add a column: `` `name` definition ``.
    pub fn column(mut self, name: &str, definition: &str) -> Self {
        let sql = format!("{} {}", self.db.composer().quote_identifier(name), definition.trim());
        self.parts.append_sql("definitions", sql, LIST_DELIMITER);
        self
    }

    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        let sql = format!("PRIMARY KEY ({})", self.db.composer().quote_list(columns));
        self.parts.append_sql("definitions", sql, LIST_DELIMITER);
        self
    }

    pub fn unique(mut self, columns: &[&str]) -> Self {
        let sql = format!("UNIQUE ({})", self.db.composer().quote_list(columns));
        self.parts.append_sql("definitions", sql, LIST_DELIMITER);
        self
    }

    /// Append a table option after the definitions (`ENGINE=InnoDB`, `WITHOUT ROWID`).
    pub fn option(mut self, option: &str) -> Self {
        self.parts.append_sql("options", option.trim(), SPACE_DELIMITER);
        self
    }
}

impl Statement for Create<'_> {
    type Output = SuccessResult;

    fn kind(&self) -> StatementKind {
        StatementKind::Create
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
        if !parts.contains_part("definitions") {
            return Err(DbError::structural("CREATE TABLE requires at least one column"));
        }
        let mut head = String::from("CREATE ");
        if self.temporary {
            head.push_str("TEMPORARY ");
        }
        head.push_str("TABLE ");
        if self.if_not_exists {
            head.push_str("IF NOT EXISTS ");
        }
        head.push_str(&self.table);
        parts.append_sql("create", head, SPACE_DELIMITER);
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
    fn create_table_shape() {
        let db = Database::new(DatabaseConfig::sqlite_memory().table_prefix("x_")).unwrap();
        let sql = db
            .create("#__tags")
            .if_not_exists()
            .column("id", "INTEGER NOT NULL")
            .column("name", "VARCHAR(64)")
            .primary_key(&["id"])
            .unique(&["name"])
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS `x_tags` (`id` INTEGER NOT NULL, `name` VARCHAR(64), \
             PRIMARY KEY (`id`), UNIQUE (`name`))"
        );
    }

    #[test]
    fn temporary_with_option() {
        let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
        let sql = db
            .create("scratch")
            .temporary()
            .column("k", "TEXT")
            .option("WITHOUT ROWID")
            .to_sql()
            .unwrap();
        assert_eq!(sql, "CREATE TEMPORARY TABLE `scratch` (`k` TEXT) WITHOUT ROWID");
    }

    #[test]
    fn create_without_columns_fails() {
        let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
        assert!(db.create("t").build().unwrap_err().is_structural());
    }
}
