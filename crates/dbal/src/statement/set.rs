//! SET statement builder (session variables and connection charset).

use super::{Statement, check_word};
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::part::{Clause, Fragment, LIST_DELIMITER, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, SuccessResult};
use crate::value::{Value, ValueList};
use dbal_check::StatementKind;

const STRUCTURE: &[Clause] = &[Clause::bare("set"), Clause::bare("assignments")];

/// SET statement.
///
/// Charset and collation names cannot be bound, so they are restricted to
/// `[A-Za-z0-9_]` instead; anything else is recorded as a build error.
#[derive(Debug, Clone)]
pub struct Set<'db> {
    db: &'db Database,
    parts: Parts,
}

impl<'db> Set<'db> {
    pub(crate) fn new(db: &'db Database) -> Self {
        let mut parts = Parts::new();
        parts.append_sql("set", "SET", SPACE_DELIMITER);
        Self { db, parts }
    }

    /// `NAMES charset COLLATE collation`
    pub fn names(mut self, charset: &str, collation: &str) -> Self {
        match check_word("charset", charset).and_then(|()| check_word("collation", collation)) {
            Ok(()) => self.parts.append_sql(
                "assignments",
                format!("NAMES {charset} COLLATE {collation}"),
                LIST_DELIMITER,
            ),
            Err(e) => self.parts.record(e),
        }
        self
    }

    /// `name = ?`, e.g. `variable("sql_mode", "ANSI")`.
    pub fn variable(mut self, name: &str, value: impl Into<Value>) -> Self {
        match check_word("variable name", name) {
            Ok(()) => self.parts.append_part(
                "assignments",
                Fragment::with_values(format!("{name} = ?"), ValueList::positional([value.into()])),
                LIST_DELIMITER,
            ),
            Err(e) => self.parts.record(e),
        }
        self
    }
}

impl Statement for Set<'_> {
    type Output = SuccessResult;

    fn kind(&self) -> StatementKind {
        StatementKind::Set
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
        if !parts.contains_part("assignments") {
            return Err(DbError::structural("SET requires at least one assignment"));
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
    fn names_and_variables() {
        let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
        let built = db
            .set()
            .names("utf8mb4", "utf8mb4_unicode_ci")
            .variable("sql_mode", "ANSI")
            .build()
            .unwrap();
        assert_eq!(built.sql, "SET NAMES utf8mb4 COLLATE utf8mb4_unicode_ci, sql_mode = ?");
        assert_eq!(built.values.len(), 1);
    }

    #[test]
    fn bad_charset_is_recorded() {
        let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
        let err = db.set().names("utf8 OR 1", "x").build().unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("invalid charset"));
    }
}
