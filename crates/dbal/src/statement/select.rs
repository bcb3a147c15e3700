//! SELECT statement builder.

use super::{Condition, Statement, embed};
use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::part::{CONDITION_DELIMITER, Clause, Fragment, LIST_DELIMITER, Parts, SPACE_DELIMITER};
use crate::result::{Outcome, TabularResult};
use crate::value::Value;
use dbal_check::StatementKind;

const STRUCTURE: &[Clause] = &[
    Clause::bare("select"),
    Clause::bare("distinct"),
    Clause::bare("columns"),
    Clause::keyword("from", "FROM"),
    Clause::bare("join"),
    Clause::keyword("where", "WHERE"),
    Clause::keyword("group by", "GROUP BY"),
    Clause::keyword("having", "HAVING"),
    Clause::keyword("order by", "ORDER BY"),
    Clause::keyword("limit", "LIMIT"),
    Clause::keyword("offset", "OFFSET"),
];

/// Sort direction for [`Select::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// SELECT statement. Executes to a [`TabularResult`].
#[derive(Debug, Clone)]
pub struct Select<'db> {
    db: &'db Database,
    parts: Parts,
    cache_key: Option<String>,
}

impl_where_methods!(Select);

impl<'db> Select<'db> {
    pub(crate) fn new(db: &'db Database) -> Self {
        let mut parts = Parts::new();
        parts.append_sql("select", "SELECT", SPACE_DELIMITER);
        Self {
            db,
            parts,
            cache_key: None,
        }
    }

    /// Emit `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        if !self.parts.contains_part("distinct") {
            self.parts.append_sql("distinct", "DISTINCT", SPACE_DELIMITER);
        }
        self
    }

    /// Add projected columns. Without any, the projection defaults to `*`.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        for column in columns {
            let quoted = self.db.composer().quote_identifier(column);
            self.parts.append_sql("columns", quoted, LIST_DELIMITER);
        }
        self
    }

    /// Add one projected column with an alias.
    pub fn column_as(mut self, column: &str, alias: &str) -> Self {
        let composer = self.db.composer();
        let sql = format!(
            "{} AS {}",
            composer.quote_identifier(column),
            composer.quote_identifier(alias)
        );
        self.parts.append_sql("columns", sql, LIST_DELIMITER);
        self
    }

    /// Add a projected expression verbatim (`COUNT(*)`, `MAX(`id`)`).
    pub fn column_raw(mut self, expression: &str) -> Self {
        let sql = self.db.composer().replace_table_prefix(expression);
        self.parts.append_sql("columns", sql, LIST_DELIMITER);
        self
    }

    /// Set the source table (`name`, `name alias` or `name AS alias`). Exactly once.
    pub fn from(mut self, table: &str) -> DbResult<Self> {
        self.ensure_no_from()?;
        let sql = self.db.composer().quote_table_spec(table);
        self.parts.append_sql("from", sql, LIST_DELIMITER);
        Ok(self)
    }

    /// Set the source table with an alias. Exactly once.
    pub fn from_as(mut self, table: &str, alias: &str) -> DbResult<Self> {
        self.ensure_no_from()?;
        let sql = self.db.composer().quote_table_as(table, alias);
        self.parts.append_sql("from", sql, LIST_DELIMITER);
        Ok(self)
    }

    /// Select from a derived table. Exactly once.
    pub fn from_sub(mut self, sub: Select<'_>, alias: &str) -> DbResult<Self> {
        self.ensure_no_from()?;
        let fragment = embed(&mut self.parts, &sub)?;
        let alias = self.db.composer().quote_identifier(alias);
        self.parts.append_part(
            "from",
            Fragment::with_values(format!("({}) AS {alias}", fragment.sql), fragment.values),
            LIST_DELIMITER,
        );
        Ok(self)
    }

    fn ensure_no_from(&self) -> DbResult<()> {
        if self.parts.contains_part("from") {
            return Err(DbError::structural("FROM may only be set once"));
        }
        Ok(())
    }

    fn push_join(mut self, kind: &str, table: &str, left: &str, right: &str) -> Self {
        let composer = self.db.composer();
        let sql = format!(
            "{kind} JOIN {} ON {} = {}",
            composer.quote_table_spec(table),
            composer.quote_identifier(left),
            composer.quote_identifier(right)
        );
        self.parts.append_sql("join", sql, SPACE_DELIMITER);
        self
    }

    /// Add `INNER JOIN table ON left = right`.
    pub fn join(self, table: &str, left: &str, right: &str) -> Self {
        self.push_join("INNER", table, left, right)
    }

    /// Add `LEFT JOIN table ON left = right`.
    pub fn left_join(self, table: &str, left: &str, right: &str) -> Self {
        self.push_join("LEFT", table, left, right)
    }

    /// Add `RIGHT JOIN table ON left = right`.
    pub fn right_join(self, table: &str, left: &str, right: &str) -> Self {
        self.push_join("RIGHT", table, left, right)
    }

    pub fn group_by(mut self, columns: &[&str]) -> Self {
        for column in columns {
            let quoted = self.db.composer().quote_identifier(column);
            self.parts.append_sql("group by", quoted, LIST_DELIMITER);
        }
        self
    }

    /// Add a HAVING condition.
    pub fn having(mut self, condition: Condition) -> Self {
        match condition.render(self.db.composer()) {
            Ok(fragment) => self.parts.append_part("having", fragment, CONDITION_DELIMITER),
            Err(e) => self.parts.record(e),
        }
        self
    }

    /// Add a caller-written HAVING condition with positional `?` values.
    pub fn having_raw(self, sql: &str, values: Vec<Value>) -> Self {
        self.having(Condition::raw(sql, values))
    }

    pub fn order_by(mut self, column: &str, order: Order) -> Self {
        let sql = format!("{} {}", self.db.composer().quote_identifier(column), order.as_str());
        self.parts.append_sql("order by", sql, LIST_DELIMITER);
        self
    }

    /// Set LIMIT, replacing an earlier one.
    pub fn limit(mut self, n: u64) -> Self {
        self.parts.remove_part("limit");
        self.parts.append_sql("limit", n.to_string(), SPACE_DELIMITER);
        self
    }

    /// Set OFFSET, replacing an earlier one.
    pub fn offset(mut self, n: u64) -> Self {
        self.parts.remove_part("offset");
        self.parts.append_sql("offset", n.to_string(), SPACE_DELIMITER);
        self
    }

    /// Serve this statement from the handle's query cache under `key`.
    ///
    /// Only takes effect when query caching is enabled on the handle.
    pub fn cached(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    fn execute_cached(self, key: String) -> DbResult<TabularResult> {
        if let Some((columns, rows)) = self.db.cached_result(&key) {
            return Ok(TabularResult::from_rows(columns, rows));
        }
        let db = self.db;
        let mut result = Statement::execute(self)?;
        let columns = result.columns().to_vec();
        let rows = result.rows()?;
        db.store_cached_result(&key, columns.clone(), rows.clone());
        Ok(TabularResult::from_rows(columns, rows))
    }

    /// Run the statement (through the query cache when [`cached`](Self::cached) was used).
    pub fn execute(mut self) -> DbResult<TabularResult> {
        match self.cache_key.take() {
            Some(key) if self.db.query_caching_enabled() => self.execute_cached(key),
            _ => Statement::execute(self),
        }
    }
}

impl Statement for Select<'_> {
    type Output = TabularResult;

    fn kind(&self) -> StatementKind {
        StatementKind::Select
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
        if !parts.contains_part("columns") {
            parts.append_sql("columns", "*", LIST_DELIMITER);
        }
        // OFFSET needs a LIMIT in both SQLite and MySQL.
        if parts.contains_part("offset") && !parts.contains_part("limit") {
            parts.append_sql("limit", i64::MAX.to_string(), SPACE_DELIMITER);
        }
        Ok(())
    }

    fn results(&self, outcome: Outcome) -> DbResult<TabularResult> {
        Ok(TabularResult::from_outcome(outcome))
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn db() -> Database {
        Database::new(DatabaseConfig::sqlite_memory().table_prefix("cms_")).unwrap()
    }

    #[test]
    fn default_projection_is_star() {
        let db = db();
        assert_eq!(
            db.select().from("#__users").unwrap().to_sql().unwrap(),
            "SELECT * FROM `cms_users`"
        );
    }

    #[test]
    fn from_twice_is_structural() {
        let db = db();
        let err = db.select().from("a").unwrap().from("b").unwrap_err();
        assert!(err.is_structural());
        let err = db.select().from("a").unwrap().from_as("b", "x").unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn empty_in_fails_at_call() {
        let db = db();
        let err = db
            .select()
            .from("t")
            .unwrap()
            .where_in("id", Vec::<i64>::new())
            .unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn offset_without_limit_gets_max_limit() {
        let db = db();
        let sql = db.select().from("t").unwrap().offset(5).to_sql().unwrap();
        assert_eq!(sql, "SELECT * FROM `t` LIMIT 9223372036854775807 OFFSET 5");
    }

    #[test]
    fn limit_replaces() {
        let db = db();
        let sql = db.select().from("t").unwrap().limit(5).limit(7).to_sql().unwrap();
        assert_eq!(sql, "SELECT * FROM `t` LIMIT 7");
    }

    #[test]
    fn building_does_not_consume_builder() {
        let db = db();
        let select = db.select().from("t").unwrap();
        assert_eq!(select.to_sql().unwrap(), select.to_sql().unwrap());
    }

    #[test]
    fn joins_group_having() {
        let db = db();
        let sql = db
            .select()
            .columns(&["g.name"])
            .column_raw("COUNT(*) AS n")
            .from("#__users u")
            .unwrap()
            .left_join("#__groups AS g", "g.id", "u.group_id")
            .group_by(&["g.name"])
            .having_raw("COUNT(*) > ?", vec![Value::Int(2)])
            .order_by("n", Order::Desc)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT `g`.`name`, COUNT(*) AS n FROM `cms_users` AS `u` \
             LEFT JOIN `cms_groups` AS `g` ON `g`.`id` = `u`.`group_id` \
             GROUP BY `g`.`name` HAVING COUNT(*) > ? ORDER BY `n` DESC"
        );
    }
}
