//! Statement variants.
//!
//! Every variant is a consuming fluent builder over named [`Parts`]. Its fixed
//! structure list decides how the parts serialize; builder call order does not
//! matter. Building never mutates the builder: `finalize` defaults are applied
//! to a copy of the parts.
//!
//! # Example
//!
//! ```
//! use dbal::prelude::*;
//!
//! let db = Database::new(DatabaseConfig::sqlite_memory().table_prefix("cms_"))?;
//! let sql = db
//!     .select()
//!     .columns(&["u.id", "u.name"])
//!     .from("#__users AS u")?
//!     .where_eq("u.active", 1)
//!     .order_by("u.name", Order::Asc)
//!     .limit(10)
//!     .to_sql()?;
//! assert_eq!(
//!     sql,
//!     "SELECT `u`.`id`, `u`.`name` FROM `cms_users` AS `u` WHERE `u`.`active` = ? \
//!      ORDER BY `u`.`name` ASC LIMIT 10"
//! );
//! # Ok::<(), DbError>(())
//! ```

/// Generate the WHERE builder family for a statement with `db` and `parts` fields.
macro_rules! impl_where_methods {
    ($ty:ident) => {
        impl<'db> $ty<'db> {
            fn push_where(mut self, condition: $crate::statement::Condition) -> Self {
                match condition.render(self.db.composer()) {
                    Ok(fragment) => self.parts.append_part(
                        "where",
                        fragment,
                        $crate::part::CONDITION_DELIMITER,
                    ),
                    Err(e) => self.parts.record(e),
                }
                self
            }

            /// Add WHERE: column = value
            pub fn where_eq(self, column: &str, value: impl Into<$crate::Value>) -> Self {
                self.push_where($crate::statement::Condition::eq(column, value))
            }

            /// Add WHERE: column != value
            pub fn where_ne(self, column: &str, value: impl Into<$crate::Value>) -> Self {
                self.push_where($crate::statement::Condition::ne(column, value))
            }

            /// Add WHERE: column > value
            pub fn where_gt(self, column: &str, value: impl Into<$crate::Value>) -> Self {
                self.push_where($crate::statement::Condition::gt(column, value))
            }

            /// Add WHERE: column >= value
            pub fn where_gte(self, column: &str, value: impl Into<$crate::Value>) -> Self {
                self.push_where($crate::statement::Condition::gte(column, value))
            }

            /// Add WHERE: column < value
            pub fn where_lt(self, column: &str, value: impl Into<$crate::Value>) -> Self {
                self.push_where($crate::statement::Condition::lt(column, value))
            }

            /// Add WHERE: column <= value
            pub fn where_lte(self, column: &str, value: impl Into<$crate::Value>) -> Self {
                self.push_where($crate::statement::Condition::lte(column, value))
            }

            /// Add WHERE: column LIKE pattern
            pub fn where_like(self, column: &str, pattern: impl Into<$crate::Value>) -> Self {
                self.push_where($crate::statement::Condition::like(column, pattern))
            }

            /// Add WHERE: column IS NULL
            pub fn where_null(self, column: &str) -> Self {
                self.push_where($crate::statement::Condition::is_null(column))
            }

            /// Add WHERE: column IS NOT NULL
            pub fn where_not_null(self, column: &str) -> Self {
                self.push_where($crate::statement::Condition::is_not_null(column))
            }

            /// Add WHERE: column BETWEEN from AND to
            pub fn where_between(
                self,
                column: &str,
                from: impl Into<$crate::Value>,
                to: impl Into<$crate::Value>,
            ) -> Self {
                self.push_where($crate::statement::Condition::between(column, from, to))
            }

            /// Add WHERE: column IN (...). An empty list fails immediately.
            pub fn where_in<V: Into<$crate::Value>>(
                self,
                column: &str,
                values: impl IntoIterator<Item = V>,
            ) -> $crate::DbResult<Self> {
                let condition = $crate::statement::Condition::in_list(column, values);
                $crate::statement::ensure_non_empty_in(&condition)?;
                Ok(self.push_where(condition))
            }

            /// Add WHERE: column NOT IN (...). An empty list fails immediately.
            pub fn where_not_in<V: Into<$crate::Value>>(
                self,
                column: &str,
                values: impl IntoIterator<Item = V>,
            ) -> $crate::DbResult<Self> {
                let condition = $crate::statement::Condition::not_in(column, values);
                $crate::statement::ensure_non_empty_in(&condition)?;
                Ok(self.push_where(condition))
            }

            /// Add a caller-written condition with positional `?` values.
            ///
            /// The text is not quoted; `#__` is still resolved and the
            /// validation guard still applies.
            pub fn where_raw(self, sql: &str, values: Vec<$crate::Value>) -> Self {
                self.push_where($crate::statement::Condition::raw(sql, values))
            }

            /// Add a caller-written condition with `:name` values.
            pub fn where_named<N: Into<String>>(
                self,
                sql: &str,
                values: impl IntoIterator<Item = (N, $crate::Value)>,
            ) -> Self {
                self.push_where($crate::statement::Condition::named(sql, values))
            }

            /// Add an arbitrary [`Condition`](crate::statement::Condition) tree.
            pub fn where_condition(self, condition: $crate::statement::Condition) -> Self {
                self.push_where(condition)
            }

            /// Add WHERE: column IN (sub-select)
            pub fn where_in_sub(mut self, column: &str, sub: $crate::statement::Select<'_>) -> Self {
                let column = self.db.composer().quote_identifier(column);
                match $crate::statement::embed(&mut self.parts, &sub) {
                    Ok(fragment) => self.parts.append_part(
                        "where",
                        $crate::part::Fragment::with_values(
                            format!("{column} IN ({})", fragment.sql),
                            fragment.values,
                        ),
                        $crate::part::CONDITION_DELIMITER,
                    ),
                    Err(e) => self.parts.record(e),
                }
                self
            }

            /// Add WHERE: EXISTS (sub-select)
            pub fn where_exists(mut self, sub: $crate::statement::Select<'_>) -> Self {
                match $crate::statement::embed(&mut self.parts, &sub) {
                    Ok(fragment) => self.parts.append_part(
                        "where",
                        $crate::part::Fragment::with_values(
                            format!("EXISTS ({})", fragment.sql),
                            fragment.values,
                        ),
                        $crate::part::CONDITION_DELIMITER,
                    ),
                    Err(e) => self.parts.record(e),
                }
                self
            }
        }
    };
}

mod alter;
mod create;
mod delete;
mod describe;
mod drop;
mod expr;
mod insert;
mod optimize;
mod raw;
mod rename;
mod select;
mod set;
mod show;
mod truncate;
mod update;


pub use alter::Alter;
pub use create::Create;
pub use delete::Delete;
pub use describe::Describe;
pub use drop::DropTable;
pub use expr::Condition;
pub use insert::Insert;
pub use optimize::Optimize;
pub use raw::{ExecResult, Raw};
pub use rename::Rename;
pub use select::{Order, Select};
pub use set::Set;
pub use show::Show;
pub use truncate::Truncate;
pub use update::Update;

use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::part::{Clause, Fragment, Parts};
use crate::result::Outcome;
use crate::value::ValueList;
use dbal_check::{StatementKind, Strictness};

/// Whether a statement's text was composed by the builders or inserted verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    /// Identifiers quoted, values bound: strict validation.
    Safe,
    /// Trusted text inserted verbatim (import scripts): lenient validation.
    Unsafe,
}

impl Safety {
    pub fn strictness(self) -> Strictness {
        match self {
            Safety::Safe => Strictness::Strict,
            Safety::Unsafe => Strictness::Lenient,
        }
    }
}

/// Serialized form of a statement, ready for the execution engine.
#[derive(Debug, Clone)]
pub struct BuiltStatement {
    pub kind: StatementKind,
    pub sql: String,
    pub values: ValueList,
    pub safety: Safety,
}

/// Behavior shared by every statement variant.
pub trait Statement: Sized {
    /// What `execute()` returns.
    type Output;

    fn kind(&self) -> StatementKind;

    /// Emission order of the parts.
    fn structure(&self) -> &'static [Clause];

    /// Separator between emitted parts.
    fn separator(&self) -> &'static str {
        " "
    }

    fn parts(&self) -> &Parts;

    fn database(&self) -> &Database;

    fn safety(&self) -> Safety {
        Safety::Safe
    }

    /// Apply defaults and check required parts on a copy of the parts.
    fn finalize(&self, _parts: &mut Parts) -> DbResult<()> {
        Ok(())
    }

    /// Wrap the backend outcome in this variant's result type.
    fn results(&self, outcome: Outcome) -> DbResult<Self::Output>;

    /// Serialize to SQL text and values.
    fn build(&self) -> DbResult<BuiltStatement> {
        let mut parts = self.parts().clone();
        self.finalize(&mut parts)?;
        let (sql, values) = parts.render(self.structure(), self.separator())?;
        if self.safety() == Safety::Safe {
            values.check_placeholders(&sql)?;
        }
        Ok(BuiltStatement {
            kind: self.kind(),
            sql,
            values,
            safety: self.safety(),
        })
    }

    fn to_sql(&self) -> DbResult<String> {
        Ok(self.build()?.sql)
    }

    /// Validate, run and wrap the result. Consumes the statement.
    fn execute(self) -> DbResult<Self::Output> {
        let built = self.build()?;
        let outcome = self.database().run(&built)?;
        self.results(outcome)
    }
}

pub(crate) fn ensure_non_empty_in(condition: &Condition) -> DbResult<()> {
    match condition {
        Condition::InList { column, values, .. } if values.is_empty() => Err(DbError::structural(
            format!("empty value list for IN on '{column}'"),
        )),
        _ => Ok(()),
    }
}

/// Build `sub` for nesting inside the statement owning `parts`.
///
/// Named placeholders are namespaced with an id unique to the parent.
pub(crate) fn embed(parts: &mut Parts, sub: &Select<'_>) -> DbResult<Fragment> {
    let built = sub.build()?;
    let id = parts.next_sub_id();
    let (sql, values) = built.values.namespaced(&built.sql, id);
    Ok(Fragment::with_values(sql, values))
}

/// Register every table name of `tables`, quoted, as a list part.
pub(crate) fn push_tables(parts: &mut Parts, db: &Database, name: &'static str, tables: &[&str]) {
    for table in tables {
        parts.append_sql(name, db.composer().quote_table(table), crate::part::LIST_DELIMITER);
    }
}

/// Check an unquoted keyword-like token (charset, collation, variable name).
pub(crate) fn check_word(what: &str, word: &str) -> DbResult<()> {
    if !word.is_empty() && word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(DbError::structural(format!("invalid {what} '{word}'")))
    }
}
