//! Boolean conditions for WHERE and HAVING clauses.
//!
//! A [`Condition`] is built without a database handle; column names are quoted
//! and values collected when the owning statement renders it.

use crate::error::{DbError, DbResult};
use crate::ident::Composer;
use crate::part::Fragment;
use crate::value::{Value, ValueList};

/// Condition node.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// All conditions must hold.
    And(Vec<Condition>),

    /// At least one condition must hold.
    Or(Vec<Condition>),

    Not(Box<Condition>),

    /// `column op ?`
    Compare {
        column: String,
        op: &'static str,
        value: Value,
    },

    /// `column IS [NOT] NULL`
    NullCheck { column: String, is_null: bool },

    /// `column [NOT] IN (?, ...)`. An empty list is a structural error.
    InList {
        column: String,
        values: Vec<Value>,
        negated: bool,
    },

    /// `column [NOT] BETWEEN ? AND ?`
    Between {
        column: String,
        from: Value,
        to: Value,
        negated: bool,
    },

    /// Caller-written SQL with positional `?` placeholders.
    Raw { sql: String, values: Vec<Value> },

    /// Caller-written SQL with `:name` placeholders.
    Named {
        sql: String,
        values: Vec<(String, Value)>,
    },
}

macro_rules! compare_ctor {
    ($($(#[$meta:meta])* $name:ident => $op:literal),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(column: impl Into<String>, value: impl Into<Value>) -> Self {
                Condition::Compare {
                    column: column.into(),
                    op: $op,
                    value: value.into(),
                }
            }
        )*
    };
}

impl Condition {
    compare_ctor! {
        /// `column = ?`
        eq => "=",
        /// `column != ?`
        ne => "!=",
        /// `column > ?`
        gt => ">",
        /// `column >= ?`
        gte => ">=",
        /// `column < ?`
        lt => "<",
        /// `column <= ?`
        lte => "<=",
        /// `column LIKE ?`
        like => "LIKE",
        /// `column NOT LIKE ?`
        not_like => "NOT LIKE",
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Condition::And(conditions)
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Condition::Or(conditions)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Condition::NullCheck {
            column: column.into(),
            is_null: true,
        }
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Condition::NullCheck {
            column: column.into(),
            is_null: false,
        }
    }

    pub fn in_list<V: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Condition::InList {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    pub fn not_in<V: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Condition::InList {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        }
    }

    pub fn between(column: impl Into<String>, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Condition::Between {
            column: column.into(),
            from: from.into(),
            to: to.into(),
            negated: false,
        }
    }

    pub fn raw(sql: impl Into<String>, values: Vec<Value>) -> Self {
        Condition::Raw {
            sql: sql.into(),
            values,
        }
    }

    pub fn named<N: Into<String>>(sql: impl Into<String>, values: impl IntoIterator<Item = (N, Value)>) -> Self {
        Condition::Named {
            sql: sql.into(),
            values: values.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    /// Render to SQL text plus the values its placeholders bind.
    pub fn render(&self, composer: &Composer) -> DbResult<Fragment> {
        let mut values = ValueList::Empty;
        let sql = self.render_into(composer, &mut values)?;
        Ok(Fragment::with_values(sql, values))
    }

    fn render_into(&self, composer: &Composer, values: &mut ValueList) -> DbResult<String> {
        match self {
            Condition::And(items) | Condition::Or(items) => {
                let joiner = if matches!(self, Condition::And(_)) { " AND " } else { " OR " };
                if items.is_empty() {
                    return Err(DbError::structural("empty condition group"));
                }
                let parts = items
                    .iter()
                    .map(|c| c.render_into(composer, values))
                    .collect::<DbResult<Vec<_>>>()?;
                if parts.len() == 1 {
                    Ok(parts.into_iter().next().unwrap_or_default())
                } else {
                    Ok(format!("({})", parts.join(joiner)))
                }
            }
            Condition::Not(inner) => Ok(format!("NOT ({})", inner.render_into(composer, values)?)),
            Condition::Compare { column, op, value } => {
                values.push_positional(value.clone())?;
                Ok(format!("{} {op} ?", composer.quote_identifier(column)))
            }
            Condition::NullCheck { column, is_null } => Ok(format!(
                "{} IS {}NULL",
                composer.quote_identifier(column),
                if *is_null { "" } else { "NOT " }
            )),
            Condition::InList {
                column,
                values: list,
                negated,
            } => {
                if list.is_empty() {
                    return Err(DbError::structural(format!(
                        "empty value list for IN on '{column}'"
                    )));
                }
                for v in list {
                    values.push_positional(v.clone())?;
                }
                Ok(format!(
                    "{} {}IN ({})",
                    composer.quote_identifier(column),
                    if *negated { "NOT " } else { "" },
                    vec!["?"; list.len()].join(", ")
                ))
            }
            Condition::Between {
                column,
                from,
                to,
                negated,
            } => {
                values.push_positional(from.clone())?;
                values.push_positional(to.clone())?;
                Ok(format!(
                    "{} {}BETWEEN ? AND ?",
                    composer.quote_identifier(column),
                    if *negated { "NOT " } else { "" }
                ))
            }
            Condition::Raw { sql, values: raw } => {
                for v in raw {
                    values.push_positional(v.clone())?;
                }
                Ok(composer.replace_table_prefix(sql))
            }
            Condition::Named { sql, values: named } => {
                for (n, v) in named {
                    values.push_named(n.clone(), v.clone())?;
                }
                Ok(composer.replace_table_prefix(sql))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> Composer {
        Composer::new("cms_", '`')
    }

    #[test]
    fn compare_and_group() {
        let cond = Condition::or(vec![
            Condition::eq("status", "active"),
            Condition::and(vec![Condition::gt("age", 18), Condition::is_not_null("u.email")]),
        ]);
        let f = cond.render(&composer()).unwrap();
        assert_eq!(
            f.sql(),
            "(`status` = ? OR (`age` > ? AND `u`.`email` IS NOT NULL))"
        );
        assert_eq!(f.values.values(), vec![Value::from("active"), Value::Int(18)]);
    }

    #[test]
    fn in_list_and_between() {
        let f = Condition::not_in("id", [1, 2, 3]).render(&composer()).unwrap();
        assert_eq!(f.sql(), "`id` NOT IN (?, ?, ?)");
        assert_eq!(f.values.len(), 3);

        let f = Condition::between("n", 1, 5).render(&composer()).unwrap();
        assert_eq!(f.sql(), "`n` BETWEEN ? AND ?");
    }

    #[test]
    fn empty_in_list_fails() {
        let err = Condition::in_list("id", Vec::<i64>::new())
            .render(&composer())
            .unwrap_err();
        assert!(err.is_structural());
        assert!(Condition::and(vec![]).render(&composer()).is_err());
    }

    #[test]
    fn raw_resolves_prefix_and_named_binds_by_name() {
        let f = Condition::raw("`id` IN (SELECT `uid` FROM `#__groups`)", vec![])
            .render(&composer())
            .unwrap();
        assert_eq!(f.sql(), "`id` IN (SELECT `uid` FROM `cms_groups`)");

        let f = Condition::named("`a` = :a", [("a", Value::Int(1))])
            .render(&composer())
            .unwrap();
        assert_eq!(f.values.mode(), Some(crate::value::BindMode::Named));
    }

    #[test]
    fn mixed_modes_in_one_group_fail() {
        let cond = Condition::or(vec![
            Condition::eq("a", 1),
            Condition::named("`b` = :b", [("b", Value::Int(2))]),
        ]);
        assert!(cond.render(&composer()).unwrap_err().is_structural());
    }

    #[test]
    fn not_wraps() {
        let f = Condition::not(Condition::like("name", "a%"))
            .render(&composer())
            .unwrap();
        assert_eq!(f.sql(), "NOT (`name` LIKE ?)");
    }
}
