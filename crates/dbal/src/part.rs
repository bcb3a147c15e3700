//! Named SQL parts and their serialization.
//!
//! A statement accumulates fragments under part names (`"columns"`, `"where"`,
//! ...). Its variant supplies a fixed structure list of [`Clause`]s that decides
//! emission order; parts not named there are never emitted. Values live inside
//! the fragment that owns their placeholders, so the serialized value order
//! always follows the structure list, regardless of builder call order.

use crate::error::{DbError, DbResult};
use crate::value::ValueList;
use std::collections::HashMap;

/// Comma-joined fragments (projected columns, SET assignments, ...).
pub const LIST_DELIMITER: &str = ", ";
/// Conjunction-joined fragments (WHERE, HAVING).
pub const CONDITION_DELIMITER: &str = " AND ";
/// Space-joined fragments (JOINs, modifiers).
pub const SPACE_DELIMITER: &str = " ";

/// One entry of a statement's structure list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clause {
    /// Part name looked up in [`Parts`].
    pub name: &'static str,
    /// Keyword emitted before the part contents, if any.
    pub keyword: Option<&'static str>,
    /// Wrap the joined contents in parentheses.
    pub parens: bool,
}

impl Clause {
    /// A part emitted as-is.
    pub const fn bare(name: &'static str) -> Self {
        Self {
            name,
            keyword: None,
            parens: false,
        }
    }

    /// A part emitted after `keyword`.
    pub const fn keyword(name: &'static str, keyword: &'static str) -> Self {
        Self {
            name,
            keyword: Some(keyword),
            parens: false,
        }
    }

    /// A part emitted inside parentheses, optionally after `keyword`.
    pub const fn wrapped(name: &'static str, keyword: Option<&'static str>) -> Self {
        Self {
            name,
            keyword,
            parens: true,
        }
    }
}

/// A SQL fragment with the values bound by its placeholders.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub(crate) sql: String,
    pub(crate) values: ValueList,
}

impl Fragment {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            values: ValueList::Empty,
        }
    }

    pub fn with_values(sql: impl Into<String>, values: ValueList) -> Self {
        Self {
            sql: sql.into(),
            values,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

#[derive(Debug, Clone)]
struct Part {
    delimiter: &'static str,
    fragments: Vec<Fragment>,
}

/// The mutable state of a statement under construction.
#[derive(Debug, Clone, Default)]
pub struct Parts {
    parts: HashMap<&'static str, Part>,
    build_error: Option<String>,
    next_sub_id: u32,
}

impl Parts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment to `name`, creating the part with `delimiter` if needed.
    ///
    /// The delimiter chosen on first append sticks for the lifetime of the part.
    pub fn append_part(&mut self, name: &'static str, fragment: Fragment, delimiter: &'static str) {
        self.parts
            .entry(name)
            .or_insert_with(|| Part {
                delimiter,
                fragments: Vec::new(),
            })
            .fragments
            .push(fragment);
    }

    /// Append plain SQL text with no bound values.
    pub fn append_sql(&mut self, name: &'static str, sql: impl Into<String>, delimiter: &'static str) {
        self.append_part(name, Fragment::new(sql), delimiter);
    }

    pub fn contains_part(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    /// Drop a part entirely.
    pub fn remove_part(&mut self, name: &str) {
        self.parts.remove(name);
    }

    /// Joined contents of one part, without keyword or values.
    pub fn part_sql(&self, name: &str) -> Option<String> {
        self.parts.get(name).map(|p| {
            p.fragments
                .iter()
                .map(|f| f.sql.as_str())
                .collect::<Vec<_>>()
                .join(p.delimiter)
        })
    }

    /// Record a builder error; only the first one is kept.
    pub fn record_error(&mut self, message: impl Into<String>) {
        if self.build_error.is_none() {
            self.build_error = Some(message.into());
        }
    }

    /// Record `err` as the build error, unwrapping structural messages.
    pub fn record(&mut self, err: DbError) {
        match err {
            DbError::Structural(message) => self.record_error(message),
            other => self.record_error(other.to_string()),
        }
    }

    pub fn build_error(&self) -> Option<&str> {
        self.build_error.as_deref()
    }

    /// Allocate an identifier for a nested statement, unique within this statement.
    pub fn next_sub_id(&mut self) -> u32 {
        self.next_sub_id += 1;
        self.next_sub_id
    }

    /// Serialize the parts listed in `structure`, joined by `separator`.
    pub fn render(&self, structure: &[Clause], separator: &str) -> DbResult<(String, ValueList)> {
        if let Some(err) = &self.build_error {
            return Err(DbError::structural(err.clone()));
        }

        let mut sections = Vec::with_capacity(structure.len());
        let mut values = ValueList::Empty;

        for clause in structure {
            let Some(part) = self.parts.get(clause.name) else {
                continue;
            };
            let mut body = String::new();
            for (i, fragment) in part.fragments.iter().enumerate() {
                if i > 0 {
                    body.push_str(part.delimiter);
                }
                body.push_str(&fragment.sql);
                values.extend(fragment.values.clone())?;
            }
            if clause.parens {
                body = format!("({body})");
            }
            let section = match clause.keyword {
                Some(keyword) if body.is_empty() => keyword.to_string(),
                Some(keyword) => format!("{keyword} {body}"),
                None => body,
            };
            if !section.is_empty() {
                sections.push(section);
            }
        }

        Ok((sections.join(separator), values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    const STRUCTURE: &[Clause] = &[
        Clause::bare("verb"),
        Clause::bare("columns"),
        Clause::keyword("from", "FROM"),
        Clause::keyword("where", "WHERE"),
        Clause::keyword("limit", "LIMIT"),
    ];

    #[test]
    fn renders_in_structure_order() {
        let mut parts = Parts::new();
        parts.append_sql("limit", "10", SPACE_DELIMITER);
        parts.append_part(
            "where",
            Fragment::with_values("`b` = ?", ValueList::positional([Value::Int(2)])),
            CONDITION_DELIMITER,
        );
        parts.append_sql("from", "`t`", LIST_DELIMITER);
        parts.append_sql("columns", "`a`", LIST_DELIMITER);
        parts.append_sql("columns", "`b`", LIST_DELIMITER);
        parts.append_sql("verb", "SELECT", SPACE_DELIMITER);
        parts.append_part(
            "where",
            Fragment::with_values("`a` = ?", ValueList::positional([Value::Int(1)])),
            CONDITION_DELIMITER,
        );
        parts.append_sql("ignored", "NOPE", SPACE_DELIMITER);

        let (sql, values) = parts.render(STRUCTURE, " ").unwrap();
        assert_eq!(
            sql,
            "SELECT `a`, `b` FROM `t` WHERE `b` = ? AND `a` = ? LIMIT 10"
        );
        assert_eq!(values.values(), vec![Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn wrapped_clause_gets_parens() {
        let structure = &[
            Clause::bare("table"),
            Clause::wrapped("columns", None),
            Clause::wrapped("values", Some("VALUES")),
        ];
        let mut parts = Parts::new();
        parts.append_sql("table", "INSERT INTO `t`", SPACE_DELIMITER);
        parts.append_sql("columns", "`a`", LIST_DELIMITER);
        parts.append_part(
            "values",
            Fragment::with_values("?", ValueList::positional([Value::Int(1)])),
            LIST_DELIMITER,
        );
        let (sql, _) = parts.render(structure, " ").unwrap();
        assert_eq!(sql, "INSERT INTO `t` (`a`) VALUES (?)");
    }

    #[test]
    fn bind_mode_mixing_fails_at_render() {
        let mut parts = Parts::new();
        parts.append_part(
            "where",
            Fragment::with_values("`a` = ?", ValueList::positional([Value::Int(1)])),
            CONDITION_DELIMITER,
        );
        parts.append_part(
            "where",
            Fragment::with_values(
                "`b` = :b",
                ValueList::named([("b", Value::Int(2))]).unwrap(),
            ),
            CONDITION_DELIMITER,
        );
        assert!(parts.render(STRUCTURE, " ").unwrap_err().is_structural());
    }

    #[test]
    fn first_recorded_error_wins() {
        let mut parts = Parts::new();
        parts.record_error("first");
        parts.record_error("second");
        let err = parts.render(STRUCTURE, " ").unwrap_err();
        assert_eq!(err.to_string(), "Structural error: first");
    }

    #[test]
    fn sub_ids_are_unique_per_statement() {
        let mut parts = Parts::new();
        assert_eq!(parts.next_sub_id(), 1);
        assert_eq!(parts.next_sub_id(), 2);
        assert_eq!(Parts::new().next_sub_id(), 1);
    }
}
