//! Statement kind detection from the leading keyword.

use serde::{Deserialize, Serialize};

/// Type of SQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Alter,
    Drop,
    Show,
    Describe,
    Rename,
    Optimize,
    Truncate,
    Set,
    Begin,
    Commit,
    Rollback,
    With,
    Other,
}

impl StatementKind {
    /// Whether statements of this kind produce a row set.
    pub fn returns_rows(self) -> bool {
        matches!(
            self,
            Self::Select | Self::Show | Self::Describe | Self::Optimize | Self::With
        )
    }

    /// Upper-case keyword for display.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Create => "CREATE",
            Self::Alter => "ALTER",
            Self::Drop => "DROP",
            Self::Show => "SHOW",
            Self::Describe => "DESCRIBE",
            Self::Rename => "RENAME",
            Self::Optimize => "OPTIMIZE",
            Self::Truncate => "TRUNCATE",
            Self::Set => "SET",
            Self::Begin => "BEGIN",
            Self::Commit => "COMMIT",
            Self::Rollback => "ROLLBACK",
            Self::With => "WITH",
            Self::Other => "OTHER",
        }
    }
}

const KEYWORDS: &[(&str, StatementKind)] = &[
    ("SELECT", StatementKind::Select),
    ("INSERT", StatementKind::Insert),
    ("REPLACE", StatementKind::Insert),
    ("UPDATE", StatementKind::Update),
    ("DELETE", StatementKind::Delete),
    ("CREATE", StatementKind::Create),
    ("ALTER", StatementKind::Alter),
    ("DROP", StatementKind::Drop),
    ("SHOW", StatementKind::Show),
    ("DESCRIBE", StatementKind::Describe),
    ("DESC", StatementKind::Describe),
    ("EXPLAIN", StatementKind::Describe),
    ("RENAME", StatementKind::Rename),
    ("OPTIMIZE", StatementKind::Optimize),
    ("TRUNCATE", StatementKind::Truncate),
    ("SET", StatementKind::Set),
    ("BEGIN", StatementKind::Begin),
    ("START", StatementKind::Begin),
    ("COMMIT", StatementKind::Commit),
    ("ROLLBACK", StatementKind::Rollback),
    ("WITH", StatementKind::With),
];

/// Detect the statement kind of a SQL string.
///
/// Leading whitespace, comments and parentheses are skipped first.
///
/// # Example
/// ```
/// use dbal_check::{StatementKind, detect_statement_kind};
///
/// assert_eq!(detect_statement_kind("/* hint */ (SELECT 1)"), StatementKind::Select);
/// assert_eq!(detect_statement_kind("settings"), StatementKind::Other);
/// ```
pub fn detect_statement_kind(sql: &str) -> StatementKind {
    let trimmed = strip_sql_prefix(sql);
    KEYWORDS
        .iter()
        .find(|(keyword, _)| starts_with_keyword(trimmed, keyword))
        .map(|(_, kind)| *kind)
        .unwrap_or(StatementKind::Other)
}

/// Strip leading whitespace, SQL comments (`--`, `#` and `/* */`), and parentheses
/// from a SQL string to find the first meaningful keyword.
pub fn strip_sql_prefix(sql: &str) -> &str {
    let mut s = sql;
    loop {
        let before = s;
        s = s.trim_start();
        if s.starts_with("--") || s.starts_with('#') {
            match s.find('\n') {
                Some(pos) => {
                    s = &s[pos + 1..];
                    continue;
                }
                None => return "",
            }
        }
        if s.starts_with("/*") {
            match s.find("*/") {
                Some(pos) => {
                    s = &s[pos + 2..];
                    continue;
                }
                None => return "",
            }
        }
        if let Some(rest) = s.strip_prefix('(') {
            s = rest;
            continue;
        }
        if s == before {
            break;
        }
    }
    s
}

/// Case-insensitive keyword match that also requires a word boundary after the keyword.
pub fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    let Some(prefix) = s.get(0..keyword.len()) else {
        return false;
    };
    if !prefix.eq_ignore_ascii_case(keyword) {
        return false;
    }
    match s[keyword.len()..].chars().next() {
        Some(c) => !(c.is_ascii_alphanumeric() || c == '_'),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_every_variant_keyword() {
        let cases = [
            ("SELECT 1", StatementKind::Select),
            ("insert into t values (1)", StatementKind::Insert),
            ("UPDATE t SET a = 1", StatementKind::Update),
            ("DELETE FROM t", StatementKind::Delete),
            ("CREATE TABLE t (a INT)", StatementKind::Create),
            ("ALTER TABLE t ADD b INT", StatementKind::Alter),
            ("DROP TABLE t", StatementKind::Drop),
            ("SHOW TABLES", StatementKind::Show),
            ("DESCRIBE t", StatementKind::Describe),
            ("RENAME TABLE a TO b", StatementKind::Rename),
            ("OPTIMIZE TABLE t", StatementKind::Optimize),
            ("TRUNCATE TABLE t", StatementKind::Truncate),
            ("SET NAMES utf8mb4", StatementKind::Set),
            ("WITH x AS (SELECT 1) SELECT * FROM x", StatementKind::With),
            ("VACUUM", StatementKind::Other),
        ];
        for (sql, kind) in cases {
            assert_eq!(detect_statement_kind(sql), kind, "sql: {sql}");
        }
    }

    #[test]
    fn skips_comments_and_parens() {
        assert_eq!(
            detect_statement_kind("-- leading\n# more\n  /* x */ ((select 1))"),
            StatementKind::Select
        );
        assert_eq!(detect_statement_kind("-- only a comment"), StatementKind::Other);
        assert_eq!(detect_statement_kind(""), StatementKind::Other);
    }

    #[test]
    fn keyword_needs_word_boundary() {
        assert!(starts_with_keyword("SET x = 1", "SET"));
        assert!(starts_with_keyword("set", "SET"));
        assert!(!starts_with_keyword("SETTINGS", "SET"));
        assert!(!starts_with_keyword("SE", "SET"));
    }

    #[test]
    fn row_returning_kinds() {
        assert!(StatementKind::Select.returns_rows());
        assert!(StatementKind::Show.returns_rows());
        assert!(!StatementKind::Insert.returns_rows());
        assert!(!StatementKind::Truncate.returns_rows());
    }
}
