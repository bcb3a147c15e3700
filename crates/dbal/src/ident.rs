//! Identifier quoting and table-prefix substitution.
//!
//! Table names may carry the [`TABLE_PREFIX_MARKER`] (`#__users`), which is
//! rewritten to the handle's configured prefix (`cms_users`) before quoting.
//! Identifiers are split on `.` and each part is wrapped in the backend's quote
//! character; an embedded quote character is doubled.
//!
//! # Example
//! ```
//! use dbal::Composer;
//!
//! let c = Composer::new("cms_", '`');
//! assert_eq!(c.quote_table("#__users"), "`cms_users`");
//! assert_eq!(c.quote_identifier("u.name"), "`u`.`name`");
//! assert_eq!(c.quote_identifier("u.*"), "`u`.*");
//! ```

/// Marker replaced by the configured table prefix.
pub const TABLE_PREFIX_MARKER: &str = "#__";

/// Quotes identifiers and resolves table prefixes for one database handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composer {
    prefix: String,
    quote: char,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new("", '`')
    }
}

impl Composer {
    pub fn new(prefix: impl Into<String>, quote: char) -> Self {
        Self {
            prefix: prefix.into(),
            quote,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn quote_char(&self) -> char {
        self.quote
    }

    /// Rewrite every table-prefix marker in `sql` to the configured prefix.
    pub fn replace_table_prefix(&self, sql: &str) -> String {
        sql.replace(TABLE_PREFIX_MARKER, &self.prefix)
    }

    /// Quote a (possibly dotted) identifier. `*` parts are left bare.
    pub fn quote_identifier(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 4);
        for (i, part) in name.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            let part = part.trim();
            if part == "*" {
                out.push('*');
            } else {
                self.push_quoted(&mut out, part);
            }
        }
        out
    }

    /// Resolve the prefix marker, then quote.
    pub fn quote_table(&self, name: &str) -> String {
        self.quote_identifier(&self.replace_table_prefix(name))
    }

    /// Quote a table name with an alias: `` `cms_users` AS `u` ``.
    pub fn quote_table_as(&self, name: &str, alias: &str) -> String {
        format!("{} AS {}", self.quote_table(name), self.quote_identifier(alias))
    }

    /// Quote a table written as `name`, `name alias` or `name AS alias`.
    pub fn quote_table_spec(&self, spec: &str) -> String {
        let tokens: Vec<&str> = spec.split_whitespace().collect();
        match tokens.as_slice() {
            [name, kw, alias] if kw.eq_ignore_ascii_case("AS") => self.quote_table_as(name, alias),
            [name, alias] => self.quote_table_as(name, alias),
            _ => self.quote_table(spec.trim()),
        }
    }

    /// Quote and comma-join a list of identifiers.
    pub fn quote_list<S: AsRef<str>>(&self, names: &[S]) -> String {
        names
            .iter()
            .map(|n| self.quote_identifier(n.as_ref()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn push_quoted(&self, out: &mut String, part: &str) {
        out.push(self.quote);
        for c in part.chars() {
            if c == self.quote {
                out.push(c);
            }
            out.push(c);
        }
        out.push(self.quote);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_marker_is_replaced_everywhere() {
        let c = Composer::new("cms_", '`');
        assert_eq!(
            c.replace_table_prefix("SELECT * FROM #__a JOIN #__b"),
            "SELECT * FROM cms_a JOIN cms_b"
        );
        let bare = Composer::new("", '`');
        assert_eq!(bare.quote_table("#__users"), "`users`");
    }

    #[test]
    fn embedded_quote_is_doubled() {
        let c = Composer::new("", '`');
        assert_eq!(c.quote_identifier("we`ird"), "`we``ird`");
        let ansi = Composer::new("", '"');
        assert_eq!(ansi.quote_identifier("a.b"), "\"a\".\"b\"");
    }

    #[test]
    fn alias_and_list() {
        let c = Composer::new("x_", '`');
        assert_eq!(c.quote_table_as("#__users", "u"), "`x_users` AS `u`");
        assert_eq!(c.quote_list(&["id", "u.name"]), "`id`, `u`.`name`");
    }

    #[test]
    fn table_spec_forms() {
        let c = Composer::new("x_", '`');
        assert_eq!(c.quote_table_spec("#__users"), "`x_users`");
        assert_eq!(c.quote_table_spec("#__users u"), "`x_users` AS `u`");
        assert_eq!(c.quote_table_spec("#__users as u"), "`x_users` AS `u`");
    }
}
