//! Injection-pattern guard.
//!
//! This is a heuristic defense-in-depth layer, **not** a SQL parser. It looks for
//! substrings that almost never appear in builder-composed SQL (which binds every
//! value and therefore carries no literals or comments) but routinely appear in
//! injection payloads.
//!
//! - [`Strictness::Strict`] is used for every statement composed through the builders.
//! - [`Strictness::Lenient`] is reserved for externally authored scripts that were
//!   already split on statement boundaries (`Database::import`). Only the
//!   quote-then-comment idiom is refused there.

use crate::error::{RejectReason, Rejection};

/// How aggressively [`validate`] refuses input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Refuse quotes, comments and statement terminators.
    #[default]
    Strict,
    /// Refuse only a quote immediately followed by a comment.
    Lenient,
}

/// Tokens refused in strict mode, longest first where prefixes overlap.
const STRICT_TOKENS: &[(&str, RejectReason)] = &[
    ("--", RejectReason::LineComment),
    ("/*", RejectReason::BlockCommentOpen),
    ("*/", RejectReason::BlockCommentClose),
    ("#", RejectReason::HashComment),
    (";", RejectReason::StatementTerminator),
    ("'", RejectReason::Quote),
    ("\"", RejectReason::DoubleQuote),
];

/// Tokens refused in lenient mode.
const LENIENT_TOKENS: &[&str] = &["';--", "' --", "'--", "'/*"];

/// Check SQL text before it is sent to the backend.
///
/// Returns the earliest offending token.
///
/// # Example
/// ```
/// use dbal_check::{RejectReason, Strictness, validate};
///
/// assert!(validate("SELECT `id` FROM `users` WHERE `name` = :name", Strictness::Strict).is_ok());
///
/// let err = validate("SELECT 1 -- trailing", Strictness::Strict).unwrap_err();
/// assert_eq!(err.reason, RejectReason::LineComment);
///
/// // Literals are fine in imported scripts, the comment-after-quote idiom is not.
/// assert!(validate("INSERT INTO t VALUES ('a')", Strictness::Lenient).is_ok());
/// assert!(validate("SELECT * FROM t WHERE a = 'x'--", Strictness::Lenient).is_err());
/// ```
pub fn validate(sql: &str, strictness: Strictness) -> Result<(), Rejection> {
    for (offset, _) in sql.char_indices() {
        check_at(sql, offset, strictness)?;
    }
    Ok(())
}

/// Like [`validate`], but skips identifiers quoted with `identifier_quote`.
///
/// A span counts as an identifier only when it is closed; a doubled quote
/// inside the span is an escaped quote. Unterminated spans are scanned as
/// plain text, so a bare quote character is still refused in strict mode.
/// Only `` ` `` and `"` are accepted as identifier quotes; any other
/// character falls back to [`validate`].
///
/// # Example
/// ```
/// use dbal_check::{RejectReason, Strictness, validate_quoted};
///
/// let sql = r#"SELECT "a--b" FROM "t" WHERE "id" = ?"#;
/// assert!(validate_quoted(sql, Strictness::Strict, '"').is_ok());
///
/// let err = validate_quoted(r#"SELECT "a" FROM t WHERE x = "y"#, Strictness::Strict, '"').unwrap_err();
/// assert_eq!(err.reason, RejectReason::DoubleQuote);
/// ```
pub fn validate_quoted(
    sql: &str,
    strictness: Strictness,
    identifier_quote: char,
) -> Result<(), Rejection> {
    if !matches!(identifier_quote, '`' | '"') {
        return validate(sql, strictness);
    }

    let mut resume_at = 0;
    for (offset, c) in sql.char_indices() {
        if offset < resume_at {
            continue;
        }
        if c == identifier_quote {
            if let Some(end) = quoted_span_end(sql, offset, identifier_quote) {
                resume_at = end;
                continue;
            }
        }
        check_at(sql, offset, strictness)?;
    }
    Ok(())
}

fn check_at(sql: &str, offset: usize, strictness: Strictness) -> Result<(), Rejection> {
    let rest = &sql[offset..];
    match strictness {
        Strictness::Strict => {
            for (token, reason) in STRICT_TOKENS {
                if rest.starts_with(token) {
                    return Err(Rejection::new(*reason, offset, token));
                }
            }
        }
        Strictness::Lenient => {
            if !rest.starts_with('\'') {
                return Ok(());
            }
            for token in LENIENT_TOKENS {
                if rest.starts_with(token) {
                    return Err(Rejection::new(RejectReason::QuoteThenComment, offset, token));
                }
            }
        }
    }
    Ok(())
}

/// Byte offset just past the identifier opened at `start`, or `None` when
/// it is never closed.
fn quoted_span_end(sql: &str, start: usize, quote: char) -> Option<usize> {
    let body = start + quote.len_utf8();
    let mut chars = sql[body..].char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != quote {
            continue;
        }
        if chars.peek().is_some_and(|&(_, next)| next == quote) {
            chars.next();
            continue;
        }
        return Some(body + i + quote.len_utf8());
    }
    None
}
