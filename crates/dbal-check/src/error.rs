//! Error types for dbal-check

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why the guard refused a piece of SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// A `'` character.
    Quote,
    /// A `"` character.
    DoubleQuote,
    /// A `--` line comment.
    LineComment,
    /// A `#` line comment.
    HashComment,
    /// A `/*` block comment opener.
    BlockCommentOpen,
    /// A `*/` block comment terminator.
    BlockCommentClose,
    /// A `;` statement terminator.
    StatementTerminator,
    /// A quote immediately followed by a comment (`'--`, `';--`, `' --`, `'/*`).
    QuoteThenComment,
}

impl RejectReason {
    /// Short machine-friendly code for this reason.
    pub fn code(self) -> &'static str {
        match self {
            Self::Quote => "G001",
            Self::DoubleQuote => "G002",
            Self::LineComment => "G003",
            Self::HashComment => "G004",
            Self::BlockCommentOpen => "G005",
            Self::BlockCommentClose => "G006",
            Self::StatementTerminator => "G007",
            Self::QuoteThenComment => "G008",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Quote => "single quote",
            Self::DoubleQuote => "double quote",
            Self::LineComment => "line comment `--`",
            Self::HashComment => "line comment `#`",
            Self::BlockCommentOpen => "block comment `/*`",
            Self::BlockCommentClose => "block comment end `*/`",
            Self::StatementTerminator => "statement terminator `;`",
            Self::QuoteThenComment => "quote followed by comment",
        };
        f.write_str(text)
    }
}

/// A guard refusal: the reason plus the byte offset and text of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("[{}] {reason} at byte {offset} (`{token}`)", reason.code())]
pub struct Rejection {
    pub reason: RejectReason,
    pub offset: usize,
    pub token: String,
}

impl Rejection {
    pub(crate) fn new(reason: RejectReason, offset: usize, token: &str) -> Self {
        Self {
            reason,
            offset,
            token: token.to_string(),
        }
    }
}
