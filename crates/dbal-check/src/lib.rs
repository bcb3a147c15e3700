//! dbal-check
//!
//! Backend-independent helpers that operate on SQL text only.
//!
//! # Features
//!
//! - **Validation guard**: reject SQL containing injection-indicative substrings
//! - **Statement analysis**: detect the statement kind from its leading keyword
//! - **Script splitting**: split a `;`-delimited script into single statements
//!
//! # Example
//!
//! ```
//! use dbal_check::{Strictness, StatementKind, detect_statement_kind, split_script, validate};
//!
//! assert!(validate("SELECT * FROM `users` WHERE `id` = ?", Strictness::Strict).is_ok());
//! assert!(validate("SELECT 1; DROP TABLE users", Strictness::Strict).is_err());
//!
//! assert_eq!(detect_statement_kind("  select 1"), StatementKind::Select);
//! assert_eq!(split_script("CREATE TABLE a (x INT); INSERT INTO a VALUES (1);").len(), 2);
//! ```

pub mod error;
pub mod guard;
pub mod script;
pub mod statement_kind;

pub use error::{RejectReason, Rejection};
pub use guard::{Strictness, validate, validate_quoted};
pub use script::split_script;
pub use statement_kind::{StatementKind, detect_statement_kind, starts_with_keyword, strip_sql_prefix};
