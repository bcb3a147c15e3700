//! SQL parameter values and positional/named value lists.

use crate::error::{DbError, DbResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

/// A dynamically typed SQL value, used both for bound parameters and fetched columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// The concrete type a value is bound with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindType {
    Null,
    Int,
    Bool,
    Text,
    Lob,
}

/// A value after bind-type inference, ready to hand to a driver.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Null,
    Int(i64),
    Bool(bool),
    Text(String),
    Blob(Vec<u8>),
}

impl BoundValue {
    pub fn bind_type(&self) -> BindType {
        match self {
            Self::Null => BindType::Null,
            Self::Int(_) => BindType::Int,
            Self::Bool(_) => BindType::Bool,
            Self::Text(_) => BindType::Text,
            Self::Blob(_) => BindType::Lob,
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Infer the bind form of this value.
    ///
    /// - `Null` binds as null
    /// - integers, integer-valued floats and integer-valued numeric text bind as int
    /// - `Bool` binds as bool, `Blob` as a LOB
    /// - everything else binds as text
    pub fn bind_form(&self) -> BoundValue {
        match self {
            Self::Null => BoundValue::Null,
            Self::Bool(b) => BoundValue::Bool(*b),
            Self::Int(n) => BoundValue::Int(*n),
            Self::Float(f) => match integral_f64(*f) {
                Some(n) => BoundValue::Int(n),
                None => BoundValue::Text(f.to_string()),
            },
            Self::Text(s) => match parse_integer_text(s) {
                Some(n) => BoundValue::Int(n),
                None => BoundValue::Text(s.clone()),
            },
            Self::Blob(b) => BoundValue::Blob(b.clone()),
        }
    }

    /// Render as a SQL literal for display purposes (query log), never for execution.
    pub fn display_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Blob(b) => format!("X'{}'", hex::encode(b)),
        }
    }

    /// String key used when indexing or grouping rows by this value.
    pub fn key_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::Blob(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }

    /// Coerce to text. `NULL` becomes the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Self::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            other => other.key_string(),
        }
    }

    /// Coerce to an integer. `NULL` becomes 0, floats are truncated.
    pub fn to_int(&self) -> Option<i64> {
        match self {
            Self::Null => Some(0),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(n) => Some(*n),
            Self::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Self::Float(_) => None,
            Self::Text(s) => {
                let t = s.trim();
                t.parse::<i64>()
                    .ok()
                    .or_else(|| t.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            }
            Self::Blob(_) => None,
        }
    }

    /// Coerce to a float. `NULL` becomes 0.0.
    pub fn to_float(&self) -> Option<f64> {
        match self {
            Self::Null => Some(0.0),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            Self::Blob(_) => None,
        }
    }

    /// Coerce to a boolean.
    ///
    /// `true`, the strings `"true"`/`"yes"` (any case), and any non-zero number or
    /// integer-valued numeric string are true. Everything else is false.
    pub fn to_bool(&self) -> bool {
        match self {
            Self::Null | Self::Blob(_) => false,
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(f) => *f != 0.0,
            Self::Text(s) => {
                let t = s.trim();
                if t.eq_ignore_ascii_case("true") || t.eq_ignore_ascii_case("yes") {
                    return true;
                }
                parse_integer_text(t).is_some_and(|n| n != 0)
            }
        }
    }
}

fn integral_f64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_integer_text(s: &str) -> Option<i64> {
    if s.is_empty() || s.trim() != s {
        return None;
    }
    s.parse::<i64>().ok()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_literal())
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A bind target inside prepared SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// 1-based ordinal of a `?` placeholder.
    Position(usize),
    /// Name of a `:name` placeholder, without the colon.
    Name(String),
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(i) => write!(f, "?{i}"),
            Self::Name(n) => write!(f, ":{n}"),
        }
    }
}

/// How a statement binds its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    Positional,
    Named,
}

/// Values registered by a statement: positional (`?`) or named (`:name`), never both.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ValueList {
    #[default]
    Empty,
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

fn named_placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(^|[^:A-Za-z0-9_]):([A-Za-z_][A-Za-z0-9_]*)")
            .expect("invalid built-in placeholder regex")
    })
}

impl ValueList {
    pub fn new() -> Self {
        Self::Empty
    }

    /// Build a positional list.
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        let values: Vec<Value> = values.into_iter().collect();
        if values.is_empty() {
            Self::Empty
        } else {
            Self::Positional(values)
        }
    }

    /// Build a named list. Names may be given with or without the leading `:`.
    pub fn named<N: Into<String>>(values: impl IntoIterator<Item = (N, Value)>) -> DbResult<Self> {
        let mut list = Self::Empty;
        for (name, value) in values {
            list.push_named(name, value)?;
        }
        Ok(list)
    }

    pub fn mode(&self) -> Option<BindMode> {
        match self {
            Self::Empty => None,
            Self::Positional(_) => Some(BindMode::Positional),
            Self::Named(_) => Some(BindMode::Named),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Positional(v) => v.len(),
            Self::Named(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a positional value.
    pub fn push_positional(&mut self, value: Value) -> DbResult<()> {
        match self {
            Self::Empty => *self = Self::Positional(vec![value]),
            Self::Positional(v) => v.push(value),
            Self::Named(_) => {
                return Err(DbError::structural(
                    "cannot add a positional value to a statement using named values",
                ));
            }
        }
        Ok(())
    }

    /// Append a named value.
    pub fn push_named(&mut self, name: impl Into<String>, value: Value) -> DbResult<()> {
        let name = name.into();
        let name = name.strip_prefix(':').unwrap_or(&name).to_string();
        if !is_placeholder_name(&name) {
            return Err(DbError::structural(format!(
                "invalid named placeholder ':{name}'"
            )));
        }
        match self {
            Self::Empty => *self = Self::Named(vec![(name, value)]),
            Self::Named(v) => {
                if let Some((_, existing)) = v.iter().find(|(n, _)| *n == name) {
                    if *existing != value {
                        return Err(DbError::structural(format!(
                            "named value ':{name}' bound twice with different values"
                        )));
                    }
                    return Ok(());
                }
                v.push((name, value));
            }
            Self::Positional(_) => {
                return Err(DbError::structural(
                    "cannot add a named value to a statement using positional values",
                ));
            }
        }
        Ok(())
    }

    /// Append all values from `other`, keeping order.
    pub fn extend(&mut self, other: ValueList) -> DbResult<()> {
        match other {
            Self::Empty => Ok(()),
            Self::Positional(values) => values.into_iter().try_for_each(|v| self.push_positional(v)),
            Self::Named(values) => values.into_iter().try_for_each(|(n, v)| self.push_named(n, v)),
        }
    }

    /// The raw values in registration order.
    pub fn values(&self) -> Vec<Value> {
        match self {
            Self::Empty => Vec::new(),
            Self::Positional(v) => v.clone(),
            Self::Named(v) => v.iter().map(|(_, value)| value.clone()).collect(),
        }
    }

    /// Pair every value with the placeholder it binds to.
    pub fn bindings(&self) -> Vec<(Placeholder, &Value)> {
        match self {
            Self::Empty => Vec::new(),
            Self::Positional(v) => v
                .iter()
                .enumerate()
                .map(|(i, value)| (Placeholder::Position(i + 1), value))
                .collect(),
            Self::Named(v) => v
                .iter()
                .map(|(name, value)| (Placeholder::Name(name.clone()), value))
                .collect(),
        }
    }

    /// Check that the placeholders in `sql` match the registered values.
    ///
    /// Text inside quoted identifiers is not a placeholder.
    pub fn check_placeholders(&self, sql: &str) -> DbResult<()> {
        let scanned = without_quoted_identifiers(sql);
        let positional = scanned.matches('?').count();
        let names = placeholder_names(&scanned);

        if positional > 0 && !names.is_empty() {
            return Err(DbError::structural(
                "SQL mixes positional `?` and named `:name` placeholders",
            ));
        }

        match self {
            Self::Empty => {
                if positional > 0 || !names.is_empty() {
                    return Err(DbError::structural(format!(
                        "SQL has {} placeholder(s) but no values were bound",
                        positional + names.len()
                    )));
                }
            }
            Self::Positional(values) => {
                if positional != values.len() {
                    return Err(DbError::structural(format!(
                        "SQL has {positional} positional placeholder(s) but {} value(s) were bound",
                        values.len()
                    )));
                }
            }
            Self::Named(values) => {
                let bound: BTreeSet<&str> = values.iter().map(|(n, _)| n.as_str()).collect();
                let used: BTreeSet<&str> = names.iter().map(String::as_str).collect();
                if let Some(missing) = used.difference(&bound).next() {
                    return Err(DbError::structural(format!(
                        "named placeholder ':{missing}' has no bound value"
                    )));
                }
                if let Some(unused) = bound.difference(&used).next() {
                    return Err(DbError::structural(format!(
                        "named value ':{unused}' has no placeholder"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Namespace named placeholders of a sub-statement so they cannot collide with
    /// the parent's. `:name` becomes `:s{id}_name` in both `sql` and the list.
    pub fn namespaced(self, sql: &str, id: u32) -> (String, ValueList) {
        match self {
            Self::Named(values) => {
                let sql = named_placeholder_re()
                    .replace_all(sql, |caps: &regex::Captures<'_>| {
                        format!("{}:s{id}_{}", &caps[1], &caps[2])
                    })
                    .into_owned();
                let values = values
                    .into_iter()
                    .map(|(n, v)| (format!("s{id}_{n}"), v))
                    .collect();
                (sql, Self::Named(values))
            }
            other => (sql.to_string(), other),
        }
    }

    /// Substitute display literals for placeholders (query log only).
    pub fn interpolate(&self, sql: &str) -> String {
        match self {
            Self::Empty => sql.to_string(),
            Self::Positional(values) => {
                let mut out = String::with_capacity(sql.len());
                let mut iter = values.iter();
                for c in sql.chars() {
                    if c == '?' {
                        match iter.next() {
                            Some(v) => out.push_str(&v.display_literal()),
                            None => out.push(c),
                        }
                    } else {
                        out.push(c);
                    }
                }
                out
            }
            Self::Named(values) => named_placeholder_re()
                .replace_all(sql, |caps: &regex::Captures<'_>| {
                    let name = &caps[2];
                    match values.iter().find(|(n, _)| n == name) {
                        Some((_, v)) => format!("{}{}", &caps[1], v.display_literal()),
                        None => caps[0].to_string(),
                    }
                })
                .into_owned(),
        }
    }
}

fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// `sql` with every closed `` `...` `` or `"..."` identifier replaced by a space.
/// A doubled quote inside the span is an escaped quote.
fn without_quoted_identifiers(sql: &str) -> Cow<'_, str> {
    if !sql.contains(['`', '"']) {
        return Cow::Borrowed(sql);
    }

    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '`' && c != '"' {
            out.push(c);
            continue;
        }

        let mut span = String::new();
        let mut closed = false;
        while let Some(inner) = chars.next() {
            if inner == c {
                if chars.peek() == Some(&c) {
                    chars.next();
                    span.push(c);
                    span.push(c);
                    continue;
                }
                closed = true;
                break;
            }
            span.push(inner);
        }

        if closed {
            out.push(' ');
        } else {
            out.push(c);
            out.push_str(&span);
        }
    }
    Cow::Owned(out)
}

/// Named placeholders used in `sql`, in order of first appearance.
pub(crate) fn placeholder_names(sql: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in named_placeholder_re().captures_iter(sql) {
        let name = caps[2].to_string();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}
