//! Process-local query cache.
//!
//! Entries are keyed by an opaque string and hold a list of values, plus an
//! optional column header so an empty cached result still knows its shape.
//! There is no eviction; callers remove or clear entries themselves.

use crate::row::Row;
use std::collections::HashMap;

/// Keyed lists of cached entries (rows, by default).
#[derive(Debug, Clone)]
pub struct QueryCache<T = Row> {
    entries: HashMap<String, Vec<T>>,
    columns: HashMap<String, Vec<String>>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            columns: HashMap::new(),
        }
    }
}

impl<T> QueryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry under `key`.
    pub fn append(&mut self, key: impl Into<String>, entry: T) {
        self.entries.entry(key.into()).or_default().push(entry);
    }

    /// Append every entry under `key`. An empty list still marks the key as cached.
    pub fn append_all(&mut self, key: impl Into<String>, entries: impl IntoIterator<Item = T>) {
        self.entries.entry(key.into()).or_default().extend(entries);
    }

    /// Record the column header of the result cached under `key`.
    pub fn set_columns(&mut self, key: impl Into<String>, columns: Vec<String>) {
        self.columns.insert(key.into(), columns);
    }

    /// Column header recorded for `key`, if any.
    pub fn columns(&self, key: &str) -> Option<&[String]> {
        self.columns.get(key).map(Vec::as_slice)
    }

    pub fn get(&self, key: &str) -> Option<&[T]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop the entries and column header under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Vec<T>> {
        self.columns.remove(key);
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.columns.clear();
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_read() {
        let mut cache: QueryCache<i32> = QueryCache::new();
        cache.append("a", 1);
        cache.append("a", 2);
        cache.append_all("b", [3, 4]);
        assert_eq!(cache.get("a"), Some(&[1, 2][..]));
        assert_eq!(cache.get("b"), Some(&[3, 4][..]));
        assert!(cache.get("c").is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn empty_append_all_marks_key() {
        let mut cache: QueryCache<i32> = QueryCache::new();
        cache.append_all("empty", Vec::new());
        assert!(cache.contains("empty"));
        assert_eq!(cache.get("empty"), Some(&[][..]));
    }

    #[test]
    fn remove_and_clear() {
        let mut cache: QueryCache<i32> = QueryCache::new();
        cache.append("a", 1);
        cache.append("b", 2);
        cache.set_columns("a", vec!["n".to_string()]);
        assert_eq!(cache.columns("a"), Some(&["n".to_string()][..]));
        assert_eq!(cache.remove("a"), Some(vec![1]));
        assert!(!cache.contains("a"));
        assert!(cache.columns("a").is_none());
        cache.clear();
        assert!(cache.is_empty());
    }
}
