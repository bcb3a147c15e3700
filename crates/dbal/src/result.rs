//! Results of one statement execution.

use crate::driver::{Cursor, MemoryCursor};
use crate::error::{CursorError, DbError, DbResult};
use crate::reducer::Reducer;
use crate::row::Row;
use std::fmt;
use std::sync::Arc;

/// What the engine hands to a statement's `results()` factory.
pub struct Outcome {
    pub(crate) cursor: Box<dyn Cursor>,
    pub(crate) last_insert_id: i64,
}

impl Outcome {
    pub(crate) fn new(cursor: Box<dyn Cursor>, last_insert_id: i64) -> Self {
        Self {
            cursor,
            last_insert_id,
        }
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("columns", &self.cursor.columns())
            .field("affected_rows", &self.cursor.affected_rows())
            .field("last_insert_id", &self.last_insert_id)
            .finish()
    }
}

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessResult {
    success: bool,
    affected_rows: u64,
    last_insert_id: Option<i64>,
}

impl SuccessResult {
    pub(crate) fn from_outcome(outcome: &Outcome) -> Self {
        Self {
            success: true,
            affected_rows: outcome.cursor.affected_rows(),
            last_insert_id: None,
        }
    }

    pub(crate) fn with_insert_id(mut self, id: i64) -> Self {
        self.last_insert_id = Some(id);
        self
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    /// Row id generated by an INSERT; `None` for every other statement kind.
    pub fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }
}

/// How the next [`TabularResult::next`] call picks its row.
///
/// Cursors are forward-only: an orientation that would move backwards fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchOrientation {
    /// The row after the current one.
    #[default]
    Next,
    /// The row at this 0-based index of the result.
    Absolute(usize),
    /// Skip this many rows past the current position, then fetch.
    Relative(i64),
}

/// Cursor-backed result with monotonic forward consumption.
///
/// - [`next`](Self::next) yields rows, then `Ok(None)` once at the end of the stream,
///   then fails with [`CursorError::AfterEnd`] on every further call.
/// - [`rows`](Self::rows) must be the first read; it fails with
///   [`CursorError::AlreadyConsumed`] after any `next()` call.
pub struct TabularResult {
    cursor: Box<dyn Cursor>,
    columns: Arc<[String]>,
    position: usize,
    started: bool,
    eof: bool,
    orientation: FetchOrientation,
}

impl fmt::Debug for TabularResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabularResult")
            .field("columns", &self.columns)
            .field("position", &self.position)
            .field("started", &self.started)
            .field("eof", &self.eof)
            .field("orientation", &self.orientation)
            .finish()
    }
}

impl TabularResult {
    pub(crate) fn from_outcome(outcome: Outcome) -> Self {
        Self::new(outcome.cursor)
    }

    pub fn new(cursor: Box<dyn Cursor>) -> Self {
        let columns: Arc<[String]> = Arc::from(cursor.columns().to_vec());
        Self {
            cursor,
            columns,
            position: 0,
            started: false,
            eof: false,
            orientation: FetchOrientation::Next,
        }
    }

    /// A result over rows that are already in memory.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let rows = rows.into_iter().map(Row::into_values).collect();
        Self::new(Box::new(MemoryCursor::new(columns, rows)))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows consumed so far, skipped rows included.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the end of the stream has been reported.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Orientation applied to the next fetch only.
    pub fn set_fetch(&mut self, orientation: FetchOrientation) {
        self.orientation = orientation;
    }

    fn fetch_row(&mut self) -> DbResult<Option<Row>> {
        match self.cursor.fetch() {
            Ok(Some(values)) => {
                self.position += 1;
                Ok(Some(Row::new(Arc::clone(&self.columns), values)))
            }
            Ok(None) => {
                self.eof = true;
                Ok(None)
            }
            Err(e) => Err(DbError::database(e, None)),
        }
    }

    fn rows_to_skip(&self, orientation: FetchOrientation) -> Result<usize, CursorError> {
        match orientation {
            FetchOrientation::Next => Ok(0),
            FetchOrientation::Absolute(index) if index >= self.position => Ok(index - self.position),
            FetchOrientation::Absolute(index) => Err(CursorError::Backward {
                position: self.position,
                requested: index,
            }),
            FetchOrientation::Relative(offset) if offset >= 0 => Ok(offset as usize),
            FetchOrientation::Relative(offset) => Err(CursorError::Backward {
                position: self.position,
                requested: self.position.saturating_sub(offset.unsigned_abs() as usize),
            }),
        }
    }

    /// Fetch one row, honoring the configured orientation.
    pub fn next(&mut self) -> DbResult<Option<Row>> {
        if self.eof {
            return Err(CursorError::AfterEnd.into());
        }
        self.started = true;
        let orientation = std::mem::take(&mut self.orientation);
        for _ in 0..self.rows_to_skip(orientation)? {
            if self.fetch_row()?.is_none() {
                return Ok(None);
            }
        }
        self.fetch_row()
    }

    /// All rows. Only valid before any row was read.
    pub fn rows(&mut self) -> DbResult<Vec<Row>> {
        if self.started {
            return Err(CursorError::AlreadyConsumed {
                consumed: self.position,
            }
            .into());
        }
        self.started = true;
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_row()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// [`rows`](Self::rows) wrapped in a [`Reducer`].
    pub fn reducer(&mut self) -> DbResult<Reducer> {
        let rows = self.rows()?;
        Ok(Reducer::new(Arc::clone(&self.columns), rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn result(n: i64) -> TabularResult {
        let rows = (0..n).map(|i| vec![Value::Int(i)]).collect();
        TabularResult::new(Box::new(MemoryCursor::new(vec!["n".into()], rows)))
    }

    fn n(row: Option<Row>) -> i64 {
        row.unwrap().get_int("n").unwrap()
    }

    #[test]
    fn next_reports_end_once_then_fails() {
        let mut r = result(2);
        assert_eq!(n(r.next().unwrap()), 0);
        assert_eq!(n(r.next().unwrap()), 1);
        assert!(r.next().unwrap().is_none());
        assert!(r.is_eof());
        assert!(matches!(
            r.next(),
            Err(DbError::Cursor(CursorError::AfterEnd))
        ));
        assert!(r.next().is_err());
    }

    #[test]
    fn rows_requires_untouched_cursor() {
        let mut r = result(3);
        assert_eq!(r.rows().unwrap().len(), 3);
        assert_eq!(r.position(), 3);

        let mut r = result(3);
        r.next().unwrap();
        let err = r.rows().unwrap_err();
        assert!(matches!(
            err,
            DbError::Cursor(CursorError::AlreadyConsumed { consumed: 1 })
        ));
    }

    #[test]
    fn rows_after_empty_next_is_still_consumed() {
        let mut r = result(0);
        assert!(r.next().unwrap().is_none());
        assert!(r.rows().is_err());
    }

    #[test]
    fn absolute_and_relative_orientation() {
        let mut r = result(6);
        r.set_fetch(FetchOrientation::Absolute(2));
        assert_eq!(n(r.next().unwrap()), 2);
        assert_eq!(r.position(), 3);

        // Orientation applies to one fetch only.
        assert_eq!(n(r.next().unwrap()), 3);

        r.set_fetch(FetchOrientation::Relative(1));
        assert_eq!(n(r.next().unwrap()), 5);

        r.set_fetch(FetchOrientation::Relative(3));
        assert!(r.next().unwrap().is_none());
        assert!(r.is_eof());
    }

    #[test]
    fn backward_orientation_fails() {
        let mut r = result(4);
        r.next().unwrap();
        r.next().unwrap();
        r.set_fetch(FetchOrientation::Absolute(0));
        assert!(matches!(
            r.next(),
            Err(DbError::Cursor(CursorError::Backward { position: 2, requested: 0 }))
        ));
        r.set_fetch(FetchOrientation::Relative(-1));
        assert!(matches!(
            r.next(),
            Err(DbError::Cursor(CursorError::Backward { position: 2, requested: 1 }))
        ));
        // A failed orientation does not consume anything.
        assert_eq!(n(r.next().unwrap()), 2);
    }

    #[test]
    fn reducer_over_rows() {
        let reducer = result(3).reducer().unwrap();
        assert_eq!(reducer.len(), 3);
        assert_eq!(reducer.first_int().unwrap(), Some(0));
    }

    #[test]
    fn from_rows_keeps_columns() {
        let rows = result(2).rows().unwrap();
        let mut again = TabularResult::from_rows(vec!["n".into()], rows);
        assert_eq!(again.columns(), ["n".to_string()]);
        assert_eq!(again.rows().unwrap().len(), 2);
    }
}
