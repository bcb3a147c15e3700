use crate::error::{DbError, DbResult};
use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// One fetched row. Column names are shared by every row of a result.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the first column called `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|i| self.values.get(i))
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Like [`get`](Self::get), but a missing column is an error.
    pub fn try_get(&self, name: &str) -> DbResult<&Value> {
        self.get(name)
            .ok_or_else(|| DbError::decode(name, "no such column"))
    }

    pub fn get_string(&self, name: &str) -> DbResult<String> {
        Ok(self.try_get(name)?.to_text())
    }

    pub fn get_int(&self, name: &str) -> DbResult<i64> {
        let value = self.try_get(name)?;
        value
            .to_int()
            .ok_or_else(|| DbError::decode(name, format!("cannot read {value} as an integer")))
    }

    pub fn get_float(&self, name: &str) -> DbResult<f64> {
        let value = self.try_get(name)?;
        value
            .to_float()
            .ok_or_else(|| DbError::decode(name, format!("cannot read {value} as a float")))
    }

    pub fn get_bool(&self, name: &str) -> DbResult<bool> {
        Ok(self.try_get(name)?.to_bool())
    }

    /// `None` for SQL `NULL`, the text form otherwise.
    pub fn get_opt_string(&self, name: &str) -> DbResult<Option<String>> {
        let value = self.try_get(name)?;
        Ok((!value.is_null()).then(|| value.to_text()))
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(
            Arc::from(vec!["id".to_string(), "name".to_string(), "score".to_string()]),
            vec![Value::Int(1), Value::from("ann"), Value::Null],
        )
    }

    #[test]
    fn typed_getters() {
        let row = row();
        assert_eq!(row.get_int("id").unwrap(), 1);
        assert_eq!(row.get_string("name").unwrap(), "ann");
        assert_eq!(row.get_opt_string("score").unwrap(), None);
        assert_eq!(row.get_index(1), Some(&Value::from("ann")));
        assert!(row.get_bool("id").unwrap());
    }

    #[test]
    fn missing_or_bad_column_is_decode_error() {
        let row = row();
        assert!(matches!(row.get_int("nope"), Err(DbError::Decode { .. })));
        let err = row.get_int("name").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Decode error on column 'name': cannot read 'ann' as an integer"
        );
    }

    #[test]
    fn serializes_as_map() {
        let json = serde_json::to_string(&row()).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"ann","score":null}"#);
    }
}
