use std::fmt;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::value::Value;

/// The tuple of key-column values a row is grouped, sorted or joined on.
/// Compares lexicographically.
pub type Key = SmallVec<[Value; 4]>;

/// One logical record: an open, insertion-ordered mapping from column name
/// to [Value].  Columns are not fixed per stream; different rows may carry
/// different column sets.  Accessing a missing column through [Row::get]
/// is an error; operators that tolerate absence use [Row::opt].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    columns: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn get(&self, column: &str) -> Result<&Value> {
        self.columns
            .get(column)
            .ok_or_else(|| Error::missing_column(column))
    }

    pub fn opt(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Sets a column.  A fresh column lands at the end; an existing one
    /// keeps its position.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    /// Removes a column, preserving the order of the remaining ones.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.columns.shift_remove(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(column, value)| (column.as_str(), value))
    }

    /// Extracts the key tuple for the given key columns, failing on the
    /// first one the row is missing.
    pub fn key(&self, keys: &[String]) -> Result<Key> {
        keys.iter().map(|key| self.get(key).cloned()).collect()
    }

    /// Parses one JSON object into a row.  Numbers become [Value::Int]
    /// when integral, [Value::Float] otherwise; two-element numeric arrays
    /// become [Value::Point]; nested objects become nested rows.
    pub fn from_json(line: &str) -> Result<Row> {
        let json: serde_json::Value =
            serde_json::from_str(line).map_err(|err| Error::Json(err.to_string()))?;
        match json {
            serde_json::Value::Object(object) => row_from_object(object),
            other => Err(Error::Json(format!("expected an object, found {other}"))),
        }
    }
}

fn row_from_object(object: serde_json::Map<String, serde_json::Value>) -> Result<Row> {
    let mut row = Row::new();
    for (column, value) in object {
        row.set(column, value_from_json(value)?);
    }
    Ok(row)
}

fn value_from_json(json: serde_json::Value) -> Result<Value> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Number(n) => Ok(match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        }),
        serde_json::Value::String(s) => Ok(Value::Str(s)),
        serde_json::Value::Array(items) => match items.as_slice() {
            [x, y] if x.is_number() && y.is_number() => Ok(Value::Point(
                x.as_f64().unwrap_or(f64::NAN),
                y.as_f64().unwrap_or(f64::NAN),
            )),
            _ => Err(Error::Json(
                "arrays other than [x, y] number pairs are unsupported".into(),
            )),
        },
        serde_json::Value::Object(object) => Ok(Value::from(row_from_object(object)?)),
        serde_json::Value::Bool(_) => Err(Error::Json("boolean values are unsupported".into())),
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Row {
            columns: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.iter().format_with(", ", |(column, value), fmt| {
                fmt(&format_args!("{column}: {value}"))
            })
        )
    }
}

/// Builds a [Row] from `"column": value` pairs:
///
/// ```
/// use rowflow::row;
/// let r = row! { "doc_id": 1, "text": "hello" };
/// assert_eq!(r.len(), 2);
/// ```
#[macro_export]
macro_rules! row {
    () => { $crate::Row::new() };
    ($($column:literal : $value:expr),+ $(,)?) => {{
        let mut row = $crate::Row::new();
        $(row.set($column, $value);)+
        row
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_preserves_insertion_order() {
        let mut row = row! { "b": 2, "a": 1 };
        row.set("c", 3);
        row.set("b", 20);
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["b", "a", "c"]);
        assert_eq!(row.get("b").unwrap(), &Value::Int(20));
    }

    #[test]
    fn missing_column_is_an_error() {
        let row = row! { "a": 1 };
        assert!(matches!(
            row.get("b"),
            Err(Error::MissingColumn { column }) if column == "b"
        ));
        assert!(row.opt("b").is_none());
    }

    #[test]
    fn key_extraction() {
        let row = row! { "a": 1, "b": "x", "c": 2.5 };
        let key = row.key(&["c".into(), "a".into()]).unwrap();
        assert_eq!(key.as_slice(), &[Value::Float(2.5), Value::Int(1)]);
        assert!(row.key(&["missing".into()]).is_err());
        assert!(row.key(&[]).unwrap().is_empty());
    }

    #[test]
    fn json_round() {
        let row = Row::from_json(
            r#"{"doc_id": 1, "score": 0.5, "text": "hi", "start": [37.61, 55.75], "meta": {"k": "v"}}"#,
        )
        .unwrap();
        assert_eq!(row.get("doc_id").unwrap(), &Value::Int(1));
        assert_eq!(row.get("score").unwrap(), &Value::Float(0.5));
        assert_eq!(row.get("start").unwrap(), &Value::Point(37.61, 55.75));
        assert_eq!(
            row.get("meta").unwrap(),
            &Value::from(crate::row! { "k": "v" })
        );
        assert!(Row::from_json("[1, 2]").is_err());
        assert!(Row::from_json("{bad").is_err());
    }

    #[test]
    fn display_is_readable() {
        let row = row! { "n": 1, "w": "a" };
        assert_eq!(row.to_string(), r#"{n: 1, w: "a"}"#);
    }
}
