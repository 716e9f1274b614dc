use std::cmp::Ordering;

use chrono::NaiveDateTime;
use derive_more::Display;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::row::Row;

/// A single column value.  Rows are open mappings, so any column may hold
/// any of these.  `Int` and `Float` compare numerically against each other;
/// otherwise values order by variant rank, with `Null` lowest.  That gives
/// every value a total order, which is what sort, join and grouping key off.
#[derive(Clone, Debug, Default, Display, Serialize, Deserialize)]
pub enum Value {
    #[default]
    #[display("null")]
    Null,
    #[display("{_0}")]
    Int(i64),
    #[display("{_0}")]
    Float(f64),
    #[display("{_0:?}")]
    Str(String),
    #[display("{_0}")]
    DateTime(NaiveDateTime),
    #[display("({_0}, {_1})")]
    Point(f64, f64),
    #[display("{_0}")]
    Row(Box<Row>),
}

impl Value {
    /// Variant name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Point(..) => "point",
            Value::Row(_) => "row",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Str(_) => 2,
            Value::DateTime(_) => 3,
            Value::Point(..) => 4,
            Value::Row(_) => 5,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view: ints widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<(f64, f64)> {
        match self {
            Value::Point(x, y) => Some((*x, *y)),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// `a + b` over numeric values.  `Int + Int` stays `Int` unless it would
/// overflow, in which case it widens to `Float`.  Returns `None` for
/// non-numeric operands.
pub(crate) fn numeric_add(a: &Value, b: &Value) -> Option<Value> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Some(match a.checked_add(*b) {
            Some(sum) => Value::Int(sum),
            None => Value::Float(*a as f64 + *b as f64),
        }),
        _ => Some(Value::Float(a.as_f64()? + b.as_f64()?)),
    }
}

/// `a * b` over numeric values, with the same widening rules as
/// [numeric_add].
pub(crate) fn numeric_mul(a: &Value, b: &Value) -> Option<Value> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Some(match a.checked_mul(*b) {
            Some(product) => Value::Int(product),
            None => Value::Float(*a as f64 * *b as f64),
        }),
        _ => Some(Value::Float(a.as_f64()? * b.as_f64()?)),
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        use Value::*;
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => OrderedFloat(*a).cmp(&OrderedFloat(*b)),
            (Int(a), Float(b)) => OrderedFloat(*a as f64).cmp(&OrderedFloat(*b)),
            (Float(a), Int(b)) => OrderedFloat(*a).cmp(&OrderedFloat(*b as f64)),
            (Str(a), Str(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Point(ax, ay), Point(bx, by)) => OrderedFloat(*ax)
                .cmp(&OrderedFloat(*bx))
                .then_with(|| OrderedFloat(*ay).cmp(&OrderedFloat(*by))),
            (Row(a), Row(b)) => a.iter().cmp(b.iter()),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<(f64, f64)> for Value {
    fn from((x, y): (f64, f64)) -> Self {
        Value::Point(x, y)
    }
}

impl From<Row> for Value {
    fn from(v: Row) -> Self {
        Value::Row(Box::new(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    #[test]
    fn numbers_compare_across_variants() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert!(Value::Int(1) < Value::Float(1.5));
        assert!(Value::Float(2.5) > Value::Int(2));
    }

    #[test]
    fn nulls_sort_first() {
        assert!(Value::Null < Value::Int(i64::MIN));
        assert!(Value::Null < Value::Str(String::new()));
        assert_eq!(Value::Null, Value::Null);
    }

    #[test]
    fn mixed_kinds_order_by_rank() {
        assert!(Value::Int(999) < Value::Str("0".into()));
        assert!(Value::Str("z".into()) < Value::Point(0.0, 0.0));
    }

    #[test]
    fn points_order_lexicographically() {
        assert!(Value::Point(1.0, 9.0) < Value::Point(2.0, 0.0));
        assert!(Value::Point(1.0, 1.0) < Value::Point(1.0, 2.0));
    }

    #[test]
    fn nested_rows_are_values() {
        let value = Value::from(row! { "a": 1 });
        assert_eq!(value.kind(), "row");
        assert_eq!(value, Value::from(row! { "a": 1 }));
    }

    #[test]
    fn int_arithmetic_stays_int() {
        assert_eq!(
            numeric_add(&Value::Int(2), &Value::Int(3)),
            Some(Value::Int(5))
        );
        assert_eq!(
            numeric_mul(&Value::Int(2), &Value::Float(3.0)),
            Some(Value::Float(6.0))
        );
        assert_eq!(numeric_add(&Value::Str("x".into()), &Value::Int(1)), None);
    }
}
