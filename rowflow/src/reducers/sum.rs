use super::key_prefix;
use crate::error::{Error, Result};
use crate::row::Row;
use crate::types::{GroupRows, Reducer};
use crate::value::{Value, numeric_add};

/// Emits one row per group: the group-key columns plus the sum of the
/// configured column.  All-int groups sum to an int.
pub struct Sum {
    column: String,
}

impl Sum {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Reducer for Sum {
    fn reduce(&self, keys: &[String], rows: GroupRows<'_>) -> Result<Vec<Row>> {
        let mut prefix: Option<Row> = None;
        let mut total = Value::Int(0);
        for row in rows {
            if prefix.is_none() {
                prefix = Some(key_prefix(keys, &row)?);
            }
            let value = row.get(&self.column)?;
            total = numeric_add(&total, value)
                .ok_or_else(|| Error::column_type(&self.column, "number", value.kind()))?;
        }
        let mut out = prefix.unwrap_or_default();
        out.set(self.column.as_str(), total);
        Ok(vec![out])
    }
}
