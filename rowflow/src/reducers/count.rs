use super::key_prefix;
use crate::error::Result;
use crate::row::Row;
use crate::types::{GroupRows, Reducer};

/// Emits one row per group: the group-key columns plus the group's
/// cardinality under the configured column.
pub struct Count {
    column: String,
}

impl Count {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Reducer for Count {
    fn reduce(&self, keys: &[String], rows: GroupRows<'_>) -> Result<Vec<Row>> {
        let mut prefix: Option<Row> = None;
        let mut count: i64 = 0;
        for row in rows {
            if prefix.is_none() {
                prefix = Some(key_prefix(keys, &row)?);
            }
            count += 1;
        }
        let mut out = prefix.unwrap_or_default();
        out.set(self.column.as_str(), count);
        Ok(vec![out])
    }
}
