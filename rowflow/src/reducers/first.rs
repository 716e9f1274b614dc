use crate::error::Result;
use crate::row::Row;
use crate::types::{GroupRows, Reducer};

/// Emits the first row of each group verbatim.
pub struct First;

impl Reducer for First {
    fn reduce(&self, _keys: &[String], rows: GroupRows<'_>) -> Result<Vec<Row>> {
        Ok(rows.next().into_iter().collect())
    }
}
