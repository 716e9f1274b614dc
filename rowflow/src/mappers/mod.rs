//! A library of stateless, construct-time configured row transforms for
//! [map](crate::Graph::map).

mod arith;
mod columns;
mod datetime;
mod geo;
mod text;

pub use arith::*;
pub use columns::*;
pub use datetime::*;
pub use geo::*;
pub use text::*;

use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::row::Row;

pub(crate) fn str_column<'r>(row: &'r Row, column: &str) -> Result<&'r str> {
    let value = row.get(column)?;
    value
        .as_str()
        .ok_or_else(|| Error::column_type(column, "string", value.kind()))
}

pub(crate) fn datetime_column(row: &Row, column: &str) -> Result<NaiveDateTime> {
    let value = row.get(column)?;
    value
        .as_datetime()
        .ok_or_else(|| Error::column_type(column, "datetime", value.kind()))
}
