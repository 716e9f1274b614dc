//! Group aggregation strategies for [reduce](crate::Graph::reduce).

mod count;
mod first;
mod sum;
mod term_frequency;
mod top_n;

pub use count::*;
pub use first::*;
pub use sum::*;
pub use term_frequency::*;
pub use top_n::*;

use crate::error::Result;
use crate::row::Row;

/// The group-key columns of `row`, copied into a fresh output row.
pub(crate) fn key_prefix(keys: &[String], row: &Row) -> Result<Row> {
    let mut prefix = Row::new();
    for key in keys {
        prefix.set(key.as_str(), row.get(key)?.clone());
    }
    Ok(prefix)
}
