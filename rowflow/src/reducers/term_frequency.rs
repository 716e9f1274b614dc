use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use super::key_prefix;
use crate::error::Result;
use crate::row::Row;
use crate::types::{GroupRows, Reducer};
use crate::value::Value;

/// Per-group word frequency: for each distinct value of the words column
/// emits one row with the group-key columns, the word, and `occurrences /
/// group size` under the result column (`"tf"` by default).  Words come
/// out in ascending order.
pub struct TermFrequency {
    words_column: String,
    result_column: String,
}

impl TermFrequency {
    pub fn new(words_column: impl Into<String>) -> Self {
        Self::with_result_column(words_column, "tf")
    }

    pub fn with_result_column(
        words_column: impl Into<String>,
        result_column: impl Into<String>,
    ) -> Self {
        Self {
            words_column: words_column.into(),
            result_column: result_column.into(),
        }
    }
}

impl Reducer for TermFrequency {
    fn reduce(&self, keys: &[String], rows: GroupRows<'_>) -> Result<Vec<Row>> {
        let mut counts: BTreeMap<Value, (Row, i64)> = BTreeMap::new();
        let mut group_size: i64 = 0;
        for row in rows {
            group_size += 1;
            let word = row.get(&self.words_column)?.clone();
            match counts.entry(word) {
                Entry::Vacant(slot) => {
                    let mut base = key_prefix(keys, &row)?;
                    base.set(self.words_column.as_str(), slot.key().clone());
                    slot.insert((base, 1));
                }
                Entry::Occupied(mut seen) => seen.get_mut().1 += 1,
            }
        }
        Ok(counts
            .into_values()
            .map(|(mut row, occurrences)| {
                row.set(
                    self.result_column.as_str(),
                    occurrences as f64 / group_size as f64,
                );
                row
            })
            .collect())
    }
}
