use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::error::Result;
use crate::row::Row;
use crate::types::{GroupRows, Reducer};
use crate::value::Value;

/// Emits up to `n` rows of each group with the largest values of a
/// column, in descending value order.  Rows tied in value at the cut
/// keep the earliest occurrences, so the result matches a stable
/// descending sort truncated to `n`.  The group streams through a
/// bounded min-heap, so memory stays O(n).
pub struct TopN {
    column: String,
    n: usize,
}

impl TopN {
    pub fn new(column: impl Into<String>, n: usize) -> Self {
        Self {
            column: column.into(),
            n,
        }
    }
}

struct Candidate {
    value: Value,
    seq: usize,
    row: Row,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.seq == other.seq
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // at equal values the later row ranks lower, so it is the one
        // the bounded heap evicts
        self.value
            .cmp(&other.value)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Reducer for TopN {
    fn reduce(&self, _keys: &[String], rows: GroupRows<'_>) -> Result<Vec<Row>> {
        let mut heap: BinaryHeap<Reverse<Candidate>> = BinaryHeap::with_capacity(self.n + 1);
        for (seq, row) in rows.enumerate() {
            let value = row.get(&self.column)?.clone();
            heap.push(Reverse(Candidate { value, seq, row }));
            if heap.len() > self.n {
                heap.pop();
            }
        }
        let mut picked: Vec<Candidate> = heap.into_iter().map(|wrapped| wrapped.0).collect();
        picked.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.seq.cmp(&b.seq)));
        Ok(picked.into_iter().map(|candidate| candidate.row).collect())
    }
}
