use std::collections::VecDeque;
use std::rc::Rc;

use derive_new::new;

use crate::error::Result;
use crate::nodes::group::GroupRun;
use crate::row::{Key, Row};
use crate::types::{Reducer, RowStream};

/// Groups the input into maximal runs of contiguous rows sharing a key
/// tuple and hands each run to the [Reducer] as a lazy sub-iterator.
/// The input must already be sorted on `keys`; grouping is by contiguous
/// equality, not by hash.
#[derive(new)]
pub(crate) struct ReduceRows {
    input: RowStream,
    reducer: Rc<dyn Reducer>,
    keys: Vec<String>,
    #[new(default)]
    lookahead: Option<(Key, Row)>,
    #[new(default)]
    out: VecDeque<Row>,
    #[new(default)]
    primed: bool,
    #[new(default)]
    done: bool,
}

pub(crate) fn apply(input: RowStream, reducer: Rc<dyn Reducer>, keys: Vec<String>) -> RowStream {
    Box::new(ReduceRows::new(input, reducer, keys))
}

impl Iterator for ReduceRows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.out.pop_front() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }
            if !self.primed {
                self.primed = true;
                match self.input.next() {
                    Some(Ok(row)) => match row.key(&self.keys) {
                        Ok(key) => self.lookahead = Some((key, row)),
                        Err(err) => {
                            self.done = true;
                            return Some(Err(err));
                        }
                    },
                    Some(Err(err)) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                    None => {
                        // An empty key list makes the whole input one
                        // group, even when the input is empty.
                        self.done = true;
                        if self.keys.is_empty() {
                            let mut empty = std::iter::empty::<Row>();
                            match self.reducer.reduce(&self.keys, &mut empty) {
                                Ok(rows) => {
                                    self.out.extend(rows);
                                    continue;
                                }
                                Err(err) => return Some(Err(err)),
                            }
                        }
                        return None;
                    }
                }
            }
            let Some((key, first)) = self.lookahead.take() else {
                self.done = true;
                return None;
            };
            let mut failure = None;
            let mut run = GroupRun::new(
                Some(first),
                &mut self.input,
                &self.keys,
                &key,
                &mut self.lookahead,
                &mut failure,
            );
            let reduced = self.reducer.reduce(&self.keys, &mut run);
            if reduced.is_ok() {
                // drain whatever part of the group the reducer left behind
                while run.next().is_some() {}
            }
            drop(run);
            match (reduced, failure) {
                (Err(err), _) | (Ok(_), Some(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                (Ok(rows), None) => self.out.extend(rows),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::reducers::{Count, First};
    use crate::row;
    use crate::types::GroupRows;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn stream(rows: Vec<Row>) -> RowStream {
        Box::new(rows.into_iter().map(Ok))
    }

    #[test]
    fn one_output_group_per_contiguous_run() {
        let rows = vec![
            row! { "k": 1, "v": "a" },
            row! { "k": 1, "v": "b" },
            row! { "k": 2, "v": "c" },
            row! { "k": 3, "v": "d" },
            row! { "k": 3, "v": "e" },
        ];
        let out: Vec<Row> = apply(stream(rows), Rc::new(First), keys(&["k"]))
            .map(|row| row.unwrap())
            .collect();
        assert_eq!(
            out,
            vec![
                row! { "k": 1, "v": "a" },
                row! { "k": 2, "v": "c" },
                row! { "k": 3, "v": "d" },
            ]
        );
    }

    #[test]
    fn grouping_is_contiguous_not_global() {
        // unsorted input: the repeated key forms a second group
        let rows = vec![
            row! { "k": 1, "v": "a" },
            row! { "k": 2, "v": "b" },
            row! { "k": 1, "v": "c" },
        ];
        let out: Vec<Row> = apply(stream(rows), Rc::new(Count::new("n")), keys(&["k"]))
            .map(|row| row.unwrap())
            .collect();
        assert_eq!(
            out,
            vec![
                row! { "k": 1, "n": 1 },
                row! { "k": 2, "n": 1 },
                row! { "k": 1, "n": 1 },
            ]
        );
    }

    #[test]
    fn empty_key_list_is_a_single_group() {
        let rows = vec![row! { "a": 1 }, row! { "b": 2 }, row! { "c": 3 }];
        let out: Vec<Row> = apply(stream(rows), Rc::new(Count::new("n")), keys(&[]))
            .map(|row| row.unwrap())
            .collect();
        assert_eq!(out, vec![row! { "n": 3 }]);
    }

    #[test]
    fn empty_input_with_empty_keys_still_reduces_once() {
        let out: Vec<Row> = apply(stream(vec![]), Rc::new(Count::new("n")), keys(&[]))
            .map(|row| row.unwrap())
            .collect();
        assert_eq!(out, vec![row! { "n": 0 }]);
    }

    #[test]
    fn empty_input_with_keys_yields_nothing() {
        let out: Vec<Result<Row>> =
            apply(stream(vec![]), Rc::new(Count::new("n")), keys(&["k"])).collect();
        assert!(out.is_empty());
    }

    #[test]
    fn missing_grouping_key_surfaces_at_the_offending_row() {
        let rows = vec![row! { "k": 1 }, row! { "k": 1 }, row! { "other": 2 }];
        let items: Vec<Result<Row>> =
            apply(stream(rows), Rc::new(Count::new("n")), keys(&["k"])).collect();
        assert!(matches!(
            items.last(),
            Some(Err(Error::MissingColumn { column })) if column == "k"
        ));
    }

    #[test]
    fn unconsumed_group_rows_are_drained() {
        // First pulls a single row per group; the operator must still
        // advance past the rest of the run.
        struct Lazy;
        impl Reducer for Lazy {
            fn reduce(&self, _keys: &[String], rows: GroupRows<'_>) -> Result<Vec<Row>> {
                Ok(rows.take(1).collect())
            }
        }
        let rows = vec![
            row! { "k": 1, "v": 1 },
            row! { "k": 1, "v": 2 },
            row! { "k": 2, "v": 3 },
        ];
        let out: Vec<Row> = apply(stream(rows), Rc::new(Lazy), keys(&["k"]))
            .map(|row| row.unwrap())
            .collect();
        assert_eq!(out, vec![row! { "k": 1, "v": 1 }, row! { "k": 2, "v": 3 }]);
    }
}
