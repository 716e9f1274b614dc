use std::collections::VecDeque;
use std::rc::Rc;

use derive_new::new;

use crate::row::Row;
use crate::types::{Mapper, RowStream};

/// Applies a [Mapper] to each upstream row, flattening its zero-or-more
/// output rows into the stream in order.
#[derive(new)]
pub(crate) struct MapRows {
    input: RowStream,
    mapper: Rc<dyn Mapper>,
    #[new(default)]
    pending: VecDeque<Row>,
    #[new(default)]
    failed: bool,
}

pub(crate) fn apply(input: RowStream, mapper: Rc<dyn Mapper>) -> RowStream {
    Box::new(MapRows::new(input, mapper))
}

impl Iterator for MapRows {
    type Item = crate::Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.pending.pop_front() {
                return Some(Ok(row));
            }
            if self.failed {
                return None;
            }
            match self.input.next()? {
                Ok(row) => match self.mapper.map(row) {
                    Ok(rows) => self.pending.extend(rows),
                    Err(err) => {
                        self.failed = true;
                        return Some(Err(err));
                    }
                },
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
