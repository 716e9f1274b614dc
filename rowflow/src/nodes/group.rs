use derive_new::new;

use crate::error::Error;
use crate::row::{Key, Row};
use crate::types::RowStream;

/// One contiguous key-equal run, pulled lazily off a shared input so the
/// consumer never holds more than one of its rows.  The first row of the
/// *next* group lands in `lookahead`; input failures land in `failure`
/// and end the run.  Reduce streams every group this way; Join streams
/// its left groups this way.
#[derive(new)]
pub(crate) struct GroupRun<'a> {
    first: Option<Row>,
    input: &'a mut RowStream,
    keys: &'a [String],
    key: &'a Key,
    lookahead: &'a mut Option<(Key, Row)>,
    failure: &'a mut Option<Error>,
    #[new(default)]
    ended: bool,
}

impl Iterator for GroupRun<'_> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        if self.ended {
            return None;
        }
        if let Some(row) = self.first.take() {
            return Some(row);
        }
        match self.input.next() {
            None => {
                self.ended = true;
                None
            }
            Some(Err(err)) => {
                self.ended = true;
                *self.failure = Some(err);
                None
            }
            Some(Ok(row)) => match row.key(self.keys) {
                Ok(key) if key == *self.key => Some(row),
                Ok(key) => {
                    self.ended = true;
                    *self.lookahead = Some((key, row));
                    None
                }
                Err(err) => {
                    self.ended = true;
                    *self.failure = Some(err);
                    None
                }
            },
        }
    }
}
