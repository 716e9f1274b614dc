use crate::error::Result;
use crate::row::Row;

/// A finite, single-pass, lazy sequence of rows.  Operators pull rows one
/// at a time and must not assume an input can be re-iterated.  An `Err`
/// item is terminal: nothing follows it.
pub type RowStream = Box<dyn Iterator<Item = Result<Row>>>;

/// The rows of one contiguous key-equal run, streamed to a [Reducer] or
/// to a [Joiner] as its left group.  Rows arrive in input order; the
/// group ends when the key tuple changes or the input is exhausted.
pub type GroupRows<'a> = &'a mut dyn Iterator<Item = Row>;

/// Per-row transform strategy consumed by [map](crate::Graph::map).
///
/// A mapper takes one row by value and produces zero or more rows, which
/// covers `Split`-style fan-out and `Filter`-style suppression.  Because
/// the row is owned, a mapper may rework it in place without any upstream
/// producer observing the change.
pub trait Mapper {
    fn map(&self, row: Row) -> Result<Vec<Row>>;
}

/// Group aggregation strategy consumed by [reduce](crate::Graph::reduce).
///
/// Called once per maximal contiguous run of rows sharing a key tuple
/// under `keys`.  The group is streamed, so aggregates like a count over
/// the whole input run in constant memory; rows the reducer does not pull
/// are drained by the operator.
pub trait Reducer {
    fn reduce(&self, keys: &[String], rows: GroupRows<'_>) -> Result<Vec<Row>>;
}

/// Key-group combination strategy consumed by [join](crate::Graph::join).
///
/// For every key tuple seen on either input the operator hands the joiner
/// that key's groups: the left one streamed row by row, the right one
/// buffered in full so it can be replayed against each left row.  A side
/// without the key gets an empty group.  The strategy alone decides what
/// to emit; left rows it does not pull are drained by the operator.
pub trait Joiner {
    fn join(&self, keys: &[String], left: GroupRows<'_>, right: Vec<Row>) -> Result<Vec<Row>>;
}
