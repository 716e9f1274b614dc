use std::collections::HashSet;
use std::collections::VecDeque;
use std::rc::Rc;

use derive_new::new;

use crate::error::Result;
use crate::nodes::group::GroupRun;
use crate::row::{Key, Row};
use crate::types::{GroupRows, Joiner, RowStream};

const SUFFIX_LEFT: &str = "_1";
const SUFFIX_RIGHT: &str = "_2";

/// Sort-merge join.  Both inputs must be sorted ascending on the join
/// keys.  The right input is buffered one contiguous key-group at a
/// time so it can be replayed; the left input streams row by row
/// through the [Joiner].  The strategy alone decides what a key emits;
/// matched groups come out in ascending key order.
#[derive(new)]
pub(crate) struct JoinRows {
    left: RowStream,
    right: GroupedRows,
    joiner: Rc<dyn Joiner>,
    keys: Vec<String>,
    #[new(default)]
    left_lookahead: Option<(Key, Row)>,
    #[new(default)]
    right_group: Option<(Key, Vec<Row>)>,
    #[new(default)]
    out: VecDeque<Row>,
    #[new(default)]
    started: bool,
    #[new(default)]
    done: bool,
}

pub(crate) fn apply(
    left: RowStream,
    right: RowStream,
    joiner: Rc<dyn Joiner>,
    keys: Vec<String>,
) -> RowStream {
    let grouped_right = GroupedRows::new(right, keys.clone());
    Box::new(JoinRows::new(left, grouped_right, joiner, keys))
}

impl Iterator for JoinRows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.out.pop_front() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }
            if let Err(err) = self.step() {
                self.done = true;
                return Some(Err(err));
            }
        }
    }
}

impl JoinRows {
    /// Advance the lockstep walk by one key and queue what the joiner
    /// emitted for it.
    fn step(&mut self) -> Result<()> {
        if !self.started {
            self.started = true;
            self.prime_left()?;
            self.right_group = next_group(&mut self.right)?;
        }
        match (&self.left_lookahead, &self.right_group) {
            (None, None) => {
                self.done = true;
                Ok(())
            }
            (Some(_), None) => self.emit_left_group(Vec::new()),
            (None, Some(_)) => {
                let (_, rows) = self.right_group.take().expect("right group present");
                self.emit_right_only(rows)?;
                self.right_group = next_group(&mut self.right)?;
                Ok(())
            }
            (Some((left_key, _)), Some((right_key, _))) => match left_key.cmp(right_key) {
                std::cmp::Ordering::Less => self.emit_left_group(Vec::new()),
                std::cmp::Ordering::Greater => {
                    let (_, rows) = self.right_group.take().expect("right group present");
                    self.emit_right_only(rows)?;
                    self.right_group = next_group(&mut self.right)?;
                    Ok(())
                }
                std::cmp::Ordering::Equal => {
                    let (_, rows) = self.right_group.take().expect("right group present");
                    self.emit_left_group(rows)?;
                    self.right_group = next_group(&mut self.right)?;
                    Ok(())
                }
            },
        }
    }

    /// Pull the first left row into the lookahead.
    fn prime_left(&mut self) -> Result<()> {
        match self.left.next() {
            None => Ok(()),
            Some(Err(err)) => Err(err),
            Some(Ok(row)) => {
                let key = row.key(&self.keys)?;
                self.left_lookahead = Some((key, row));
                Ok(())
            }
        }
    }

    /// Stream the current left group through the joiner against the
    /// buffered right rows; the first row of the next left group lands
    /// in the lookahead.
    fn emit_left_group(&mut self, right: Vec<Row>) -> Result<()> {
        let (key, first) = self.left_lookahead.take().expect("left group present");
        let mut failure = None;
        let mut run = GroupRun::new(
            Some(first),
            &mut self.left,
            &self.keys,
            &key,
            &mut self.left_lookahead,
            &mut failure,
        );
        let joined = self.joiner.join(&self.keys, &mut run, right);
        if joined.is_ok() {
            // drain whatever part of the group the joiner left behind
            while run.next().is_some() {}
        }
        drop(run);
        match (joined, failure) {
            (Err(err), _) | (Ok(_), Some(err)) => Err(err),
            (Ok(rows), None) => {
                self.out.extend(rows);
                Ok(())
            }
        }
    }

    /// The key exists only on the right; the joiner sees an empty left
    /// group.
    fn emit_right_only(&mut self, right: Vec<Row>) -> Result<()> {
        let mut no_left = std::iter::empty::<Row>();
        let rows = self.joiner.join(&self.keys, &mut no_left, right)?;
        self.out.extend(rows);
        Ok(())
    }
}

fn next_group(groups: &mut GroupedRows) -> Result<Option<(Key, Vec<Row>)>> {
    groups.next().transpose()
}

/// Buffers the input one contiguous key-equal group at a time.  The join
/// reads its right input through this; the left input streams.
#[derive(new)]
pub(crate) struct GroupedRows {
    input: RowStream,
    keys: Vec<String>,
    #[new(default)]
    lookahead: Option<(Key, Row)>,
    #[new(default)]
    done: bool,
}

impl Iterator for GroupedRows {
    type Item = Result<(Key, Vec<Row>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (key, first) = match self.lookahead.take() {
            Some(pair) => pair,
            None => match self.input.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                Some(Ok(row)) => match row.key(&self.keys) {
                    Ok(key) => (key, row),
                    Err(err) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                },
            },
        };
        let mut rows = vec![first];
        loop {
            match self.input.next() {
                None => {
                    self.done = true;
                    break;
                }
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                Some(Ok(row)) => match row.key(&self.keys) {
                    Ok(next_key) if next_key == key => rows.push(row),
                    Ok(next_key) => {
                        self.lookahead = Some((next_key, row));
                        break;
                    }
                    Err(err) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                },
            }
        }
        Some(Ok((key, rows)))
    }
}

/// Merge one left row with one right row.  Non-key columns present on
/// both sides get the configured suffixes; join keys and one-sided
/// columns keep their names.  Left columns come first.
fn join_two_rows(
    keys: &[String],
    left: &Row,
    right: &Row,
    suffix_left: &str,
    suffix_right: &str,
) -> Row {
    let overlap: HashSet<&str> = left
        .columns()
        .filter(|column| right.contains(column) && !keys.iter().any(|key| key.as_str() == *column))
        .collect();
    let mut joined = Row::new();
    for (column, value) in left.iter() {
        if overlap.contains(column) {
            joined.set(format!("{column}{suffix_left}"), value.clone());
        } else {
            joined.set(column, value.clone());
        }
    }
    for (column, value) in right.iter() {
        if overlap.contains(column) {
            joined.set(format!("{column}{suffix_right}"), value.clone());
        } else {
            joined.set(column, value.clone());
        }
    }
    joined
}

/// Streams the left group against the buffered right rows, left-major.
fn stream_product(
    keys: &[String],
    left: GroupRows<'_>,
    right: &[Row],
    suffix_left: &str,
    suffix_right: &str,
    out: &mut Vec<Row>,
) {
    for left_row in left {
        for right_row in right {
            out.push(join_two_rows(keys, &left_row, right_row, suffix_left, suffix_right));
        }
    }
}

fn empty_side() -> Vec<Row> {
    vec![Row::new()]
}

/// Emits only keys present on both sides.
pub struct InnerJoiner {
    suffix_left: String,
    suffix_right: String,
}

impl InnerJoiner {
    pub fn new() -> Self {
        Self::with_suffixes(SUFFIX_LEFT, SUFFIX_RIGHT)
    }

    pub fn with_suffixes(suffix_left: impl Into<String>, suffix_right: impl Into<String>) -> Self {
        Self {
            suffix_left: suffix_left.into(),
            suffix_right: suffix_right.into(),
        }
    }
}

impl Default for InnerJoiner {
    fn default() -> Self {
        Self::new()
    }
}

impl Joiner for InnerJoiner {
    fn join(&self, keys: &[String], left: GroupRows<'_>, right: Vec<Row>) -> Result<Vec<Row>> {
        let mut out = Vec::new();
        if !right.is_empty() {
            stream_product(keys, left, &right, &self.suffix_left, &self.suffix_right, &mut out);
        }
        Ok(out)
    }
}

/// Emits every key: one-sided rows pass through with no columns added
/// for the missing side.
pub struct OuterJoiner {
    suffix_left: String,
    suffix_right: String,
}

impl OuterJoiner {
    pub fn new() -> Self {
        Self::with_suffixes(SUFFIX_LEFT, SUFFIX_RIGHT)
    }

    pub fn with_suffixes(suffix_left: impl Into<String>, suffix_right: impl Into<String>) -> Self {
        Self {
            suffix_left: suffix_left.into(),
            suffix_right: suffix_right.into(),
        }
    }
}

impl Default for OuterJoiner {
    fn default() -> Self {
        Self::new()
    }
}

impl Joiner for OuterJoiner {
    fn join(&self, keys: &[String], left: GroupRows<'_>, right: Vec<Row>) -> Result<Vec<Row>> {
        let right = if right.is_empty() { empty_side() } else { right };
        let mut left = left.peekable();
        let mut out = Vec::new();
        if left.peek().is_some() {
            stream_product(keys, &mut left, &right, &self.suffix_left, &self.suffix_right, &mut out);
        } else {
            let mut no_left = std::iter::once(Row::new());
            stream_product(keys, &mut no_left, &right, &self.suffix_left, &self.suffix_right, &mut out);
        }
        Ok(out)
    }
}

/// Emits every left row; right-only keys are dropped.
pub struct LeftJoiner {
    suffix_left: String,
    suffix_right: String,
}

impl LeftJoiner {
    pub fn new() -> Self {
        Self::with_suffixes(SUFFIX_LEFT, SUFFIX_RIGHT)
    }

    pub fn with_suffixes(suffix_left: impl Into<String>, suffix_right: impl Into<String>) -> Self {
        Self {
            suffix_left: suffix_left.into(),
            suffix_right: suffix_right.into(),
        }
    }
}

impl Default for LeftJoiner {
    fn default() -> Self {
        Self::new()
    }
}

impl Joiner for LeftJoiner {
    fn join(&self, keys: &[String], left: GroupRows<'_>, right: Vec<Row>) -> Result<Vec<Row>> {
        let right = if right.is_empty() { empty_side() } else { right };
        let mut out = Vec::new();
        stream_product(keys, left, &right, &self.suffix_left, &self.suffix_right, &mut out);
        Ok(out)
    }
}

/// Emits every right row; left-only keys are dropped.
pub struct RightJoiner {
    suffix_left: String,
    suffix_right: String,
}

impl RightJoiner {
    pub fn new() -> Self {
        Self::with_suffixes(SUFFIX_LEFT, SUFFIX_RIGHT)
    }

    pub fn with_suffixes(suffix_left: impl Into<String>, suffix_right: impl Into<String>) -> Self {
        Self {
            suffix_left: suffix_left.into(),
            suffix_right: suffix_right.into(),
        }
    }
}

impl Default for RightJoiner {
    fn default() -> Self {
        Self::new()
    }
}

impl Joiner for RightJoiner {
    fn join(&self, keys: &[String], left: GroupRows<'_>, right: Vec<Row>) -> Result<Vec<Row>> {
        let mut left = left.peekable();
        let mut out = Vec::new();
        if left.peek().is_some() {
            stream_product(keys, &mut left, &right, &self.suffix_left, &self.suffix_right, &mut out);
        } else {
            let mut no_left = std::iter::once(Row::new());
            stream_product(keys, &mut no_left, &right, &self.suffix_left, &self.suffix_right, &mut out);
        }
        Ok(out)
    }
}
