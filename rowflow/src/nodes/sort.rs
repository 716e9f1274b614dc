use std::thread::JoinHandle;

use crossbeam::channel::{Receiver, Sender, unbounded};

use crate::error::{Error, Result};
use crate::row::{Key, Row};
use crate::types::RowStream;

/// Messages exchanged with the sort worker.  `EndOfStream` is the
/// sentinel terminating each direction; `Failed` is terminal and replaces
/// any sorted output.
enum Message {
    Row(Row),
    EndOfStream,
    Failed(String),
}

/// Stable sort of the stream by key tuple, ascending (or descending with
/// `reverse`).  Materialisation happens in a dedicated worker thread with
/// its own buffer: the driver streams rows over a channel, the worker
/// collects, sorts and streams them back, and the driver verifies that
/// the row count survived the round trip.  A blocking barrier: the first
/// pull consumes the entire upstream.
pub(crate) struct SortRows {
    input: Option<RowStream>,
    keys: Vec<String>,
    reverse: bool,
    state: State,
}

impl SortRows {
    fn new(input: RowStream, keys: Vec<String>, reverse: bool) -> Self {
        Self {
            input: Some(input),
            keys,
            reverse,
            state: State::Pending,
        }
    }
}

#[derive(Default)]
enum State {
    #[default]
    Pending,
    Draining {
        sorted: Receiver<Message>,
        worker: Option<JoinHandle<()>>,
        sent: usize,
        received: usize,
    },
    Finished,
}

pub(crate) fn apply(input: RowStream, keys: Vec<String>, reverse: bool) -> RowStream {
    Box::new(SortRows::new(input, keys, reverse))
}

impl Iterator for SortRows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::take(&mut self.state) {
                State::Pending => {
                    if let Err(err) = self.ingest() {
                        self.state = State::Finished;
                        return Some(Err(err));
                    }
                }
                State::Draining {
                    sorted,
                    mut worker,
                    sent,
                    received,
                } => match sorted.recv() {
                    Ok(Message::Row(row)) => {
                        self.state = State::Draining {
                            sorted,
                            worker,
                            sent,
                            received: received + 1,
                        };
                        return Some(Ok(row));
                    }
                    Ok(Message::EndOfStream) => {
                        self.state = State::Finished;
                        if let Err(err) = join_worker(worker.take()) {
                            return Some(Err(err));
                        }
                        debug!("external sort returned {received} rows");
                        if sent != received {
                            return Some(Err(Error::SortCountMismatch { sent, received }));
                        }
                        return None;
                    }
                    Ok(Message::Failed(message)) => {
                        self.state = State::Finished;
                        let _ = join_worker(worker.take());
                        return Some(Err(Error::SortWorker(message)));
                    }
                    Err(_) => {
                        self.state = State::Finished;
                        let outcome = join_worker(worker.take());
                        return Some(Err(outcome.err().unwrap_or_else(|| {
                            Error::SortWorker("worker disconnected".into())
                        })));
                    }
                },
                State::Finished => {
                    self.state = State::Finished;
                    return None;
                }
            }
        }
    }
}

impl SortRows {
    /// Consume the whole upstream into the worker, then switch to
    /// draining its sorted output.
    fn ingest(&mut self) -> Result<()> {
        let input = self.input.take().expect("sort input already consumed");
        let (rows_tx, rows_rx) = unbounded::<Message>();
        let (sorted_tx, sorted_rx) = unbounded::<Message>();
        let keys = self.keys.clone();
        let reverse = self.reverse;
        let worker = std::thread::Builder::new()
            .name("rowflow-sort".into())
            .spawn(move || sort_worker(rows_rx, sorted_tx, keys, reverse))
            .map_err(|err| Error::SortWorker(err.to_string()))?;
        let mut worker = Some(worker);
        let mut sent = 0usize;
        for item in input {
            match item {
                Ok(row) => {
                    if rows_tx.send(Message::Row(row)).is_err() {
                        // worker is gone; its Failed message explains why
                        break;
                    }
                    sent += 1;
                }
                Err(err) => {
                    drop(rows_tx);
                    let _ = join_worker(worker.take());
                    return Err(err);
                }
            }
        }
        let _ = rows_tx.send(Message::EndOfStream);
        drop(rows_tx);
        debug!("external sort ingested {sent} rows");
        self.state = State::Draining {
            sorted: sorted_rx,
            worker,
            sent,
            received: 0,
        };
        Ok(())
    }
}

impl Drop for SortRows {
    fn drop(&mut self) {
        if let State::Draining { worker, .. } = &mut self.state {
            // abandoned mid-stream; the worker still has to be released
            let _ = join_worker(worker.take());
        }
    }
}

fn join_worker(worker: Option<JoinHandle<()>>) -> Result<()> {
    match worker {
        Some(handle) => handle
            .join()
            .map_err(|_| Error::SortWorker("worker panicked".into())),
        None => Ok(()),
    }
}

fn sort_worker(rows: Receiver<Message>, sorted: Sender<Message>, keys: Vec<String>, reverse: bool) {
    let mut keyed: Vec<(Key, Row)> = Vec::new();
    loop {
        match rows.recv() {
            Ok(Message::Row(row)) => match row.key(&keys) {
                Ok(key) => keyed.push((key, row)),
                Err(err) => {
                    let _ = sorted.send(Message::Failed(err.to_string()));
                    return;
                }
            },
            Ok(Message::EndOfStream) => break,
            // driver dropped its end mid-ingest; nothing left to do
            Ok(Message::Failed(_)) | Err(_) => return,
        }
    }
    // sort_by is stable, so flipping only the key comparison keeps equal
    // keys in input order for both directions
    if reverse {
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
    } else {
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
    }
    for (_, row) in keyed {
        if sorted.send(Message::Row(row)).is_err() {
            return;
        }
    }
    let _ = sorted.send(Message::EndOfStream);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;
    use crate::value::Value;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn stream(rows: Vec<Row>) -> RowStream {
        Box::new(rows.into_iter().map(Ok))
    }

    #[test]
    fn sorts_ascending_by_key_tuple() {
        let rows = vec![
            row! { "a": 2, "b": "x" },
            row! { "a": 1, "b": "z" },
            row! { "a": 1, "b": "y" },
        ];
        let out: Vec<Row> = apply(stream(rows), keys(&["a", "b"]), false)
            .map(|row| row.unwrap())
            .collect();
        assert_eq!(
            out,
            vec![
                row! { "a": 1, "b": "y" },
                row! { "a": 1, "b": "z" },
                row! { "a": 2, "b": "x" },
            ]
        );
    }

    #[test]
    fn preserves_multiplicity() {
        let rows: Vec<Row> = (0..100).map(|i| row! { "k": i % 7 }).collect();
        let out: Vec<Row> = apply(stream(rows.clone()), keys(&["k"]), false)
            .map(|row| row.unwrap())
            .collect();
        assert_eq!(out.len(), rows.len());
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let rows: Vec<Row> = (0..6).map(|i| row! { "k": i % 2, "seq": i }).collect();
        let out: Vec<Row> = apply(stream(rows), keys(&["k"]), false)
            .map(|row| row.unwrap())
            .collect();
        assert_eq!(
            out,
            vec![
                row! { "k": 0, "seq": 0 },
                row! { "k": 0, "seq": 2 },
                row! { "k": 0, "seq": 4 },
                row! { "k": 1, "seq": 1 },
                row! { "k": 1, "seq": 3 },
                row! { "k": 1, "seq": 5 },
            ]
        );
    }

    #[test]
    fn reverse_sorts_descending_and_stays_stable() {
        let rows: Vec<Row> = (0..4).map(|i| row! { "k": i % 2, "seq": i }).collect();
        let out: Vec<Row> = apply(stream(rows), keys(&["k"]), true)
            .map(|row| row.unwrap())
            .collect();
        assert_eq!(
            out,
            vec![
                row! { "k": 1, "seq": 1 },
                row! { "k": 1, "seq": 3 },
                row! { "k": 0, "seq": 0 },
                row! { "k": 0, "seq": 2 },
            ]
        );
    }

    #[test]
    fn nulls_sort_first() {
        let rows = vec![row! { "k": 1 }, row! { "k": Value::Null }, row! { "k": 0 }];
        let out: Vec<Row> = apply(stream(rows), keys(&["k"]), false)
            .map(|row| row.unwrap())
            .collect();
        assert_eq!(out[0], row! { "k": Value::Null });
    }

    #[test]
    fn missing_sort_key_fails_the_stream() {
        let rows = vec![row! { "k": 1 }, row! { "other": 2 }];
        let items: Vec<Result<Row>> = apply(stream(rows), keys(&["k"]), false).collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], Err(Error::SortWorker(_))));
    }

    #[test]
    fn upstream_error_passes_through() {
        let rows: Vec<Result<Row>> = vec![
            Ok(row! { "k": 1 }),
            Err(Error::missing_column("boom")),
        ];
        let input: RowStream = Box::new(rows.into_iter());
        let items: Vec<Result<Row>> = apply(input, keys(&["k"]), false).collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], Err(Error::MissingColumn { .. })));
    }

    #[test]
    fn abandoning_the_stream_releases_the_worker() {
        let rows: Vec<Row> = (0..10).map(|i| row! { "k": 9 - i }).collect();
        let mut sorted = apply(stream(rows), keys(&["k"]), false);
        let first = sorted.next().unwrap().unwrap();
        assert_eq!(first, row! { "k": 0 });
        drop(sorted);
    }
}
