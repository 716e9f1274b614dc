use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::nodes::{join, map, reduce, sort, source};
use crate::row::Row;
use crate::types::{Joiner, Mapper, Reducer, RowStream};

/// Named input bindings for [Graph::run].  Each binding is a stream
/// *factory*: a plan that references the same source node from several
/// branches instantiates it once per branch, so one named input has to be
/// able to produce more than one fresh stream per run.
#[derive(Default)]
pub struct Inputs {
    sources: HashMap<String, Box<dyn Fn() -> RowStream>>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a name to a vector of rows, cloned for every instantiation.
    pub fn rows(self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.source(name, move || Box::new(rows.clone().into_iter().map(Ok)))
    }

    /// Binds a name to a stream factory.
    pub fn source(mut self, name: impl Into<String>, factory: impl Fn() -> RowStream + 'static) -> Self {
        self.sources.insert(name.into(), Box::new(factory));
        self
    }

    fn stream(&self, name: &str) -> Result<RowStream> {
        let factory = self.sources.get(name).ok_or_else(|| Error::MissingInput {
            name: name.to_owned(),
        })?;
        Ok(factory())
    }
}

enum Op {
    FromIter {
        name: String,
    },
    FromFile {
        path: PathBuf,
        parser: Rc<source::LineParser>,
    },
    Map {
        mapper: Rc<dyn Mapper>,
    },
    Reduce {
        reducer: Rc<dyn Reducer>,
        keys: Vec<String>,
    },
    Sort {
        keys: Vec<String>,
        reverse: bool,
    },
    Join {
        joiner: Rc<dyn Joiner>,
        keys: Vec<String>,
    },
}

impl Op {
    fn name(&self) -> &'static str {
        match self {
            Op::FromIter { .. } => "from_iter",
            Op::FromFile { .. } => "from_file",
            Op::Map { .. } => "map",
            Op::Reduce { .. } => "reduce",
            Op::Sort { .. } => "sort",
            Op::Join { .. } => "join",
        }
    }
}

struct Node {
    op: Op,
    inputs: Vec<Graph>,
}

/// An immutable plan node.  A graph is a DAG of these: sources have no
/// inputs, map/reduce/sort have one, join has two.  Every builder method
/// returns a *new* node whose primary input is `self`, so plans compose
/// and share freely; `Clone` copies a cheap handle, never the plan.
///
/// Nothing executes at build time.  [run](Graph::run) wires the reachable
/// nodes into a fresh lazy stream; consuming the stream drives the
/// pipeline.  A node referenced by two downstream branches is wired, and
/// on consumption evaluated, once per branch.
#[derive(Clone)]
pub struct Graph {
    node: Rc<Node>,
}

impl Graph {
    fn node(op: Op, inputs: Vec<Graph>) -> Self {
        Graph {
            node: Rc::new(Node { op, inputs }),
        }
    }

    /// A source that consumes the run input named `name`.
    pub fn from_iter(name: impl Into<String>) -> Self {
        Self::node(Op::FromIter { name: name.into() }, Vec::new())
    }

    /// A source that reads `path` line by line at run time and parses
    /// each line into a row.
    pub fn from_file(
        path: impl Into<PathBuf>,
        parser: impl Fn(&str) -> Result<Row> + 'static,
    ) -> Self {
        Self::node(
            Op::FromFile {
                path: path.into(),
                parser: Rc::new(parser),
            },
            Vec::new(),
        )
    }

    /// Per-row transformation; the mapper may emit zero or more rows.
    pub fn map(&self, mapper: impl Mapper + 'static) -> Self {
        Self::node(
            Op::Map {
                mapper: Rc::new(mapper),
            },
            vec![self.clone()],
        )
    }

    /// Group aggregation over contiguous key-equal runs.  The input must
    /// already be sorted on `keys`; this is a precondition, not checked.
    pub fn reduce(&self, reducer: impl Reducer + 'static, keys: &[&str]) -> Self {
        Self::node(
            Op::Reduce {
                reducer: Rc::new(reducer),
                keys: own(keys),
            },
            vec![self.clone()],
        )
    }

    /// Stable ascending sort by key tuple.
    pub fn sort(&self, keys: &[&str]) -> Self {
        Self::node(
            Op::Sort {
                keys: own(keys),
                reverse: false,
            },
            vec![self.clone()],
        )
    }

    /// Stable descending sort by key tuple.
    pub fn sort_desc(&self, keys: &[&str]) -> Self {
        Self::node(
            Op::Sort {
                keys: own(keys),
                reverse: true,
            },
            vec![self.clone()],
        )
    }

    /// Sort-merge join against another graph.  Both sides must already be
    /// sorted ascending on `keys`.
    pub fn join(&self, joiner: impl Joiner + 'static, other: &Graph, keys: &[&str]) -> Self {
        Self::node(
            Op::Join {
                joiner: Rc::new(joiner),
                keys: own(keys),
            },
            vec![self.clone(), other.clone()],
        )
    }

    /// Wires the plan against the named inputs and returns a fresh lazy
    /// stream.  Wiring is eager (a missing input name or an unopenable
    /// file fails here) but rows only flow as the stream is pulled.
    /// `run` may be called any number of times, with the same or
    /// different inputs; streams are independent.
    pub fn run(&self, inputs: &Inputs) -> Result<RowStream> {
        debug!("wiring {} node", self.node.op.name());
        match &self.node.op {
            Op::FromIter { name } => inputs.stream(name),
            Op::FromFile { path, parser } => source::read_file(path, Rc::clone(parser)),
            Op::Map { mapper } => {
                let input = self.node.inputs[0].run(inputs)?;
                Ok(map::apply(input, Rc::clone(mapper)))
            }
            Op::Reduce { reducer, keys } => {
                let input = self.node.inputs[0].run(inputs)?;
                Ok(reduce::apply(input, Rc::clone(reducer), keys.clone()))
            }
            Op::Sort { keys, reverse } => {
                let input = self.node.inputs[0].run(inputs)?;
                Ok(sort::apply(input, keys.clone(), *reverse))
            }
            Op::Join { joiner, keys } => {
                let left = self.node.inputs[0].run(inputs)?;
                let right = self.node.inputs[1].run(inputs)?;
                Ok(join::apply(left, right, Rc::clone(joiner), keys.clone()))
            }
        }
    }

    /// Runs and drains the stream into a vector; the first error wins.
    pub fn collect(&self, inputs: &Inputs) -> Result<Vec<Row>> {
        self.run(inputs)?.collect()
    }
}

fn own(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|key| key.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::Path;

    use super::*;
    use crate::mappers::{FilterPunctuation, Identity, LowerCase, Split};
    use crate::nodes::InnerJoiner;
    use crate::reducers::{Count, First, Sum};
    use crate::row;

    #[test]
    fn word_count_pipeline() {
        let graph = Graph::from_iter("texts")
            .map(FilterPunctuation::new("text"))
            .map(LowerCase::new("text"))
            .map(Split::new("text"))
            .sort(&["text"])
            .reduce(Count::new("count"), &["text"])
            .sort(&["count", "text"]);
        let inputs = Inputs::new().rows(
            "texts",
            vec![row! { "text": "a b a" }, row! { "text": "a, b." }],
        );
        let out = graph.collect(&inputs).unwrap();
        assert_eq!(
            out,
            vec![row! { "text": "b", "count": 2 }, row! { "text": "a", "count": 3 }]
        );
    }

    #[test]
    fn counting_nothing_still_emits_a_row() {
        let graph = Graph::from_iter("rows").reduce(Count::new("n"), &[]);
        let out = graph
            .collect(&Inputs::new().rows("rows", vec![]))
            .unwrap();
        assert_eq!(out, vec![row! { "n": 0 }]);
    }

    #[test]
    fn a_shared_node_is_instantiated_once_per_branch() {
        let pulls = Rc::new(Cell::new(0));
        let counted = Rc::clone(&pulls);
        let inputs = Inputs::new().source("numbers", move || {
            counted.set(counted.get() + 1);
            Box::new((0..3).map(|n| Ok(row! { "n": n })))
        });
        let shared = Graph::from_iter("numbers").map(Identity);
        let summed = shared.reduce(Sum::new("n"), &[]);
        let totals = summed.join(InnerJoiner::new(), &shared.reduce(Count::new("c"), &[]), &[]);
        let out = totals.collect(&inputs).unwrap();
        assert_eq!(out, vec![row! { "n": 3, "c": 3 }]);
        assert_eq!(pulls.get(), 2);
    }

    #[test]
    fn the_same_plan_reruns_with_fresh_inputs() {
        let graph = Graph::from_iter("rows").reduce(Count::new("n"), &[]);
        let first = Inputs::new().rows("rows", vec![row! { "x": 1 }]);
        let second = Inputs::new().rows("rows", vec![row! { "x": 1 }, row! { "x": 2 }]);
        assert_eq!(graph.collect(&first).unwrap(), vec![row! { "n": 1 }]);
        assert_eq!(graph.collect(&second).unwrap(), vec![row! { "n": 2 }]);
        assert_eq!(graph.collect(&first).unwrap(), vec![row! { "n": 1 }]);
    }

    #[test]
    fn missing_named_input_fails_at_wiring() {
        let graph = Graph::from_iter("rows").map(Identity);
        let result = graph.run(&Inputs::new());
        assert!(matches!(
            result,
            Err(Error::MissingInput { name }) if name == "rows"
        ));
    }

    #[test]
    fn file_source_streams_parsed_lines() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data/docs.jsonl");
        let graph = Graph::from_file(path, Row::from_json)
            .map(Split::new("text"))
            .sort(&["text"])
            .reduce(First, &["text"]);
        let out = graph.collect(&Inputs::new()).unwrap();
        // distinct words across the fixture, ascending
        assert!(!out.is_empty());
        let words: Vec<String> = out
            .iter()
            .map(|row| row.get("text").unwrap().as_str().unwrap().to_owned())
            .collect();
        let mut sorted = words.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(words, sorted);
    }

    #[test]
    fn two_source_join_pipeline() {
        let visits = Graph::from_iter("visits").sort(&["edge"]);
        let lengths = Graph::from_iter("lengths").sort(&["edge"]);
        let joined = visits
            .join(InnerJoiner::new(), &lengths, &["edge"])
            .sort(&["edge"])
            .reduce(Sum::new("len"), &["edge"]);
        let inputs = Inputs::new()
            .rows(
                "visits",
                vec![
                    row! { "edge": "a", "t": 1 },
                    row! { "edge": "b", "t": 2 },
                    row! { "edge": "a", "t": 3 },
                ],
            )
            .rows(
                "lengths",
                vec![row! { "edge": "a", "len": 10 }, row! { "edge": "b", "len": 5 }],
            );
        let out = joined.collect(&inputs).unwrap();
        assert_eq!(
            out,
            vec![row! { "edge": "a", "len": 20 }, row! { "edge": "b", "len": 5 }]
        );
    }

    #[test]
    fn an_upstream_error_reaches_the_sink_once() {
        let graph = Graph::from_iter("rows")
            .map(LowerCase::new("text"))
            .sort(&["text"]);
        let inputs = Inputs::new().rows(
            "rows",
            vec![row! { "text": "ok" }, row! { "wrong": 1 }],
        );
        let items: Vec<Result<Row>> = graph.run(&inputs).unwrap().collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }
}
