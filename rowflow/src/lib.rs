#![warn(clippy::perf)]
#![allow(clippy::type_complexity)]
#![allow(clippy::needless_doctest_main)]
#![doc = include_str!("../README.md")]

//! ## Execution model
//!
//! A [Graph] is a plan, not a computation: builder calls only record
//! nodes.  [Graph::run] binds the named inputs, wires the reachable
//! nodes and hands back a lazy [RowStream]; pulling the stream is what
//! drives the pipeline, one row at a time wherever the operator allows
//! it.  Sort is the exception: a blocking barrier that materialises its
//! input in a worker thread with its own buffer, so the driving process
//! stays lean even when the pipeline churns through more rows than you
//! want resident.
//!
//! Because plans are immutable values, one node can feed several
//! branches:
//!
//! ```rust
//! use rowflow::*;
//!
//! let words = Graph::from_iter("docs")
//!     .map(FilterPunctuation::new("text"))
//!     .map(LowerCase::new("text"))
//!     .map(Split::new("text"));
//! // one branch counts every word, the other counts distinct words
//! let totals = words.reduce(Count::new("words"), &[]);
//! let distinct = words
//!     .sort(&["text"])
//!     .reduce(First, &["text"])
//!     .reduce(Count::new("distinct"), &[]);
//! let summary = totals.join(InnerJoiner::new(), &distinct, &[]);
//!
//! let inputs = Inputs::new().rows("docs", vec![row! { "text": "to be or not to be" }]);
//! let out = summary.collect(&inputs).unwrap();
//! assert_eq!(out, vec![row! { "words": 6, "distinct": 4 }]);
//! ```
//!
//! Each branch re-instantiates the shared node per run; there is no
//! implicit caching.
//!
//! ## Errors
//!
//! Streams are fallible: every pulled item is a `Result<Row>`.  Operators
//! never swallow a failure; the first error (a missing column, an
//! unparseable line, a sort worker crash) travels to the sink and ends
//! the stream there.

#[macro_use]
extern crate log;

mod error;
mod graph;
mod mappers;
mod nodes;
mod reducers;
mod row;
mod types;
mod value;

pub use error::{Error, Result};
pub use graph::{Graph, Inputs};
pub use mappers::*;
pub use nodes::*;
pub use reducers::*;
pub use row::{Key, Row};
pub use types::{GroupRows, Joiner, Mapper, Reducer, RowStream};
pub use value::Value;
