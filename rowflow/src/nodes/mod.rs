//! The streaming operators behind [Graph](crate::Graph) nodes.  Each
//! operator is a unary or binary stream transducer: it takes one or two
//! input streams and yields a stream, pulled one row at a time.

pub(crate) mod group;
pub(crate) mod join;
pub(crate) mod map;
pub(crate) mod reduce;
pub(crate) mod sort;
pub(crate) mod source;

pub use join::{InnerJoiner, LeftJoiner, OuterJoiner, RightJoiner};
