//! Operator nodes and their pull-based session [`Stream`](futures::stream::Stream)s.
//!
//! Each operator is a pair: a node implementing [`Enumerable`](crate::Enumerable), which owns its
//! upstream, and a session stream returned by the node's `iterate`, which borrows the node's
//! functions and drives the upstream session.

pub mod chunk;
pub mod distinct;
pub mod filter;
pub mod flatten;
pub mod group;
pub mod join;
pub mod map;
pub mod order;
pub mod set;
pub mod slice;
pub mod zip;
