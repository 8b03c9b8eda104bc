//! routegraph-core: In-memory shortest-path engine.
//!
//! A pure Rust library that maintains an undirected adjacency structure keyed
//! by `u32` node identifiers (typically packed IPv4 addresses) and answers
//! "nearest of many destinations" shortest-path queries, one at a time or as
//! a parallel batch over many sources.
//!
//! The graph is built first and then borrowed immutably by every query, so a
//! batch can share it across worker threads without locking.

mod batch;
pub mod error;
mod graph;
pub mod ipv4;
pub mod load;
mod traversal;

pub use batch::{
    shortest_paths_batch, shortest_paths_batch_keyed, shortest_paths_batch_with, BatchConfig,
};
pub use error::{Error, Result};
pub use graph::{Graph, NodeId, NodeSet};
pub use ipv4::{int_to_ipv4, ipv4_to_int, ipv4_to_int_lossy};
pub use traversal::{hop_distance, shortest_path, Distance, Path};
