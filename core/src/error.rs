//! Error types for the routegraph core library.
//!
//! Path queries never fail: an unreachable destination is an empty path.
//! Errors only arise at the edges of the crate, when decoding addresses,
//! reading edge lists or building a dedicated worker pool.

use thiserror::Error;

/// Errors surfaced by `routegraph-core`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Input was not four dot-separated decimal octets.
    #[error("malformed IPv4 address `{input}`")]
    MalformedAddress {
        /// The rejected text.
        input: String,
    },
    /// An edge-list line could not be parsed.
    #[error("malformed edge on line {line}: {reason}")]
    MalformedEdge {
        /// 1-based line number in the source.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },
    /// Reading the edge-list source failed.
    #[error("failed to read edge list: {0}")]
    Io(#[from] std::io::Error),
    /// A dedicated batch worker pool could not be started.
    #[error("failed to build batch worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Convenient alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, Error>;
