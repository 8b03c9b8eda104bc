//! Build a [`Graph`] from an edge-list text source.
//!
//! One edge per line: two whitespace-separated endpoints, each either a
//! dotted-quad IPv4 address or a decimal `u32`. Blank lines and lines whose
//! first non-blank character is `#` are skipped. Trailing columns after the
//! two endpoints are ignored so link dumps with extra metadata load as-is.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use crate::ipv4::ipv4_to_int;

const PROGRESS_EVERY: usize = 1_000_000;

/// Parse a single endpoint token: a dotted quad or plain decimal digits.
pub fn parse_node(token: &str) -> Result<NodeId> {
    if token.contains('.') {
        return ipv4_to_int(token);
    }
    let malformed = || Error::MalformedAddress {
        input: token.to_owned(),
    };
    // u32::from_str would accept a leading '+'.
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    token.parse().map_err(|_| malformed())
}

/// Read every edge from `reader` into a fresh graph.
pub fn read_edge_list<R: BufRead>(reader: R) -> Result<Graph> {
    let start = Instant::now();
    let mut graph = Graph::new();
    let mut edges = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let Some((u, v)) = parse_edge_line(&line, index + 1)? else {
            continue;
        };
        graph.add_edge(u, v);

        edges += 1;
        if edges % PROGRESS_EVERY == 0 {
            debug!(edges, elapsed_ms = start.elapsed().as_millis() as u64, "loading edges");
        }
    }

    info!(
        edges,
        nodes = graph.node_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "edge list loaded"
    );
    Ok(graph)
}

/// Open `path` and read it with [`read_edge_list`].
pub fn load_edge_file(path: impl AsRef<Path>) -> Result<Graph> {
    let file = File::open(path.as_ref())?;
    read_edge_list(BufReader::new(file))
}

fn parse_edge_line(line: &str, line_no: usize) -> Result<Option<(NodeId, NodeId)>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = trimmed.split_whitespace();
    let (Some(u), Some(v)) = (tokens.next(), tokens.next()) else {
        return Err(Error::MalformedEdge {
            line: line_no,
            reason: "expected two endpoints".to_owned(),
        });
    };

    let endpoint = |token: &str| {
        parse_node(token).map_err(|err| Error::MalformedEdge {
            line: line_no,
            reason: err.to_string(),
        })
    };
    Ok(Some((endpoint(u)?, endpoint(v)?)))
}
