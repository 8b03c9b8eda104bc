//! Parallel fan-out of independent single-source searches.
//!
//! Every start node gets its own search with its own frontier, distance and
//! predecessor state; the graph is the only thing the workers share, and they
//! only read it. Results are appended to a mutex-guarded collection as each
//! search finishes, so the output order is unrelated to the input order.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::graph::{Graph, NodeId, NodeSet};
use crate::traversal::{shortest_path, Path};

/// Tuning knobs for batch queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchConfig {
    /// Run on a dedicated pool of this many threads instead of the global
    /// rayon pool.
    pub threads: Option<NonZeroUsize>,
    /// Emit a debug event every this many completed searches.
    pub progress_interval: Option<NonZeroUsize>,
}

impl BatchConfig {
    pub fn with_threads(mut self, threads: NonZeroUsize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_progress_interval(mut self, interval: NonZeroUsize) -> Self {
        self.progress_interval = Some(interval);
        self
    }
}

/// Run [`shortest_path`] for every start on the global rayon pool.
///
/// Returns exactly one path per entry of `starts` (empty when unreachable),
/// in completion order, **not** input order. Use
/// [`shortest_paths_batch_keyed`] to correlate results with their start.
pub fn shortest_paths_batch(graph: &Graph, starts: &[NodeId], destinations: &NodeSet) -> Vec<Path> {
    run_batch(graph, starts, destinations, None, None)
        .into_iter()
        .map(|(_, path)| path)
        .collect()
}

/// [`shortest_paths_batch`] with explicit configuration.
///
/// Fails only if a dedicated worker pool was requested and could not be built.
pub fn shortest_paths_batch_with(
    graph: &Graph,
    starts: &[NodeId],
    destinations: &NodeSet,
    config: &BatchConfig,
) -> Result<Vec<Path>> {
    let keyed = shortest_paths_batch_keyed(graph, starts, destinations, config)?;
    Ok(keyed.into_iter().map(|(_, path)| path).collect())
}

/// Batch query returning `(start, path)` pairs, in completion order.
pub fn shortest_paths_batch_keyed(
    graph: &Graph,
    starts: &[NodeId],
    destinations: &NodeSet,
    config: &BatchConfig,
) -> Result<Vec<(NodeId, Path)>> {
    let interval = config.progress_interval;
    match config.threads {
        Some(threads) => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(threads.get())
                .thread_name(|i| format!("routegraph-batch-{i}"))
                .build()?;
            Ok(run_batch(graph, starts, destinations, Some(&pool), interval))
        }
        None => Ok(run_batch(graph, starts, destinations, None, interval)),
    }
}

/// Every batch entry point funnels through here, so each one opens the same
/// span on the calling thread.
#[instrument(
    name = "batch",
    skip_all,
    fields(
        starts = starts.len(),
        destinations = destinations.len(),
        threads = pool.map(ThreadPool::current_num_threads),
    )
)]
fn run_batch(
    graph: &Graph,
    starts: &[NodeId],
    destinations: &NodeSet,
    pool: Option<&ThreadPool>,
    progress_interval: Option<NonZeroUsize>,
) -> Vec<(NodeId, Path)> {
    let search = || search_all(graph, starts, destinations, progress_interval);
    let results = match pool {
        Some(pool) => pool.install(search),
        None => search(),
    };

    let found = results.iter().filter(|(_, path)| !path.is_empty()).count();
    debug!(searched = results.len(), found, "batch complete");
    results
}

fn search_all(
    graph: &Graph,
    starts: &[NodeId],
    destinations: &NodeSet,
    progress_interval: Option<NonZeroUsize>,
) -> Vec<(NodeId, Path)> {
    let results = Mutex::new(Vec::with_capacity(starts.len()));
    let completed = AtomicUsize::new(0);

    starts.par_iter().for_each(|&start| {
        let path = shortest_path(graph, start, destinations);

        // A panic elsewhere cannot leave a half-pushed Vec behind, so a
        // poisoned lock is still safe to append to.
        results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((start, path));

        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(interval) = progress_interval {
            if done % interval.get() == 0 {
                debug!(done, total = starts.len(), "batch progress");
            }
        }
    });

    results
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
