use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use routegraph_core::{
    int_to_ipv4, load, shortest_path, shortest_paths_batch_keyed, BatchConfig, Graph, NodeId,
    NodeSet, Path,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(
    name = "routegraph-bench",
    about = "Benchmark routegraph-core and find routes over edge-list graphs."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate synthetic topologies and time single vs batch queries.
    Synthetic(SyntheticArgs),
    /// Load an edge list and print shortest routes from sources to destinations.
    Routes(RoutesArgs),
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// Worker threads for batch queries (defaults to the global rayon pool).
    #[arg(long)]
    threads: Option<NonZeroUsize>,

    /// Log batch progress every N completed searches.
    #[arg(long)]
    progress: Option<NonZeroUsize>,
}

impl BatchArgs {
    fn config(&self) -> BatchConfig {
        BatchConfig {
            threads: self.threads,
            progress_interval: self.progress,
        }
    }
}

#[derive(Debug, Args)]
struct SyntheticArgs {
    /// Topology to generate.
    #[arg(long, value_enum, default_value_t = Topology::All)]
    topology: Topology,

    /// Target node count.
    #[arg(long, default_value_t = 1_000_000)]
    nodes: u32,

    /// Number of query sources per topology.
    #[arg(long, default_value_t = 256)]
    sources: usize,

    #[command(flatten)]
    batch: BatchArgs,
}

#[derive(Debug, Args)]
struct RoutesArgs {
    /// Edge list: two endpoints (IPv4 or integer) per line.
    edges: PathBuf,

    /// Source groups, `NAME=ep,ep,...` or `ep,ep,...`; repeatable.
    #[arg(long = "src", required = true, num_args = 1..)]
    sources: Vec<EndpointGroup>,

    /// Destination groups in the same form. Every source group is routed to
    /// every destination group except one sharing its name, and each source
    /// goes to the nearest endpoint of the group.
    #[arg(long = "dst", required = true, num_args = 1..)]
    destinations: Vec<EndpointGroup>,

    /// Print each route as a JSON object instead of an arrow-separated line.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    batch: BatchArgs,
}

/// Endpoints routed together, optionally under a region name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EndpointGroup {
    name: Option<String>,
    nodes: Vec<NodeId>,
}

impl EndpointGroup {
    fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => {
                let endpoints: Vec<String> = self.nodes.iter().map(|&n| int_to_ipv4(n)).collect();
                endpoints.join(",")
            }
        }
    }

    /// Anonymous groups never match, so they are routed to everything.
    fn shares_name_with(&self, other: &EndpointGroup) -> bool {
        self.name.is_some() && self.name == other.name
    }
}

impl FromStr for EndpointGroup {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> Result<Self> {
        let (name, list) = match text.split_once('=') {
            Some((name, list)) => {
                let name = name.trim();
                if name.is_empty() {
                    bail!("empty group name in `{text}`");
                }
                (Some(name.to_owned()), list)
            }
            None => (None, text),
        };
        let nodes = list
            .split(',')
            .map(str::trim)
            .map(|token| load::parse_node(token).with_context(|| format!("bad endpoint `{token}`")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { name, nodes })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Topology {
    All,
    Lsystem,
    Scalefree,
    Smallworld,
    Random,
    Barbell,
}

type Generator = fn(u32) -> Graph;

impl Topology {
    fn generators(self) -> Vec<(&'static str, Generator)> {
        let all: [(Topology, &'static str, Generator); 5] = [
            (Topology::Lsystem, "L-system tree", gen_lsystem),
            (Topology::Scalefree, "Scale-free (edge sampling)", gen_scale_free),
            (Topology::Smallworld, "Small-world (Watts-Strogatz)", gen_small_world),
            (Topology::Random, "Erdos-Renyi random", gen_random),
            (Topology::Barbell, "Barbell (clique-bridge-clique)", gen_barbell),
        ];
        all.into_iter()
            .filter(|(t, _, _)| self == Topology::All || *t == self)
            .map(|(_, name, generator)| (name, generator))
            .collect()
    }
}

fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Synthetic(args) => run_synthetic(&args),
        Command::Routes(args) => run_routes(&args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("command failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_synthetic(args: &SyntheticArgs) -> Result<()> {
    anyhow::ensure!(args.nodes >= 32, "--nodes must be at least 32");

    println!("routegraph-bench");
    println!("================");
    println!();

    for (name, generator) in args.topology.generators() {
        run_benchmark(name, generator, args)?;
    }
    Ok(())
}

fn run_benchmark(name: &str, generator: Generator, args: &SyntheticArgs) -> Result<()> {
    println!("--- {} ---", name);
    println!("Target: {} nodes", args.nodes);

    let t = Instant::now();
    let graph = generator(args.nodes);
    let gen_time = t.elapsed();
    println!(
        "Generated in {:.2}s, {} nodes, {} edges, ~{:.0}MB",
        gen_time.as_secs_f64(),
        graph.node_count(),
        graph.edge_count(),
        graph.memory_usage() as f64 / 1_048_576.0
    );

    // Destinations: the highest ids, typically the far end of the generator.
    let last = args.nodes - 1;
    let destinations: NodeSet = [last, last - 1, last / 2].into_iter().collect();

    let mut rng = FastRng::new(2024);
    let starts: Vec<NodeId> = (0..args.sources)
        .map(|_| rng.next(u64::from(args.nodes)) as NodeId)
        .collect();

    let t = Instant::now();
    let mut sequential: Vec<Path> = starts
        .iter()
        .map(|&s| shortest_path(&graph, s, &destinations))
        .collect();
    let seq_time = t.elapsed();

    let t = Instant::now();
    let keyed = shortest_paths_batch_keyed(&graph, &starts, &destinations, &args.batch.config())
        .context("batch query failed")?;
    let batch_time = t.elapsed();

    let mut batched: Vec<Path> = keyed.into_iter().map(|(_, path)| path).collect();
    sequential.sort();
    batched.sort();
    if sequential != batched {
        warn!(topology = name, "batch results differ from sequential results");
    }

    let found: Vec<&Path> = batched.iter().filter(|p| !p.is_empty()).collect();
    let avg_hops = if found.is_empty() {
        0.0
    } else {
        found.iter().map(|p| (p.len() - 1) as f64).sum::<f64>() / found.len() as f64
    };

    println!();
    println!("{:>12} {:>10} {:>10} {:>12}", "mode", "queries", "found", "time");
    println!("{:->12} {:->10} {:->10} {:->12}", "", "", "", "");
    println!(
        "{:>12} {:>10} {:>10} {:>10.1}ms",
        "sequential",
        starts.len(),
        found.len(),
        seq_time.as_secs_f64() * 1000.0
    );
    println!(
        "{:>12} {:>10} {:>10} {:>10.1}ms",
        "batch",
        starts.len(),
        found.len(),
        batch_time.as_secs_f64() * 1000.0
    );
    println!(
        "Average hops {:.2}, speedup {:.2}x",
        avg_hops,
        seq_time.as_secs_f64() / batch_time.as_secs_f64().max(f64::EPSILON)
    );
    println!();
    Ok(())
}

fn run_routes(args: &RoutesArgs) -> Result<()> {
    let graph = load::load_edge_file(&args.edges)
        .with_context(|| format!("failed to load {}", args.edges.display()))?;
    let config = args.batch.config();

    let t = Instant::now();
    let (mut found, mut searched) = (0usize, 0usize);
    for (src, dst) in route_pairs(&args.sources, &args.destinations) {
        let (src_label, dst_label) = (src.label(), dst.label());
        let destinations: NodeSet = dst.nodes.iter().copied().collect();
        info!(
            src = %src_label,
            dst = %dst_label,
            sources = src.nodes.len(),
            destinations = destinations.len(),
            "finding routes"
        );

        let routes = shortest_paths_batch_keyed(&graph, &src.nodes, &destinations, &config)
            .with_context(|| format!("batch query {src_label} -> {dst_label} failed"))?;
        searched += routes.len();

        if !args.json {
            println!("# {src_label} -> {dst_label}");
        }
        for (_, path) in routes.iter().filter(|(_, path)| !path.is_empty()) {
            let hops: Vec<String> = path.iter().map(|&node| int_to_ipv4(node)).collect();
            if args.json {
                let line = serde_json::json!({ "src": src_label, "dst": dst_label, "hops": hops });
                println!("{line}");
            } else {
                println!("{}", hops.join(" -> "));
            }
            found += 1;
        }
    }

    info!(found, searched, elapsed_ms = t.elapsed().as_millis() as u64, "routes complete");
    Ok(())
}

/// Every source group against every destination group, skipping a region
/// routed to itself.
fn route_pairs<'a>(
    sources: &'a [EndpointGroup],
    destinations: &'a [EndpointGroup],
) -> impl Iterator<Item = (&'a EndpointGroup, &'a EndpointGroup)> {
    sources
        .iter()
        .flat_map(move |src| destinations.iter().map(move |dst| (src, dst)))
        .filter(|(src, dst)| !src.shares_name_with(dst))
}

// ---------------------------------------------------------------------------
// Generators: deterministic, single-threaded, O(n + edges)
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Ternary tree: deep paths with exponential width.
fn gen_lsystem(node_count: u32) -> Graph {
    let mut graph = Graph::with_capacity(node_count as usize);
    let branching = 3u32;

    let mut next_id: u32 = 1;
    let mut frontier: Vec<u32> = vec![0];

    while next_id < node_count && !frontier.is_empty() {
        let mut next_frontier = Vec::with_capacity(frontier.len() * branching as usize);
        for &parent in &frontier {
            for _ in 0..branching {
                if next_id >= node_count {
                    break;
                }
                graph.add_edge(parent, next_id);
                next_frontier.push(next_id);
                next_id += 1;
            }
        }
        frontier = next_frontier;
    }

    graph
}

/// Preferential attachment by sampling endpoints of existing edges, so
/// well-connected nodes attract more links (router-level hub structure).
fn gen_scale_free(node_count: u32) -> Graph {
    let edges_per_node = 4u32;
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(12345);
    let mut endpoints: Vec<u32> = Vec::with_capacity(node_count as usize * edges_per_node as usize * 2);

    let seed = 5u32;
    for i in 0..seed {
        for j in (i + 1)..seed {
            graph.add_edge(i, j);
            endpoints.extend([i, j]);
        }
    }

    for new_node in seed..node_count {
        for _ in 0..edges_per_node.min(new_node) {
            let target = endpoints[rng.next(endpoints.len() as u64) as usize];
            if target != new_node {
                graph.add_edge(new_node, target);
                endpoints.extend([new_node, target]);
            }
        }
    }

    graph
}

/// Watts-Strogatz ring lattice with a small rewiring probability.
fn gen_small_world(node_count: u32) -> Graph {
    let k = 5u32;
    let p = 0.05f64;
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(67890);

    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = (i + j) % node_count;
            if rng.next_f64() < p {
                let rewired = rng.next(u64::from(node_count)) as u32;
                graph.add_edge(i, if rewired != i { rewired } else { neighbor });
            } else {
                graph.add_edge(i, neighbor);
            }
        }
    }

    graph
}

/// Erdos-Renyi style: ~4 uniform random edges per node, may leave isolated
/// nodes and small islands behind.
fn gen_random(node_count: u32) -> Graph {
    let target_edges = u64::from(node_count) * 4;
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(54321);

    for _ in 0..target_edges {
        let u = rng.next(u64::from(node_count)) as u32;
        let v = rng.next(u64::from(node_count)) as u32;
        if u != v {
            graph.add_edge(u, v);
        }
    }

    graph
}

/// Two random dense clusters joined by a thin chain of bridge nodes.
fn gen_barbell(node_count: u32) -> Graph {
    let bridge_len = 10u32;
    let cluster = (node_count - bridge_len) / 2;
    let mut graph = Graph::with_capacity(node_count as usize);
    let mut rng = FastRng::new(99999);

    let mut wire_cluster = |graph: &mut Graph, offset: u32| {
        for i in 0..cluster {
            for _ in 0..8u32.min(cluster - 1) {
                let target = rng.next(u64::from(cluster)) as u32;
                if target != i {
                    graph.add_edge(offset + i, offset + target);
                }
            }
        }
    };

    wire_cluster(&mut graph, 0);

    // Bridge: chain from the last node of A through to the first node of B.
    let b_start = cluster + bridge_len;
    for id in cluster..=b_start {
        graph.add_edge(id - 1, id);
    }

    wire_cluster(&mut graph, b_start);

    graph
}
