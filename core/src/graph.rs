use std::collections::{BTreeSet, HashMap, HashSet};

/// Node identifier. Usually a packed IPv4 address, see [`crate::ipv4`].
pub type NodeId = u32;

/// Destination set handed to path queries.
pub type NodeSet = HashSet<NodeId>;

static NO_NEIGHBORS: BTreeSet<NodeId> = BTreeSet::new();

/// In-memory undirected graph: node → set of adjacent nodes.
///
/// Adjacency is kept symmetric: `add_edge(u, v)` records v under u and u
/// under v. Nodes only exist once they have at least one edge.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: HashMap<NodeId, BTreeSet<NodeId>>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            adjacency: HashMap::new(),
        }
    }

    /// Pre-allocate for a known node count.
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            adjacency: HashMap::with_capacity(node_count),
        }
    }

    /// Reserve room for at least `additional` more nodes.
    pub fn reserve(&mut self, additional: usize) {
        self.adjacency.reserve(additional);
    }

    /// Add an undirected edge. Inserting an existing edge is a no-op.
    ///
    /// `u == v` is accepted and records the node as its own neighbor.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) {
        self.adjacency.entry(u).or_default().insert(v);
        self.adjacency.entry(v).or_default().insert(u);
    }

    /// Bulk load from an iterator of `(u, v)` pairs.
    pub fn load_edges<I>(&mut self, edges: I)
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let edges = edges.into_iter();
        let (lower, _) = edges.size_hint();
        self.reserve(lower);
        for (u, v) in edges {
            self.add_edge(u, v);
        }
    }

    /// Neighbors of `node`, ascending. Unknown nodes have none.
    pub fn neighbors(&self, node: NodeId) -> &BTreeSet<NodeId> {
        self.adjacency.get(&node).unwrap_or(&NO_NEIGHBORS)
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    /// Iterate known node identifiers in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges. A self-loop counts once.
    pub fn edge_count(&self) -> usize {
        let (entries, self_loops) = self
            .adjacency
            .iter()
            .fold((0usize, 0usize), |(entries, loops), (node, set)| {
                (entries + set.len(), loops + usize::from(set.contains(node)))
            });
        (entries + self_loops) / 2
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        // BTreeMap/BTreeSet nodes carry roughly 2x payload in overhead.
        let nodes_mem =
            self.adjacency.capacity() * (size_of::<NodeId>() + size_of::<BTreeSet<NodeId>>() + 8);
        let neighbor_mem: usize = self
            .adjacency
            .values()
            .map(|set| set.len() * size_of::<NodeId>() * 3)
            .sum();

        nodes_mem + neighbor_mem
    }
}
