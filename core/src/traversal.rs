use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::graph::{Graph, NodeId, NodeSet};

/// Hop count along a path.
///
/// Shortest paths are simple, so a hop count is bounded by the number of
/// distinct `u32` identifiers; `u64` leaves relaxation (`d + 1`) no room to
/// overflow.
pub type Distance = u64;

/// Node sequence from the start to the reached destination, both inclusive.
/// Empty when no destination is reachable.
pub type Path = Vec<NodeId>;

/// Shortest path from `start` to the nearest member of `destinations`.
///
/// Uniform-cost search over unit-weight edges, which yields hop-count shortest
/// paths (BFS order). The frontier is keyed by `(distance, node)`, so among
/// equally near destinations the smallest identifier wins; callers should
/// accept any minimum-length path.
///
/// Returns `[start]` when `start` is itself a destination, and an empty path
/// when no destination is reachable (including an unknown `start`).
pub fn shortest_path(graph: &Graph, start: NodeId, destinations: &NodeSet) -> Path {
    if destinations.contains(&start) {
        return vec![start];
    }

    // Absent from `distances` means infinite.
    let mut distances: HashMap<NodeId, Distance> = HashMap::new();
    let mut previous: HashMap<NodeId, NodeId> = HashMap::new();
    let mut frontier: BinaryHeap<Reverse<(Distance, NodeId)>> = BinaryHeap::new();

    distances.insert(start, 0);
    frontier.push(Reverse((0, start)));

    while let Some(Reverse((distance, current))) = frontier.pop() {
        // Stale entry: a shorter route to `current` was already settled.
        if distances.get(&current).is_some_and(|&best| distance > best) {
            continue;
        }

        if destinations.contains(&current) {
            return reconstruct_path(&previous, start, current);
        }

        let next = distance + 1;
        for &neighbor in graph.neighbors(current) {
            let improves = distances.get(&neighbor).map_or(true, |&known| next < known);
            if improves {
                distances.insert(neighbor, next);
                previous.insert(neighbor, current);
                frontier.push(Reverse((next, neighbor)));
            }
        }
    }

    Vec::new()
}

/// Hop count from `start` to its nearest destination, or `None` if none is
/// reachable.
pub fn hop_distance(graph: &Graph, start: NodeId, destinations: &NodeSet) -> Option<Distance> {
    let path = shortest_path(graph, start, destinations);
    path.len().checked_sub(1).map(|hops| hops as Distance)
}

/// Walk predecessor links from `target` back to `start`.
fn reconstruct_path(previous: &HashMap<NodeId, NodeId>, start: NodeId, target: NodeId) -> Path {
    let mut path = vec![target];
    let mut current = target;

    while current != start {
        match previous.get(&current) {
            Some(&parent) => {
                path.push(parent);
                current = parent;
            }
            None => break,
        }
    }

    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn set(ids: &[NodeId]) -> NodeSet {
        ids.iter().copied().collect()
    }

    fn make_chain(n: NodeId) -> Graph {
        let mut g = Graph::new();
        g.load_edges((0..n - 1).map(|i| (i, i + 1)));
        g
    }

    fn make_cycle(n: NodeId) -> Graph {
        let mut g = Graph::new();
        g.load_edges((0..n).map(|i| (i, (i + 1) % n)));
        g
    }

    fn assert_valid_path(g: &Graph, path: &[NodeId], start: NodeId, destinations: &NodeSet) {
        assert_eq!(path.first(), Some(&start));
        assert!(destinations.contains(path.last().unwrap()));
        for pair in path.windows(2) {
            assert!(
                g.neighbors(pair[0]).contains(&pair[1]),
                "{} -> {} is not an edge",
                pair[0],
                pair[1]
            );
        }
    }

    /// Plain BFS hop count to the nearest destination.
    fn bfs_oracle(g: &Graph, start: NodeId, destinations: &NodeSet) -> Option<usize> {
        let mut seen = NodeSet::new();
        let mut queue = VecDeque::from([(start, 0usize)]);
        seen.insert(start);
        while let Some((node, depth)) = queue.pop_front() {
            if destinations.contains(&node) {
                return Some(depth);
            }
            for &n in g.neighbors(node) {
                if seen.insert(n) {
                    queue.push_back((n, depth + 1));
                }
            }
        }
        None
    }

    #[test]
    fn test_shortest_path_chain() {
        let g = make_chain(6);
        let path = shortest_path(&g, 0, &set(&[5]));
        assert_eq!(path, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_shortest_path_start_is_destination() {
        let g = make_chain(3);
        assert_eq!(shortest_path(&g, 1, &set(&[1, 2])), vec![1]);
    }

    #[test]
    fn test_shortest_path_unknown_start_in_destinations() {
        let g = make_chain(3);
        assert_eq!(shortest_path(&g, 999, &set(&[999])), vec![999]);
    }

    #[test]
    fn test_shortest_path_unknown_start() {
        let g = make_chain(3);
        assert!(shortest_path(&g, 999, &set(&[0])).is_empty());
    }

    #[test]
    fn test_shortest_path_unknown_destination() {
        let g = make_chain(3);
        assert!(shortest_path(&g, 0, &set(&[999])).is_empty());
    }

    #[test]
    fn test_shortest_path_empty_destinations() {
        let g = make_chain(3);
        assert!(shortest_path(&g, 0, &NodeSet::new()).is_empty());
    }

    #[test]
    fn test_shortest_path_disconnected_component() {
        let mut g = make_chain(4);
        g.load_edges([(10, 11), (11, 12)]);
        assert!(shortest_path(&g, 0, &set(&[12])).is_empty());
        assert!(shortest_path(&g, 12, &set(&[0, 3])).is_empty());
        assert_eq!(shortest_path(&g, 10, &set(&[12])), vec![10, 11, 12]);
    }

    #[test]
    fn test_shortest_path_picks_nearest_destination() {
        let g = make_chain(10);
        let path = shortest_path(&g, 4, &set(&[0, 6, 9]));
        assert_eq!(path, vec![4, 5, 6]);
    }

    #[test]
    fn test_shortest_path_cycle() {
        let g = make_cycle(6);
        let path = shortest_path(&g, 0, &set(&[3]));
        assert_eq!(path.len(), 4);
        assert_valid_path(&g, &path, 0, &set(&[3]));
    }

    #[test]
    fn test_shortest_path_self_loop_ignored() {
        let mut g = make_chain(3);
        g.add_edge(1, 1);
        assert_eq!(shortest_path(&g, 0, &set(&[2])), vec![0, 1, 2]);
    }

    #[test]
    fn test_shortest_path_equal_length_alternatives() {
        let mut g = Graph::new();
        g.load_edges([(1, 2), (2, 3), (3, 4), (1, 5), (5, 4)]);
        let destinations = set(&[4]);
        let path = shortest_path(&g, 1, &destinations);
        assert_eq!(path.len(), 3);
        assert_valid_path(&g, &path, 1, &destinations);
    }

    #[test]
    fn test_exhausted_frontier_never_returns_non_destination() {
        // Start reaches 1 and 2 but the destination lives elsewhere.
        let mut g = Graph::new();
        g.load_edges([(0, 1), (1, 2), (50, 51)]);
        assert!(shortest_path(&g, 0, &set(&[51])).is_empty());
    }

    #[rstest]
    #[case(0, &[5], Some(5))]
    #[case(2, &[2], Some(0))]
    #[case(0, &[3, 1], Some(1))]
    #[case(0, &[42], None)]
    fn test_hop_distance(
        #[case] start: NodeId,
        #[case] destinations: &[NodeId],
        #[case] expected: Option<Distance>,
    ) {
        let g = make_chain(6);
        assert_eq!(hop_distance(&g, start, &set(destinations)), expected);
    }

    #[test]
    fn test_long_chain() {
        let g = make_chain(20_000);
        assert_eq!(hop_distance(&g, 0, &set(&[19_999])), Some(19_999));
    }

    fn small_graph() -> impl Strategy<Value = Vec<(NodeId, NodeId)>> {
        prop::collection::vec((0u32..24, 0u32..24), 0..60)
    }

    proptest! {
        #[test]
        fn path_matches_bfs_oracle(
            edges in small_graph(),
            start in 0u32..24,
            destinations in prop::collection::hash_set(0u32..24, 1..4),
        ) {
            let mut g = Graph::new();
            g.load_edges(edges);
            let path = shortest_path(&g, start, &destinations);

            match bfs_oracle(&g, start, &destinations) {
                None => prop_assert!(path.is_empty()),
                Some(hops) => {
                    prop_assert_eq!(path.len(), hops + 1);
                    prop_assert_eq!(path[0], start);
                    prop_assert!(destinations.contains(path.last().unwrap()));
                    for pair in path.windows(2) {
                        prop_assert!(g.neighbors(pair[0]).contains(&pair[1]));
                    }
                }
            }
        }
    }
}
