//! Generic A* search over a frozen [`WeightedGraph`].

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

use crate::{Edge, GraphError, NodeId, WeightedGraph};

/// Frontier entry ordered so that the binary heap pops the lowest weight.
///
/// Ties pop in an arbitrary order; callers must not rely on tie-breaking.
#[derive(Debug)]
struct WeightedNode {
    node: NodeId,
    weight: u64,
}

impl PartialEq for WeightedNode {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight
    }
}

impl Eq for WeightedNode {}

impl PartialOrd for WeightedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WeightedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other.weight.cmp(&self.weight)
    }
}

/// Errors surfaced by [`find_path`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchError {
    /// No route connects the start node to the goal node.
    NoPath,
    /// A node handle presented to the search did not belong to the graph.
    Graph(GraphError),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPath => write!(f, "no path connects the start node to the goal node"),
            Self::Graph(error) => write!(f, "graph rejected the search query: {error}"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoPath => None,
            Self::Graph(error) => Some(error),
        }
    }
}

impl From<GraphError> for SearchError {
    fn from(error: GraphError) -> Self {
        Self::Graph(error)
    }
}

/// Finds the cheapest route from `start` to `goal`, returning the ordered
/// edge sequence traversed.
///
/// The heuristic receives the values carried by a candidate node and the goal
/// node and must never overestimate the true remaining cost; admissibility is
/// the caller's obligation and is not validated here. A `start` equal to
/// `goal` resolves to the empty path.
///
/// Complexity is `O((V + E) log V)` with the binary-heap frontier, which is
/// comfortable for both the world grid and the planner's small graphs.
///
/// # Errors
///
/// Fails with [`SearchError::NoPath`] when the goal is unreachable, or with
/// [`SearchError::Graph`] when either handle is foreign to the graph.
pub fn find_path<'g, N, E, H>(
    start: NodeId,
    goal: NodeId,
    graph: &'g WeightedGraph<N, E>,
    heuristic: H,
) -> Result<Vec<&'g Edge<E>>, SearchError>
where
    H: Fn(&N, &N) -> u64,
{
    let goal_value = graph.value(goal)?;

    let mut frontier = BinaryHeap::new();
    frontier.push(WeightedNode {
        node: start,
        weight: 0,
    });

    let mut accumulated_cost: HashMap<NodeId, u64> = HashMap::new();
    let _ = accumulated_cost.insert(start, 0);
    let mut via: HashMap<NodeId, &'g Edge<E>> = HashMap::new();

    while let Some(current) = frontier.pop() {
        if current.node == goal {
            break;
        }

        let current_cost = accumulated_cost[&current.node];
        for edge in graph.edges_from(current.node)? {
            let neighbor = edge.to();
            let new_cost = current_cost.saturating_add(edge.cost());
            let improved = match accumulated_cost.get(&neighbor) {
                None => true,
                Some(&known) => new_cost < known,
            };
            if improved {
                let _ = accumulated_cost.insert(neighbor, new_cost);
                let _ = via.insert(neighbor, edge);
                let estimate = heuristic(graph.value(neighbor)?, goal_value);
                frontier.push(WeightedNode {
                    node: neighbor,
                    weight: new_cost.saturating_add(estimate),
                });
            }
        }
    }

    reconstruct(start, goal, &via)
}

fn reconstruct<'g, E>(
    start: NodeId,
    goal: NodeId,
    via: &HashMap<NodeId, &'g Edge<E>>,
) -> Result<Vec<&'g Edge<E>>, SearchError> {
    let mut route = Vec::new();
    let mut current = goal;
    while current != start {
        let edge = via.get(&current).ok_or(SearchError::NoPath)?;
        route.push(*edge);
        current = edge.from();
    }
    route.reverse();
    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::{find_path, SearchError};
    use crate::{DirectedGraphBuilder, GraphError, NodeId, UndirectedGraphBuilder, WeightedGraph};

    fn no_heuristic(_: &&str, _: &&str) -> u64 {
        0
    }

    /// Exhaustive shortest-path cost by uniform-cost expansion, used as the
    /// optimality oracle for the A* tests.
    fn dijkstra_cost(graph: &WeightedGraph<&str, &str>, start: NodeId, goal: NodeId) -> Option<u64> {
        let mut best: std::collections::HashMap<NodeId, u64> = std::collections::HashMap::new();
        let _ = best.insert(start, 0);
        let mut pending = vec![start];
        while let Some(node) = pending.pop() {
            let base = best[&node];
            for edge in graph.edges_from(node).expect("node belongs to graph") {
                let candidate = base + edge.cost();
                if best.get(&edge.to()).map_or(true, |&known| candidate < known) {
                    let _ = best.insert(edge.to(), candidate);
                    pending.push(edge.to());
                }
            }
        }
        best.get(&goal).copied()
    }

    #[test]
    fn search_finds_the_cheapest_route_not_the_shortest_hop_count() {
        // Direct hop costs 10; the two-hop detour costs 4.
        let mut builder = DirectedGraphBuilder::new();
        let a = builder.add_node("a");
        let b = builder.add_node("b");
        let c = builder.add_node("c");
        builder.connect(a, c, "direct", 10);
        builder.connect(a, b, "out", 2);
        builder.connect(b, c, "in", 2);
        let graph = builder.build();

        let route = find_path(a, c, &graph, no_heuristic).expect("route exists");
        let labels: Vec<&str> = route.iter().map(|edge| *edge.label()).collect();
        assert_eq!(labels, vec!["out", "in"]);

        let cost: u64 = route.iter().map(|edge| edge.cost()).sum();
        assert_eq!(Some(cost), dijkstra_cost(&graph, a, c));
    }

    #[test]
    fn admissible_heuristic_preserves_optimality() {
        // Grid-ish diamond where the heuristic favours the wrong branch
        // unless the algorithm keeps expanding by f = g + h.
        let mut builder = UndirectedGraphBuilder::new();
        let a = builder.add_node("a");
        let b = builder.add_node("b");
        let c = builder.add_node("c");
        let d = builder.add_node("d");
        builder.connect(a, b, "ab", "ba", 1);
        builder.connect(b, d, "bd", "db", 5);
        builder.connect(a, c, "ac", "ca", 2);
        builder.connect(c, d, "cd", "dc", 1);
        let graph = builder.build();

        // Admissible: never more than the true remaining cost (3 via c).
        let heuristic = |_: &&str, _: &&str| 1;
        let route = find_path(a, d, &graph, heuristic).expect("route exists");
        let cost: u64 = route.iter().map(|edge| edge.cost()).sum();
        assert_eq!(Some(cost), dijkstra_cost(&graph, a, d));
        assert_eq!(cost, 3);
    }

    #[test]
    fn unreachable_goal_reports_no_path() {
        let mut builder = DirectedGraphBuilder::new();
        let a = builder.add_node("a");
        let b = builder.add_node("b");
        let c = builder.add_node("c");
        builder.connect(a, b, "ab", 1);
        // c has no incoming edges.
        let graph = builder.build();

        assert_eq!(
            find_path(a, c, &graph, no_heuristic).unwrap_err(),
            SearchError::NoPath,
            "a partial route must never be returned",
        );
    }

    #[test]
    fn edges_pointing_the_wrong_way_do_not_connect() {
        let mut builder = DirectedGraphBuilder::new();
        let a = builder.add_node("a");
        let b = builder.add_node("b");
        builder.connect(b, a, "ba", 1);
        let graph = builder.build();

        assert_eq!(
            find_path(a, b, &graph, no_heuristic).unwrap_err(),
            SearchError::NoPath
        );
    }

    #[test]
    fn start_equal_to_goal_yields_the_empty_route() {
        let mut builder = DirectedGraphBuilder::<&str, &str>::new();
        let a = builder.add_node("a");
        let graph = builder.build();

        let route = find_path(a, a, &graph, no_heuristic).expect("zero-length route");
        assert!(route.is_empty());
    }

    #[test]
    fn parallel_edges_compete_on_their_own_costs() {
        let mut builder = DirectedGraphBuilder::new();
        let a = builder.add_node("a");
        let b = builder.add_node("b");
        builder.connect(a, b, "slow", 9);
        builder.connect(a, b, "fast", 2);
        let graph = builder.build();

        let route = find_path(a, b, &graph, no_heuristic).expect("route exists");
        assert_eq!(route.len(), 1);
        assert_eq!(*route[0].label(), "fast");
    }

    #[test]
    fn foreign_start_node_is_rejected() {
        let mut builder = DirectedGraphBuilder::<&str, &str>::new();
        let a = builder.add_node("a");
        let graph = builder.build();

        let mut other = DirectedGraphBuilder::<&str, &str>::new();
        let stranger = other.add_node("s");

        assert_eq!(
            find_path(stranger, a, &graph, no_heuristic).unwrap_err(),
            SearchError::Graph(GraphError::ForeignNode)
        );
    }
}
