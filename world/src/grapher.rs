//! Cached traversal graph kept in sync with the world's geometry.

use std::collections::{HashMap, HashSet};
use std::fmt;

use islander_core::{Coordinates, Dimensions, Direction, Event};
use islander_graph::{find_path, NodeId, SearchError, UndirectedGraphBuilder, WeightedGraph};

/// Neighbour offsets guaranteed to be already visited during the row-major
/// rebuild sweep; the opposite half of the compass is implied by the reverse
/// edges the undirected builder records.
const SWEEP_NEIGHBOURS: [Direction; 4] = [
    Direction::West,
    Direction::South,
    Direction::Southwest,
    Direction::Southeast,
];

/// Event-fed cache translating world geometry into a traversal graph.
///
/// Mutation notifications only mark the cache dirty; the graph is rebuilt
/// wholesale by the first query that observes the dirty flag, amortising
/// every mutation in an event batch into a single rebuild. Queries take
/// `&mut self` so that mutation and query funnel through one serialization
/// point and a query can never observe a half-rebuilt graph.
#[derive(Debug)]
pub struct Grapher {
    dimensions: Option<Dimensions>,
    obstacles: HashSet<Coordinates>,
    dirty: bool,
    graph: WeightedGraph<Coordinates, Direction>,
    nodes_by_cell: HashMap<Coordinates, NodeId>,
}

impl Default for Grapher {
    fn default() -> Self {
        Self::new()
    }
}

impl Grapher {
    /// Creates an empty cache awaiting its first `WorldResized` event.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dimensions: None,
            obstacles: HashSet::new(),
            dirty: true,
            graph: UndirectedGraphBuilder::new().build(),
            nodes_by_cell: HashMap::new(),
        }
    }

    /// Folds world events into the cached geometry, deferring the rebuild.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WorldResized { dimensions } => {
                    self.dimensions = Some(*dimensions);
                    self.dirty = true;
                }
                Event::WallBuilt { location } => {
                    let _ = self.obstacles.insert(*location);
                    self.dirty = true;
                }
                Event::WallDestroyed { location } => {
                    let _ = self.obstacles.remove(location);
                    self.dirty = true;
                }
                _ => {}
            }
        }
    }

    /// Reports whether the coordinate is a traversable cell of the world.
    ///
    /// Obstacle cells and cells outside the current bounds are absent from
    /// the graph entirely, so reachability reduces to node presence.
    #[must_use]
    pub fn is_reachable(&mut self, coordinates: Coordinates) -> bool {
        self.ensure_clean();
        self.nodes_by_cell.contains_key(&coordinates)
    }

    /// Finds the direction sequence leading from `start` to `end`.
    ///
    /// An `end` equal to `start` resolves to the empty sequence.
    ///
    /// # Errors
    ///
    /// Fails with [`NoRoute`] when either endpoint is missing from the graph
    /// or when no route connects the pair.
    pub fn find_path_between(
        &mut self,
        start: Coordinates,
        end: Coordinates,
    ) -> Result<Vec<Direction>, NoRoute> {
        self.ensure_clean();

        let Some(&start_node) = self.nodes_by_cell.get(&start) else {
            return Err(NoRoute::MissingStart { start });
        };
        let Some(&end_node) = self.nodes_by_cell.get(&end) else {
            return Err(NoRoute::MissingEnd { end });
        };

        // Manhattan distance stays admissible here: diagonal edges cost the
        // same as orthogonal ones, so the estimate never exceeds the true
        // remaining cost.
        let heuristic =
            |a: &Coordinates, b: &Coordinates| Coordinates::manhattan_distance(*a, *b);

        match find_path(start_node, end_node, &self.graph, heuristic) {
            Ok(route) => Ok(route.iter().map(|edge| *edge.label()).collect()),
            Err(SearchError::NoPath) => Err(NoRoute::Disconnected { start, end }),
            Err(SearchError::Graph(error)) => {
                // Both handles come from this cache's own lookup table, so
                // the graph refusing them indicates a bug inside the cache.
                panic!("world graph rejected its own node handles: {error}");
            }
        }
    }

    fn ensure_clean(&mut self) {
        if self.dirty {
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        let mut builder = UndirectedGraphBuilder::new();
        self.nodes_by_cell.clear();

        if let Some(dimensions) = self.dimensions {
            for y in 0..dimensions.height() {
                for x in 0..dimensions.width() {
                    let cell = Coordinates::new(x, y);
                    if self.obstacles.contains(&cell) {
                        continue;
                    }

                    let node = builder.add_node(cell);
                    for direction in SWEEP_NEIGHBOURS {
                        let Some(neighbour) = cell.step(direction) else {
                            continue;
                        };
                        if let Some(&neighbour_node) = self.nodes_by_cell.get(&neighbour) {
                            builder.connect(neighbour_node, node, direction.inverse(), direction, 1);
                        }
                    }
                    let _ = self.nodes_by_cell.insert(cell, node);
                }
            }
        }

        self.graph = builder.build();
        self.dirty = false;
    }
}

/// Failure answering a routing query against the world graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoRoute {
    /// The start coordinate is not a traversable cell of the world.
    MissingStart {
        /// Requested start coordinate.
        start: Coordinates,
    },
    /// The end coordinate is not a traversable cell of the world.
    MissingEnd {
        /// Requested end coordinate.
        end: Coordinates,
    },
    /// Both endpoints exist but no route connects them.
    Disconnected {
        /// Requested start coordinate.
        start: Coordinates,
        /// Requested end coordinate.
        end: Coordinates,
    },
}

impl fmt::Display for NoRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStart { start } => {
                write!(
                    f,
                    "cannot route from ({}, {}): not a traversable cell",
                    start.x(),
                    start.y()
                )
            }
            Self::MissingEnd { end } => {
                write!(
                    f,
                    "cannot route to ({}, {}): not a traversable cell",
                    end.x(),
                    end.y()
                )
            }
            Self::Disconnected { start, end } => {
                write!(
                    f,
                    "no route connects ({}, {}) to ({}, {})",
                    start.x(),
                    start.y(),
                    end.x(),
                    end.y()
                )
            }
        }
    }
}

impl std::error::Error for NoRoute {}

#[cfg(test)]
mod tests {
    use super::{Grapher, NoRoute};
    use islander_core::{Coordinates, Dimensions, Direction, Event};

    fn resized(width: u32, height: u32) -> Event {
        Event::WorldResized {
            dimensions: Dimensions::new(width, height).expect("positive extents"),
        }
    }

    fn wall_built(x: u32, y: u32) -> Event {
        Event::WallBuilt {
            location: Coordinates::new(x, y),
        }
    }

    fn walk(start: Coordinates, route: &[Direction]) -> Coordinates {
        route.iter().fold(start, |cell, direction| {
            cell.step(*direction).expect("route stays inside the quadrant")
        })
    }

    #[test]
    fn open_grid_crosses_on_the_diagonal() {
        let mut grapher = Grapher::new();
        grapher.observe(&[resized(3, 3)]);

        let start = Coordinates::new(0, 0);
        let end = Coordinates::new(2, 2);
        let route = grapher.find_path_between(start, end).expect("route exists");

        assert_eq!(route, vec![Direction::Northeast, Direction::Northeast]);
        assert_eq!(walk(start, &route), end);
    }

    #[test]
    fn routes_detour_around_obstacles() {
        let mut grapher = Grapher::new();
        grapher.observe(&[resized(3, 3), wall_built(1, 1)]);

        let start = Coordinates::new(0, 0);
        let end = Coordinates::new(2, 2);
        let route = grapher.find_path_between(start, end).expect("route exists");

        let mut cell = start;
        for direction in &route {
            cell = cell.step(*direction).expect("route stays inside the quadrant");
            assert_ne!(
                cell,
                Coordinates::new(1, 1),
                "route must never pass through the wall",
            );
        }
        assert_eq!(cell, end);
    }

    #[test]
    fn walking_a_route_lands_exactly_on_the_destination() {
        let mut grapher = Grapher::new();
        grapher.observe(&[resized(6, 4), wall_built(2, 1), wall_built(2, 2)]);

        let start = Coordinates::new(0, 2);
        let end = Coordinates::new(5, 0);
        let route = grapher.find_path_between(start, end).expect("route exists");
        assert_eq!(walk(start, &route), end);
    }

    #[test]
    fn obstacles_are_absent_from_the_graph() {
        let mut grapher = Grapher::new();
        grapher.observe(&[resized(3, 3), wall_built(1, 1)]);

        assert!(!grapher.is_reachable(Coordinates::new(1, 1)));
        assert!(grapher.is_reachable(Coordinates::new(1, 0)));
        assert!(!grapher.is_reachable(Coordinates::new(3, 0)), "outside bounds");
    }

    #[test]
    fn destroying_a_wall_restores_the_cell() {
        let mut grapher = Grapher::new();
        grapher.observe(&[resized(3, 3), wall_built(1, 1)]);
        assert!(!grapher.is_reachable(Coordinates::new(1, 1)));

        grapher.observe(&[Event::WallDestroyed {
            location: Coordinates::new(1, 1),
        }]);
        assert!(grapher.is_reachable(Coordinates::new(1, 1)));
    }

    #[test]
    fn queries_without_mutations_reuse_the_built_graph() {
        let mut grapher = Grapher::new();
        grapher.observe(&[resized(3, 3)]);

        let start = Coordinates::new(0, 0);
        let end = Coordinates::new(2, 2);
        let first = grapher.find_path_between(start, end).expect("route exists");
        assert!(!grapher.dirty, "first query must clear the dirty flag");

        let second = grapher.find_path_between(start, end).expect("route exists");
        assert_eq!(first, second);
        assert!(!grapher.dirty);
    }

    #[test]
    fn shrinking_the_world_drops_out_of_bounds_cells() {
        let mut grapher = Grapher::new();
        grapher.observe(&[resized(10, 10), wall_built(7, 7)]);
        assert!(grapher.is_reachable(Coordinates::new(9, 9)));

        grapher.observe(&[
            Event::WallDestroyed {
                location: Coordinates::new(7, 7),
            },
            resized(5, 5),
        ]);
        assert!(!grapher.is_reachable(Coordinates::new(9, 9)));
        assert!(!grapher.is_reachable(Coordinates::new(7, 7)));
        assert!(grapher.is_reachable(Coordinates::new(4, 4)));
    }

    #[test]
    fn sealed_regions_are_unroutable() {
        let mut grapher = Grapher::new();
        // Wall off the north-east corner of a 4x4 grid.
        grapher.observe(&[
            resized(4, 4),
            wall_built(2, 3),
            wall_built(2, 2),
            wall_built(3, 2),
        ]);

        let start = Coordinates::new(0, 0);
        let end = Coordinates::new(3, 3);
        assert_eq!(
            grapher.find_path_between(start, end),
            Err(NoRoute::Disconnected { start, end }),
        );
    }

    #[test]
    fn missing_endpoints_are_reported_distinctly() {
        let mut grapher = Grapher::new();
        grapher.observe(&[resized(3, 3), wall_built(0, 0)]);

        let wall = Coordinates::new(0, 0);
        let open = Coordinates::new(2, 2);
        assert_eq!(
            grapher.find_path_between(wall, open),
            Err(NoRoute::MissingStart { start: wall }),
        );
        assert_eq!(
            grapher.find_path_between(open, wall),
            Err(NoRoute::MissingEnd { end: wall }),
        );
    }

    #[test]
    fn routing_to_the_current_cell_is_empty() {
        let mut grapher = Grapher::new();
        grapher.observe(&[resized(3, 3)]);

        let cell = Coordinates::new(1, 1);
        assert_eq!(grapher.find_path_between(cell, cell), Ok(Vec::new()));
    }
}
