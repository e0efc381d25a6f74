#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable weighted graphs and the generic A* search that runs over them.
//!
//! Graphs are assembled through a builder, frozen by `build`, and read-only
//! afterwards. Node handles are opaque: identity is the handle itself, never
//! the carried value, so two nodes holding equal values remain distinct. The
//! planner relies on this to keep repeated effects apart in its search space.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

mod search;

pub use search::{find_path, SearchError};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

fn allocate_graph_id() -> u64 {
    NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed)
}

/// Opaque handle identifying a node within the graph that minted it.
///
/// Handles carry the identity of their owning graph; presenting a handle to
/// any other graph fails with [`GraphError::ForeignNode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    graph: u64,
    index: u32,
}

impl NodeId {
    const fn new(graph: u64, index: u32) -> Self {
        Self { graph, index }
    }
}

/// Directed connection between two nodes, carrying a label and a cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge<E> {
    from: NodeId,
    to: NodeId,
    label: E,
    cost: u64,
}

impl<E> Edge<E> {
    /// Node the edge leaves from.
    #[must_use]
    pub const fn from(&self) -> NodeId {
        self.from
    }

    /// Node the edge arrives at.
    #[must_use]
    pub const fn to(&self) -> NodeId {
        self.to
    }

    /// Label carried by the edge.
    #[must_use]
    pub const fn label(&self) -> &E {
        &self.label
    }

    /// Traversal cost of the edge.
    #[must_use]
    pub const fn cost(&self) -> u64 {
        self.cost
    }
}

/// Immutable graph mapping each node to its outgoing edge set.
///
/// Invariant: every edge's endpoints belong to this graph. Queries against a
/// handle minted elsewhere surface [`GraphError::ForeignNode`] instead of an
/// empty answer.
#[derive(Clone, Debug)]
pub struct WeightedGraph<N, E> {
    id: u64,
    values: Vec<N>,
    outgoing: Vec<Vec<Edge<E>>>,
}

impl<N, E> WeightedGraph<N, E> {
    /// Number of nodes held by the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.values.len()
    }

    /// Reports whether the handle was minted by this graph.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        node.graph == self.id && (node.index as usize) < self.values.len()
    }

    /// Value carried by the provided node.
    ///
    /// # Errors
    ///
    /// Fails when the handle belongs to a different graph.
    pub fn value(&self, node: NodeId) -> Result<&N, GraphError> {
        self.assert_owned(node)?;
        Ok(&self.values[node.index as usize])
    }

    /// Outgoing edges of the provided node.
    ///
    /// # Errors
    ///
    /// Fails when the handle belongs to a different graph.
    pub fn edges_from(&self, node: NodeId) -> Result<&[Edge<E>], GraphError> {
        self.assert_owned(node)?;
        Ok(&self.outgoing[node.index as usize])
    }

    /// Cost of the direct edge from `start` to `end`.
    ///
    /// When parallel edges connect the pair, the cheapest is reported.
    ///
    /// # Errors
    ///
    /// Fails when either handle is foreign, or when no direct edge connects
    /// the pair.
    pub fn cost(&self, start: NodeId, end: NodeId) -> Result<u64, GraphError> {
        self.assert_owned(start)?;
        self.assert_owned(end)?;
        self.outgoing[start.index as usize]
            .iter()
            .filter(|edge| edge.to == end)
            .map(Edge::cost)
            .min()
            .ok_or(GraphError::MissingEdge)
    }

    /// Finds the first node carrying a value equal to the argument.
    ///
    /// A linear scan intended for small bootstrap lookups, not for hot search
    /// loops; callers that query repeatedly should keep their own lookup
    /// table keyed by value.
    #[must_use]
    pub fn node_by_value(&self, value: &N) -> Option<NodeId>
    where
        N: PartialEq,
    {
        self.values
            .iter()
            .position(|candidate| candidate == value)
            .map(|index| NodeId::new(self.id, index as u32))
    }

    fn assert_owned(&self, node: NodeId) -> Result<(), GraphError> {
        if !self.contains(node) {
            return Err(GraphError::ForeignNode);
        }
        Ok(())
    }
}

/// Errors surfaced by graph queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// The provided node handle was minted by a different graph.
    ForeignNode,
    /// No direct edge connects the queried pair of nodes.
    MissingEdge,
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForeignNode => write!(f, "this graph does not contain the provided node"),
            Self::MissingEdge => write!(f, "no direct edge connects the provided nodes"),
        }
    }
}

impl std::error::Error for GraphError {}

/// Builder assembling a directed graph; each `connect` records one edge.
#[derive(Debug)]
pub struct DirectedGraphBuilder<N, E> {
    id: u64,
    values: Vec<N>,
    outgoing: Vec<Vec<Edge<E>>>,
}

impl<N, E> DirectedGraphBuilder<N, E> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: allocate_graph_id(),
            values: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Adds a node carrying the provided value, returning its fresh handle.
    pub fn add_node(&mut self, value: N) -> NodeId {
        mint_node(self.id, &mut self.values, &mut self.outgoing, value)
    }

    /// Records a directed edge from `a` to `b`.
    ///
    /// # Panics
    ///
    /// Panics when either handle was not minted by this builder; connecting
    /// foreign nodes is a programming error and fails fast.
    pub fn connect(&mut self, a: NodeId, b: NodeId, label: E, cost: u64) {
        assert_minted_here(self.id, self.values.len(), a);
        assert_minted_here(self.id, self.values.len(), b);
        self.outgoing[a.index as usize].push(Edge {
            from: a,
            to: b,
            label,
            cost,
        });
    }

    /// Freezes the builder into an immutable graph.
    #[must_use]
    pub fn build(self) -> WeightedGraph<N, E> {
        WeightedGraph {
            id: self.id,
            values: self.values,
            outgoing: self.outgoing,
        }
    }
}

impl<N, E> Default for DirectedGraphBuilder<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder assembling an undirected graph; each `connect` records the edge
/// pair covering both directions.
#[derive(Debug)]
pub struct UndirectedGraphBuilder<N, E> {
    id: u64,
    values: Vec<N>,
    outgoing: Vec<Vec<Edge<E>>>,
}

impl<N, E> UndirectedGraphBuilder<N, E> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: allocate_graph_id(),
            values: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Adds a node carrying the provided value, returning its fresh handle.
    pub fn add_node(&mut self, value: N) -> NodeId {
        mint_node(self.id, &mut self.values, &mut self.outgoing, value)
    }

    /// Records the edge pair connecting `a` and `b` in both directions.
    ///
    /// `label_ab` labels the edge leaving `a`; `label_ba` labels the edge
    /// leaving `b`. Both share the provided cost.
    ///
    /// # Panics
    ///
    /// Panics when either handle was not minted by this builder; connecting
    /// foreign nodes is a programming error and fails fast.
    pub fn connect(&mut self, a: NodeId, b: NodeId, label_ab: E, label_ba: E, cost: u64) {
        assert_minted_here(self.id, self.values.len(), a);
        assert_minted_here(self.id, self.values.len(), b);
        self.outgoing[a.index as usize].push(Edge {
            from: a,
            to: b,
            label: label_ab,
            cost,
        });
        self.outgoing[b.index as usize].push(Edge {
            from: b,
            to: a,
            label: label_ba,
            cost,
        });
    }

    /// Freezes the builder into an immutable graph.
    #[must_use]
    pub fn build(self) -> WeightedGraph<N, E> {
        WeightedGraph {
            id: self.id,
            values: self.values,
            outgoing: self.outgoing,
        }
    }
}

impl<N, E> Default for UndirectedGraphBuilder<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

fn mint_node<N, E>(
    id: u64,
    values: &mut Vec<N>,
    outgoing: &mut Vec<Vec<Edge<E>>>,
    value: N,
) -> NodeId {
    let index = u32::try_from(values.len()).expect("graph exceeds u32 node capacity");
    values.push(value);
    outgoing.push(Vec::new());
    NodeId::new(id, index)
}

fn assert_minted_here(id: u64, node_count: usize, node: NodeId) {
    assert!(
        node.graph == id && (node.index as usize) < node_count,
        "cannot connect a node that was not minted by this builder",
    );
}
