use crate::error::{Error, Result};
use itertools::Itertools;
use petgraph::{
    EdgeType,
    graph::IndexType,
    visit::EdgeRef,
};
use std::fmt;

/// An immutable simple graph on the vertices `0..n`.
///
/// Edges are directed pairs. Repeated pairs collapse into one edge and a
/// self-loop counts once towards every neighbor count. Undirected graphs are
/// stored with both directions of every edge.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Graph {
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
    edge_count: usize,
}

impl Graph {
    /// Builds a graph from directed edges, rejecting endpoints outside `0..n`.
    pub fn new(vertex_count: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Result<Self> {
        let mut successors = vec![Vec::new(); vertex_count];
        let mut predecessors = vec![Vec::new(); vertex_count];

        for (from, to) in edges {
            if from >= vertex_count || to >= vertex_count {
                return Err(Error::EdgeOutOfRange {
                    from,
                    to,
                    vertex_count,
                });
            }

            successors[from].push(to);
            predecessors[to].push(from);
        }

        let mut edge_count = 0;
        for list in successors.iter_mut().chain(predecessors.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }
        for list in &successors {
            edge_count += list.len();
        }

        Ok(Self {
            successors,
            predecessors,
            edge_count,
        })
    }

    /// Builds a graph containing both directions of every given pair.
    pub fn from_undirected(
        vertex_count: usize,
        edges: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self> {
        Self::new(
            vertex_count,
            edges.into_iter().flat_map(|(u, v)| [(u, v), (v, u)]),
        )
    }

    /// A graph with no edges.
    pub fn empty(vertex_count: usize) -> Self {
        Self {
            successors: vec![Vec::new(); vertex_count],
            predecessors: vec![Vec::new(); vertex_count],
            edge_count: 0,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.successors.len()
    }

    /// Number of directed edges, so an undirected edge counts twice.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Out-neighbors of `v` in ascending order.
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.successors[v]
    }

    /// In-neighbors of `v` in ascending order.
    pub fn predecessors(&self, v: usize) -> &[usize] {
        &self.predecessors[v]
    }

    pub fn degree(&self, v: usize) -> usize {
        self.successors[v].len()
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.successors
            .get(from)
            .is_some_and(|list| list.binary_search(&to).is_ok())
    }

    /// All directed edges, ordered by source then target.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(from, list)| list.iter().map(move |&to| (from, to)))
    }

    /// True when every edge has its reverse.
    pub fn is_symmetric(&self) -> bool {
        self.edges().all(|(from, to)| self.has_edge(to, from))
    }

    /// Relabels every edge `(u, v)` as `(perm[u], perm[v])`.
    pub fn permuted(&self, perm: &[usize]) -> Result<Self> {
        if perm.len() != self.vertex_count() {
            return Err(Error::PermutationLength {
                found: perm.len(),
                expected: self.vertex_count(),
            });
        }

        Self::new(
            self.vertex_count(),
            self.edges().map(|(from, to)| (perm[from], perm[to])),
        )
    }
}

impl<N, E, Ty: EdgeType, Ix: IndexType> From<&petgraph::Graph<N, E, Ty, Ix>> for Graph {
    fn from(value: &petgraph::Graph<N, E, Ty, Ix>) -> Self {
        let edges = value
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index()))
            .collect_vec();

        // petgraph only hands out indices below node_count
        let graph = if value.is_directed() {
            Self::new(value.node_count(), edges)
        } else {
            Self::from_undirected(value.node_count(), edges)
        };

        graph.unwrap_or_else(|_| Self::empty(value.node_count()))
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (v, list) in self.successors.iter().enumerate() {
            writeln!(f, "{v:02}: {list:?}")?;
        }
        Ok(())
    }
}
