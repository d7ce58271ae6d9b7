use crate::{
    automorphism::{self, Permutation},
    error::Result,
    graph::Graph,
    search::SearchStats,
};
use bimap::BiBTreeMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The result of canonizing a graph.
///
/// `labeling()[i]` is the input vertex placed at canonical position `i`, and
/// every generator maps input vertices to input vertices. Both use the
/// indexing of the graph that was canonized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalForm {
    labeling: Vec<usize>,
    generators: Vec<Permutation>,
    orbits: Vec<usize>,
    group_order: f64,
    stats: SearchStats,
}

impl CanonicalForm {
    pub(crate) fn new(
        labeling: Vec<usize>,
        generators: Vec<Permutation>,
        group_order: f64,
        stats: SearchStats,
    ) -> Self {
        let orbits = automorphism::orbits(labeling.len(), &generators);

        Self {
            labeling,
            generators,
            orbits,
            group_order,
            stats,
        }
    }

    pub fn labeling(&self) -> &[usize] {
        &self.labeling
    }

    pub fn generator_count(&self) -> usize {
        self.generators.len()
    }

    pub fn generators(&self) -> &[Permutation] {
        &self.generators
    }

    pub fn into_generators(self) -> Vec<Permutation> {
        self.generators
    }

    /// For every vertex, the smallest vertex in its orbit.
    pub fn orbits(&self) -> &[usize] {
        &self.orbits
    }

    pub fn orbit_count(&self) -> usize {
        self.orbits
            .iter()
            .enumerate()
            .filter(|&(v, &root)| v == root)
            .count()
    }

    /// Order of the automorphism group, approximate once it leaves the exact
    /// range of an `f64`.
    pub fn group_order(&self) -> f64 {
        self.group_order
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Canonical position on the left, input vertex on the right.
    pub fn relabeling(&self) -> BiBTreeMap<usize, usize> {
        self.labeling.iter().copied().enumerate().collect()
    }

    /// Canonical position of every input vertex.
    pub fn positions(&self) -> Vec<usize> {
        let mut positions = vec![0; self.labeling.len()];
        for (i, &v) in self.labeling.iter().enumerate() {
            positions[v] = i;
        }
        positions
    }

    /// The canonical isomorph of `graph`, which must be the graph this form
    /// was computed from. Isomorphic inputs give equal results.
    pub fn canonical_graph(&self, graph: &Graph) -> Result<Graph> {
        graph.permuted(&self.positions())
    }

    /// Adjacency matrix of the canonical isomorph, for display.
    pub fn matrix(&self, graph: &Graph) -> Result<CanonMatrix> {
        let canonical = self.canonical_graph(graph)?;
        let n = canonical.vertex_count();

        Ok(CanonMatrix {
            rows: (0..n)
                .map(|from| (0..n).map(|to| canonical.has_edge(from, to)).collect_vec())
                .collect(),
        })
    }
}

pub struct CanonMatrix {
    rows: Vec<Vec<bool>>,
}

impl CanonMatrix {
    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }
}

impl fmt::Debug for CanonMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (from, row) in self.rows.iter().enumerate() {
            for &edge in row {
                if edge {
                    write!(f, "| __ ")?;
                } else {
                    write!(f, "|    ")?;
                }
            }
            writeln!(f, "| {from:02}")?;
        }

        for i in 0..self.rows.len() {
            write!(f, "| {i:02} ")?;
        }
        write!(f, "|")
    }
}
