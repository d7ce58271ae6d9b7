use crate::{
    error::{Error, Result},
    graph::Graph,
};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use std::{fmt, mem};

/// A bijection on `0..n`, stored as the image of every vertex.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permutation {
    images: Vec<usize>,
}

impl Permutation {
    pub fn identity(n: usize) -> Self {
        Self {
            images: (0..n).collect(),
        }
    }

    /// Checks that `images` is a bijection on `0..images.len()`.
    pub fn from_images(images: Vec<usize>) -> Result<Self> {
        let mut seen = vec![false; images.len()];
        for &image in &images {
            if image >= images.len() {
                return Err(Error::LabelOutOfRange {
                    label: image,
                    vertex_count: images.len(),
                });
            }
            if mem::replace(&mut seen[image], true) {
                return Err(Error::DuplicateLabel(image));
            }
        }

        Ok(Self { images })
    }

    /// The permutation sending `first[i]` to `second[i]` for every position.
    ///
    /// Both labelings must be bijections of the same length; two leaves with
    /// the same induced graph give an automorphism this way.
    pub(crate) fn between_labelings(first: &[usize], second: &[usize]) -> Self {
        let mut images = vec![0; first.len()];
        for (&from, &to) in first.iter().zip(second) {
            images[from] = to;
        }
        Self { images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[usize] {
        &self.images
    }

    pub fn apply(&self, v: usize) -> usize {
        self.images[v]
    }

    pub fn is_identity(&self) -> bool {
        self.images.iter().enumerate().all(|(v, &image)| v == image)
    }

    pub fn fixes_all(&self, vertices: &[usize]) -> bool {
        vertices.iter().all(|&v| self.images[v] == v)
    }

    /// `self` followed by `other`.
    pub fn then(&self, other: &Self) -> Self {
        Self {
            images: self.images.iter().map(|&v| other.images[v]).collect(),
        }
    }

    pub fn inverse(&self) -> Self {
        let mut images = vec![0; self.images.len()];
        for (v, &image) in self.images.iter().enumerate() {
            images[image] = v;
        }
        Self { images }
    }

    /// True when every edge `(u, v)` maps onto an edge `(p(u), p(v))`.
    pub fn is_automorphism_of(&self, graph: &Graph) -> bool {
        self.images.len() == graph.vertex_count()
            && graph
                .edges()
                .all(|(from, to)| graph.has_edge(self.images[from], self.images[to]))
    }

    /// Disjoint cycles of length at least two, each starting at its smallest
    /// vertex.
    pub fn cycles(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.images.len()];
        let mut cycles = vec![];

        for start in 0..self.images.len() {
            if seen[start] || self.images[start] == start {
                continue;
            }

            let mut cycle = vec![];
            let mut v = start;
            while !seen[v] {
                seen[v] = true;
                cycle.push(v);
                v = self.images[v];
            }
            cycles.push(cycle);
        }

        cycles
    }
}

impl fmt::Debug for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cycles = self.cycles();
        if cycles.is_empty() {
            return write!(f, "()");
        }

        for cycle in cycles {
            write!(f, "(")?;
            for (i, v) in cycle.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{v}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Receives automorphisms as the search discovers them.
///
/// Each distinct automorphism of a call is submitted once. The search keeps
/// its own record and never reads the collector back, so one collector may
/// serve several calls.
pub trait AutomorphismCollector {
    /// Offers a permutation. Returns whether it was kept.
    fn submit(&mut self, perm: Permutation) -> Result<bool>;

    /// Kept permutations in discovery order.
    fn generators(&self) -> &[Permutation];
}

/// The default collector: drops the identity and exact duplicates and keeps
/// everything else in discovery order.
#[derive(Debug, Default, Clone)]
pub struct Generators {
    perms: Vec<Permutation>,
    seen: HashSet<Permutation>,
}

impl Generators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.perms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perms.is_empty()
    }

    pub fn into_vec(self) -> Vec<Permutation> {
        self.perms
    }
}

impl AutomorphismCollector for Generators {
    fn submit(&mut self, perm: Permutation) -> Result<bool> {
        if perm.is_identity() || self.seen.contains(&perm) {
            return Ok(false);
        }

        self.perms.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
        self.seen.try_reserve(1).map_err(|_| Error::OutOfMemory)?;

        self.seen.insert(perm.clone());
        self.perms.push(perm);
        Ok(true)
    }

    fn generators(&self) -> &[Permutation] {
        &self.perms
    }
}

/// Orbits of the group generated by `generators` on `0..n`, given as the
/// smallest vertex of each vertex's orbit.
pub fn orbits<'a>(n: usize, generators: impl IntoIterator<Item = &'a Permutation>) -> Vec<usize> {
    fn find(parent: &mut [usize], mut v: usize) -> usize {
        while parent[v] != v {
            parent[v] = parent[parent[v]];
            v = parent[v];
        }
        v
    }

    let mut parent = (0..n).collect::<Vec<_>>();
    for perm in generators {
        for (v, &image) in perm.images.iter().enumerate() {
            let (a, b) = (find(&mut parent, v), find(&mut parent, image));
            // the smaller root wins so every root is its orbit's minimum
            if a < b {
                parent[b] = a;
            } else if b < a {
                parent[a] = b;
            }
        }
    }

    (0..n).map(|v| find(&mut parent, v)).collect()
}
