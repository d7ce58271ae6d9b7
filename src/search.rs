//! Depth-first individualization-refinement search.
//!
//! Every node of the search tree is an equitable partition. Inner nodes
//! individualize each vertex of their first non-singleton cell in turn, and
//! leaves are discrete partitions, i.e. labelings. Leaves are ranked by the
//! sequence of cell-size invariants along their path and then by the graph
//! they induce, and the greatest one is canonical. Two leaves inducing the same
//! graph differ by an automorphism.

use crate::{
    automorphism::{self, AutomorphismCollector, Permutation},
    error::{Error, Result},
    graph::Graph,
    options::Options,
    partition::Partition,
};
use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Counters describing how much of the search tree was visited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchStats {
    pub nodes: usize,
    pub leaves: usize,
    pub pruned: usize,
}

pub(crate) struct SearchOutcome {
    pub labeling: Vec<usize>,
    pub generators: Vec<Permutation>,
    pub group_order: f64,
    pub stats: SearchStats,
}

/// Edges renamed to canonical positions, sorted.
type InducedGraph = Vec<(usize, usize)>;

struct Leaf {
    labeling: Vec<usize>,
    path: Vec<usize>,
}

struct Best {
    invariants: Vec<Vec<usize>>,
    graph: InducedGraph,
    labeling: Vec<usize>,
}

enum Flow {
    Continue,
    /// Unwind to the node at this depth, which resumes with its next child.
    Backjump(usize),
}

pub(crate) struct Search<'a, C: AutomorphismCollector> {
    graph: &'a Graph,
    options: &'a Options,
    collector: &'a mut C,
    /// Automorphisms found by this search, in discovery order. Orbit pruning
    /// and the group order only ever look at these.
    found: Vec<Permutation>,
    seen: HashSet<Permutation>,
    /// Individualized vertices from the root to the current node.
    path: Vec<usize>,
    /// Partition invariants from the root to the current node.
    invariants: Vec<Vec<usize>>,
    first: Option<Vec<Vec<usize>>>,
    first_labeling: Option<Vec<usize>>,
    best: Option<Best>,
    leaves: HashMap<InducedGraph, Leaf>,
    group_order: f64,
    stats: SearchStats,
}

impl<'a, C: AutomorphismCollector> Search<'a, C> {
    pub(crate) fn new(graph: &'a Graph, options: &'a Options, collector: &'a mut C) -> Self {
        Self {
            graph,
            options,
            collector,
            found: vec![],
            seen: HashSet::new(),
            path: vec![],
            invariants: vec![],
            first: None,
            first_labeling: None,
            best: None,
            leaves: HashMap::new(),
            group_order: 1.0,
            stats: SearchStats::default(),
        }
    }

    pub(crate) fn run(mut self, mut partition: Partition) -> Result<SearchOutcome> {
        partition.refine(self.graph);
        self.visit(partition)?;

        debug!(
            "search finished: {} nodes, {} leaves, {} pruned, {} generators, group order {}",
            self.stats.nodes,
            self.stats.leaves,
            self.stats.pruned,
            self.found.len(),
            self.group_order
        );

        let labeling = match (self.best, self.first_labeling) {
            (Some(best), _) => best.labeling,
            (None, Some(first)) => first,
            (None, None) => vec![],
        };

        Ok(SearchOutcome {
            labeling,
            generators: self.found,
            group_order: self.group_order,
            stats: self.stats,
        })
    }

    fn visit(&mut self, partition: Partition) -> Result<Flow> {
        self.stats.nodes += 1;
        self.invariants.push(partition.invariant());
        let flow = self.expand(partition);
        self.invariants.pop();
        flow
    }

    fn expand(&mut self, partition: Partition) -> Result<Flow> {
        if self.options.prune && self.cannot_improve() {
            self.stats.pruned += 1;
            return Ok(Flow::Continue);
        }

        let Some(target) = partition.target_cell() else {
            return self.leaf(&partition);
        };

        let depth = self.path.len();
        let on_first_path = self.first.is_none();
        let cell = partition.cells()[target].members().to_vec();
        let mut explored = Vec::with_capacity(cell.len());

        for &v in &cell {
            if self.options.prune && self.equivalent_to_explored(v, &explored) {
                self.stats.pruned += 1;
                continue;
            }
            explored.push(v);

            let mut child = partition.individualize(target, v);
            child.refine(self.graph);

            self.path.push(v);
            let flow = self.visit(child)?;
            self.path.pop();

            if let Flow::Backjump(level) = flow {
                if level < depth {
                    return Ok(flow);
                }
            }
        }

        // every automorphism fixing this node maps the first child into this orbit
        if on_first_path {
            let orbits = self.stabilizer_orbits();
            let orbit = orbits.iter().filter(|&&o| o == orbits[cell[0]]).count();
            self.group_order *= orbit as f64;
        }

        Ok(Flow::Continue)
    }

    fn leaf(&mut self, partition: &Partition) -> Result<Flow> {
        self.stats.leaves += 1;

        let labeling = partition.labeling();
        let induced = self.induced_graph(&labeling);

        if self.first.is_none() {
            self.first = Some(self.invariants.clone());
            self.first_labeling = Some(labeling.clone());
        }

        if let Some(stored) = self.leaves.get(&induced) {
            let perm = Permutation::between_labelings(&stored.labeling, &labeling);
            let common = stored
                .path
                .iter()
                .zip(&self.path)
                .take_while(|(a, b)| a == b)
                .count();

            trace!("leaf {:?} matches leaf {:?}: {perm:?}", self.path, stored.path);
            self.record(perm)?;

            return Ok(if self.options.prune {
                Flow::Backjump(common)
            } else {
                Flow::Continue
            });
        }

        if self.options.get_canon {
            let better = self.best.as_ref().is_none_or(|best| {
                (self.invariants.as_slice(), induced.as_slice())
                    > (best.invariants.as_slice(), best.graph.as_slice())
            });

            if better {
                trace!("new best leaf at path {:?}", self.path);
                self.best = Some(Best {
                    invariants: self.invariants.clone(),
                    graph: induced.clone(),
                    labeling: labeling.clone(),
                });
            }
        }

        self.leaves.insert(
            induced,
            Leaf {
                labeling,
                path: self.path.clone(),
            },
        );

        Ok(Flow::Continue)
    }

    /// Keeps a newly found automorphism and hands it to the collector.
    fn record(&mut self, perm: Permutation) -> Result<()> {
        if perm.is_identity() || self.seen.contains(&perm) {
            return Ok(());
        }

        self.found.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
        self.seen.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
        self.seen.insert(perm.clone());
        self.found.push(perm.clone());

        let kept = self.collector.submit(perm)?;
        debug!(
            "generator {} found at depth {} (kept by collector: {kept})",
            self.found.len(),
            self.path.len()
        );
        Ok(())
    }

    /// True when no leaf below the current node can be canonical or
    /// equivalent to the first leaf.
    fn cannot_improve(&self) -> bool {
        let Some(first) = &self.first else {
            return false;
        };

        let depth = self.invariants.len();
        let current = self.invariants.as_slice();
        if current == &first[..depth.min(first.len())] {
            return false;
        }

        if !self.options.get_canon {
            return true;
        }

        self.best
            .as_ref()
            .is_some_and(|best| current < &best.invariants[..depth.min(best.invariants.len())])
    }

    /// Orbits of the found automorphisms that fix the current path pointwise.
    fn stabilizer_orbits(&self) -> Vec<usize> {
        automorphism::orbits(
            self.graph.vertex_count(),
            self.found
                .iter()
                .filter(|perm| perm.fixes_all(&self.path)),
        )
    }

    fn equivalent_to_explored(&self, v: usize, explored: &[usize]) -> bool {
        if explored.is_empty() {
            return false;
        }

        let orbits = self.stabilizer_orbits();
        explored.iter().any(|&u| orbits[u] == orbits[v])
    }

    fn induced_graph(&self, labeling: &[usize]) -> InducedGraph {
        let mut position = vec![0; labeling.len()];
        for (i, &v) in labeling.iter().enumerate() {
            position[v] = i;
        }

        self.graph
            .edges()
            .map(|(from, to)| (position[from], position[to]))
            .sorted_unstable()
            .collect()
    }
}
