use crate::{
    error::{Error, Result},
    graph::Graph,
};
use itertools::Itertools;
use std::{
    collections::{BTreeMap, VecDeque},
    fmt, mem,
};

/// One cell of an ordered partition.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    members: Vec<usize>,
    fixed: bool,
}

impl Cell {
    fn new(mut members: Vec<usize>) -> Self {
        members.sort_unstable();
        let fixed = members.len() == 1;
        Self { members, fixed }
    }

    /// Members in ascending vertex order.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// A fixed cell holds a single vertex and can never split again.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }
}

/// An ordered partition of `0..n` into non-empty cells.
///
/// Cell order carries meaning: the block of canonical positions given to a
/// cell is determined by its place in the sequence, which is how a caller
/// supplied coloring survives canonization.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    cells: Vec<Cell>,
    vertex_count: usize,
}

impl Partition {
    /// The partition with every vertex in one cell.
    pub fn unit(vertex_count: usize) -> Self {
        let cells = if vertex_count == 0 {
            vec![]
        } else {
            vec![Cell::new((0..vertex_count).collect())]
        };

        Self {
            cells,
            vertex_count,
        }
    }

    /// Builds a partition from explicit cells. Empty cells are dropped.
    pub fn from_cells(vertex_count: usize, cells: &[Vec<usize>]) -> Result<Self> {
        let mut seen = vec![false; vertex_count];
        for &v in cells.iter().flatten() {
            if v >= vertex_count {
                return Err(Error::LabelOutOfRange {
                    label: v,
                    vertex_count,
                });
            }
            if mem::replace(&mut seen[v], true) {
                return Err(Error::DuplicateLabel(v));
            }
        }

        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(Error::MissingVertex(missing));
        }

        Ok(Self {
            cells: cells
                .iter()
                .filter(|cell| !cell.is_empty())
                .map(|cell| Cell::new(cell.clone()))
                .collect(),
            vertex_count,
        })
    }

    /// Builds a partition from nauty's `lab`/`ptn` pair, where a zero in
    /// `ptn[i]` marks `lab[i]` as the last member of its cell.
    pub fn from_lab_ptn(vertex_count: usize, lab: &[usize], ptn: &[usize]) -> Result<Self> {
        if lab.len() != vertex_count || ptn.len() != vertex_count {
            return Err(Error::PartitionLengthMismatch {
                lab: lab.len(),
                ptn: ptn.len(),
                vertex_count,
            });
        }
        if ptn.last().is_some_and(|&last| last != 0) {
            return Err(Error::UnterminatedCell);
        }

        let mut cells = vec![];
        let mut current = vec![];
        for (&label, &boundary) in lab.iter().zip(ptn) {
            current.push(label);
            if boundary == 0 {
                cells.push(mem::take(&mut current));
            }
        }

        Self::from_cells(vertex_count, &cells)
    }

    /// One cell per distinct color, cells ordered by color.
    pub fn from_colors<C: Ord>(colors: &[C]) -> Self {
        let mut by_color = BTreeMap::<&C, Vec<usize>>::new();
        for (v, color) in colors.iter().enumerate() {
            by_color.entry(color).or_default().push(v);
        }

        Self {
            cells: by_color.into_values().map(Cell::new).collect(),
            vertex_count: colors.len(),
        }
    }

    /// The inverse of [`Partition::from_lab_ptn`].
    pub fn to_lab_ptn(&self) -> (Vec<usize>, Vec<usize>) {
        let (mut lab, mut ptn) = (
            Vec::with_capacity(self.vertex_count),
            Vec::with_capacity(self.vertex_count),
        );

        for cell in &self.cells {
            for &v in &cell.members {
                lab.push(v);
                ptn.push(1);
            }

            if let Some(last) = ptn.last_mut() {
                *last = 0;
            }
        }

        (lab, ptn)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_fixed(&self, cell: usize) -> bool {
        self.cells[cell].fixed
    }

    pub fn is_discrete(&self) -> bool {
        self.cells.len() == self.vertex_count
    }

    /// Index of the first cell that still has more than one member.
    pub fn target_cell(&self) -> Option<usize> {
        self.cells.iter().position(|cell| !cell.fixed)
    }

    /// Cell sizes in partition order. Equal for partitions related by an
    /// automorphism, so it is safe to compare across search branches.
    pub fn invariant(&self) -> Vec<usize> {
        self.cells.iter().map(Cell::len).collect()
    }

    /// The vertices in partition order. A labeling once the partition is
    /// discrete.
    pub fn labeling(&self) -> Vec<usize> {
        self.cells
            .iter()
            .flat_map(|cell| cell.members.iter().copied())
            .collect()
    }

    /// A copy in which `v` is split off the front of cell `cell`.
    pub fn individualize(&self, cell: usize, v: usize) -> Self {
        let mut copy = self.clone();
        let rest = copy.cells[cell]
            .members
            .iter()
            .copied()
            .filter(|&w| w != v)
            .collect_vec();

        copy.cells[cell] = Cell::new(rest);
        copy.cells.insert(cell, Cell::new(vec![v]));
        copy
    }

    fn cell_index(&self) -> Vec<usize> {
        let mut cell_of = vec![0; self.vertex_count];
        for (i, cell) in self.cells.iter().enumerate() {
            for &v in &cell.members {
                cell_of[v] = i;
            }
        }
        cell_of
    }

    /// Splits cells until the partition is equitable.
    ///
    /// Every cell starts on the work queue. A splitting cell `C` assigns each
    /// vertex the number of its out-neighbors inside `C`, and each cell whose
    /// members disagree is replaced in place by sub-cells in ascending count
    /// order. All new sub-cells except the first largest are queued.
    pub fn refine(&mut self, graph: &Graph) {
        let mut queue = self
            .cells
            .iter()
            .map(|cell| cell.members.clone())
            .collect::<VecDeque<_>>();
        let mut cell_of = self.cell_index();
        let mut counts = vec![0; self.vertex_count];
        let mut touched = vec![];

        while let Some(splitter) = queue.pop_front() {
            if self.is_discrete() {
                break;
            }

            for &w in &splitter {
                for &u in graph.predecessors(w) {
                    if counts[u] == 0 {
                        touched.push(u);
                    }
                    counts[u] += 1;
                }
            }

            let affected = touched
                .iter()
                .map(|&u| cell_of[u])
                .filter(|&i| !self.cells[i].fixed)
                .sorted_unstable()
                .dedup()
                .collect_vec();

            if !affected.is_empty() {
                let mut split = false;
                let mut cells = Vec::with_capacity(self.cells.len() + affected.len());
                let mut affected = affected.into_iter().peekable();

                for (i, cell) in mem::take(&mut self.cells).into_iter().enumerate() {
                    if affected.next_if_eq(&i).is_none() {
                        cells.push(cell);
                        continue;
                    }

                    let parts = split_by_count(cell.members, &counts);
                    if parts.len() > 1 {
                        split = true;

                        let largest = parts.iter().map(Vec::len).max().unwrap_or(0);
                        let skip = parts.iter().position(|part| part.len() == largest);
                        for (j, part) in parts.iter().enumerate() {
                            if Some(j) != skip {
                                queue.push_back(part.clone());
                            }
                        }
                    }

                    cells.extend(parts.into_iter().map(Cell::new));
                }

                self.cells = cells;
                if split {
                    cell_of = self.cell_index();
                }
            }

            for u in touched.drain(..) {
                counts[u] = 0;
            }
        }
    }

    /// True when every two vertices sharing a cell have the same number of
    /// out-neighbors in every cell.
    pub fn is_equitable(&self, graph: &Graph) -> bool {
        let cell_of = self.cell_index();

        self.cells.iter().all(|cell| {
            cell.members
                .iter()
                .map(|&v| {
                    let mut counts = vec![0; self.cells.len()];
                    for &w in graph.neighbors(v) {
                        counts[cell_of[w]] += 1;
                    }
                    counts
                })
                .all_equal()
        })
    }
}

/// Groups `members` by `counts`, ascending.
fn split_by_count(mut members: Vec<usize>, counts: &[usize]) -> Vec<Vec<usize>> {
    members.sort_unstable_by_key(|&v| (counts[v], v));

    let mut parts: Vec<Vec<usize>> = vec![];
    for v in members {
        match parts.last_mut() {
            Some(part) if counts[part[0]] == counts[v] => part.push(v),
            _ => parts.push(vec![v]),
        }
    }
    parts
}

impl fmt::Debug for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]",
            self.cells
                .iter()
                .map(|cell| cell.members.iter().join(" "))
                .join(" | ")
        )
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.members)?;
        if self.fixed {
            write!(f, "*")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(partition: &Partition) -> Vec<Vec<usize>> {
        partition
            .cells()
            .iter()
            .map(|cell| cell.members().to_vec())
            .collect()
    }

    fn cycle(n: usize) -> Graph {
        Graph::from_undirected(n, (0..n).map(|i| (i, (i + 1) % n))).unwrap()
    }

    #[test]
    fn partition_from_lab_ptn() {
        let lab = vec![3, 2, 5, 1, 0, 4, 6, 9, 7, 8];
        let ptn = vec![1, 1, 1, 1, 0, 1, 1, 0, 1, 0];
        let partition = Partition::from_lab_ptn(10, &lab, &ptn).unwrap();

        assert_eq!(
            vec![vec![0, 1, 2, 3, 5], vec![4, 6, 9], vec![7, 8]],
            cells(&partition)
        );

        let (lab, ptn) = partition.to_lab_ptn();
        assert_eq!(vec![0, 1, 2, 3, 5, 4, 6, 9, 7, 8], lab);
        assert_eq!(vec![1, 1, 1, 1, 0, 1, 1, 0, 1, 0], ptn);
    }

    #[test]
    fn partition_rejects_malformed_input() {
        assert_eq!(
            Err(Error::PartitionLengthMismatch {
                lab: 2,
                ptn: 3,
                vertex_count: 3
            }),
            Partition::from_lab_ptn(3, &[0, 1], &[1, 1, 0])
        );
        assert_eq!(
            Err(Error::UnterminatedCell),
            Partition::from_lab_ptn(3, &[0, 1, 2], &[1, 0, 1])
        );
        assert_eq!(
            Err(Error::DuplicateLabel(1)),
            Partition::from_lab_ptn(3, &[0, 1, 1], &[1, 1, 0])
        );
        assert_eq!(
            Err(Error::LabelOutOfRange {
                label: 3,
                vertex_count: 3
            }),
            Partition::from_lab_ptn(3, &[0, 3, 1], &[1, 1, 0])
        );
        assert_eq!(
            Err(Error::MissingVertex(1)),
            Partition::from_cells(3, &[vec![0], vec![2]])
        );
    }

    #[test]
    fn partition_from_colors() {
        let partition = Partition::from_colors(&["red", "blue", "red", "green", "blue"]);

        assert_eq!(vec![vec![1, 4], vec![3], vec![0, 2]], cells(&partition));
        assert!(partition.is_fixed(1));
        assert!(!partition.is_fixed(0));
        assert_eq!(Some(0), partition.target_cell());
    }

    #[test]
    fn partition_individualize() {
        let partition = Partition::unit(4);
        let child = partition.individualize(0, 2);

        assert_eq!(vec![vec![2], vec![0, 1, 3]], cells(&child));
        assert_eq!(vec![1, 3], child.invariant());
        assert_eq!(vec![2, 0, 1, 3], child.labeling());
        // the parent is untouched
        assert_eq!(vec![vec![0, 1, 2, 3]], cells(&partition));
    }

    #[test]
    fn refine_by_degree() {
        let path = Graph::from_undirected(4, [(0, 1), (1, 2), (2, 3)]).unwrap();
        let mut partition = Partition::unit(4);
        partition.refine(&path);

        assert_eq!(vec![vec![0, 3], vec![1, 2]], cells(&partition));
        assert!(partition.is_equitable(&path));

        let star = Graph::from_undirected(4, [(0, 1), (0, 2), (0, 3)]).unwrap();
        let mut partition = Partition::unit(4);
        partition.refine(&star);

        assert_eq!(vec![vec![1, 2, 3], vec![0]], cells(&partition));
    }

    #[test]
    fn refine_regular_graph_is_stable() {
        let graph = cycle(6);
        let mut partition = Partition::unit(6);
        partition.refine(&graph);

        assert_eq!(vec![(0..6).collect_vec()], cells(&partition));
        assert!(partition.is_equitable(&graph));
    }

    #[test]
    fn refine_after_individualization() {
        let graph = cycle(4);
        let mut partition = Partition::unit(4).individualize(0, 0);
        partition.refine(&graph);

        assert_eq!(vec![vec![0], vec![2], vec![1, 3]], cells(&partition));
        assert!(partition.is_equitable(&graph));

        let graph = cycle(6);
        let mut partition = Partition::unit(6).individualize(0, 0);
        partition.refine(&graph);

        assert_eq!(
            vec![vec![0], vec![3], vec![2, 4], vec![1, 5]],
            cells(&partition)
        );
        assert!(partition.is_equitable(&graph));
    }

    #[test]
    fn refine_respects_input_cells() {
        let graph = cycle(4);
        let mut partition = Partition::from_cells(4, &[vec![1, 3], vec![0, 2]]).unwrap();
        partition.refine(&graph);

        assert_eq!(vec![vec![1, 3], vec![0, 2]], cells(&partition));

        let star = Graph::from_undirected(4, [(0, 1), (0, 2), (0, 3)]).unwrap();
        let mut partition = Partition::from_cells(4, &[vec![0, 1], vec![2, 3]]).unwrap();
        partition.refine(&star);

        assert_eq!(vec![vec![1], vec![0], vec![2, 3]], cells(&partition));
    }

    #[test]
    fn refine_counts_self_loops_once() {
        let graph = Graph::new(2, [(0, 0), (0, 0)]).unwrap();
        let mut partition = Partition::unit(2);
        partition.refine(&graph);

        assert_eq!(vec![vec![1], vec![0]], cells(&partition));
    }

    #[test]
    fn empty_partition() {
        let mut partition = Partition::unit(0);
        partition.refine(&Graph::empty(0));

        assert!(partition.is_discrete());
        assert_eq!(None, partition.target_cell());
        assert!(partition.labeling().is_empty());
    }
}
