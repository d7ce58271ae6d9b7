//! Reference backend over nauty itself (<https://pallini.di.uniroma1.it/>),
//! compiled with the `nauty` feature and used to cross-check the search.

use crate::{graph::Graph, partition::Partition};
use nauty_Traces_sys::*;
use std::{ffi::c_int, ptr};

// Field layout follows graph-canon (https://crates.io/crates/graph-canon).
pub const OPTIONS: optionblk = optionblk {
    getcanon: 1,
    digraph: FALSE,
    writeautoms: FALSE,
    writemarkers: FALSE,
    // caller partitions carry the colors
    defaultptn: FALSE,
    cartesian: FALSE,
    linelength: 0,
    outfile: ptr::null_mut(),
    userrefproc: None,
    userautomproc: None,
    userlevelproc: None,
    usernodeproc: None,
    usercanonproc: None,
    invarproc: None,
    tc_level: 0,
    mininvarlevel: 0,
    maxinvarlevel: 1,
    invararg: 0,
    dispatch: &raw mut dispatch_graph,
    schreier: FALSE,
    extra_options: ptr::null_mut(),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseGraph {
    pub graph: Vec<setword>,
    pub labels: Vec<c_int>,
    pub partition: Vec<c_int>,
    pub set_word_count: usize,
    pub vertex_count: usize,
    pub digraph: bool,
}

/// What nauty reports for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct NautyResult {
    pub canonical: Vec<setword>,
    pub labeling: Vec<usize>,
    pub group_order: f64,
}

impl DenseGraph {
    pub fn new(value: &Graph, partition: &Partition) -> Self {
        let vertex_count = value.vertex_count();
        let set_word_count = SETWORDSNEEDED(vertex_count);
        let mut graph = empty_graph(set_word_count, vertex_count);
        let word = WORDSIZE as usize;

        for (from, to) in value.edges() {
            graph[from * set_word_count + to / word] |= 1 << (word - 1 - to % word);
        }

        let (lab, ptn) = partition.to_lab_ptn();

        Self {
            graph,
            labels: lab.into_iter().map(|v| v as c_int).collect(),
            partition: ptn.into_iter().map(|p| p as c_int).collect(),
            set_word_count,
            vertex_count,
            digraph: !value.is_symmetric(),
        }
    }

    pub fn run(&mut self) -> NautyResult {
        if self.vertex_count == 0 {
            return NautyResult {
                canonical: vec![],
                labeling: vec![],
                group_order: 1.0,
            };
        }

        let mut options = OPTIONS;
        options.digraph = if self.digraph { TRUE } else { FALSE };

        let mut canonical = empty_graph(self.set_word_count, self.vertex_count);
        let mut orbits = vec![0; self.vertex_count];
        let mut stats = statsblk::default();

        unsafe {
            densenauty(
                self.graph.as_mut_ptr(),
                self.labels.as_mut_ptr(),
                self.partition.as_mut_ptr(),
                orbits.as_mut_ptr(),
                &mut options,
                &mut stats,
                self.set_word_count as c_int,
                self.vertex_count as c_int,
                canonical.as_mut_ptr(),
            )
        }

        NautyResult {
            canonical,
            labeling: self.labels.iter().map(|&v| v as usize).collect(),
            group_order: stats.grpsize1 * 10f64.powi(stats.grpsize2),
        }
    }
}
