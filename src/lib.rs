//! Canonical labeling and automorphism group generators for simple graphs,
//! computed by individualization and refinement in the manner of nauty.
//!
//! ```
//! use canonlab::{canonize_simple, graph::Graph};
//!
//! let square = Graph::from_undirected(4, [(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
//! let form = canonize_simple(&square).unwrap();
//!
//! assert_eq!(8.0, form.group_order());
//! assert!(form.generators().iter().all(|perm| perm.is_automorphism_of(&square)));
//! ```

use crate::{
    automorphism::{AutomorphismCollector, Generators},
    canon_output::CanonicalForm,
    error::{Error, Result},
    graph::Graph,
    options::Options,
    partition::Partition,
    search::Search,
};
use log::debug;

pub mod automorphism;
pub mod canon_output;
pub mod error;
pub mod graph;
#[cfg(feature = "nauty")]
pub mod nauty;
pub mod options;
pub mod partition;
pub mod search;

/// Canonizes `graph` starting from the partition described by nauty's
/// `lab`/`ptn` pair, where `ptn[i] == 0` ends the cell containing `lab[i]`.
///
/// Malformed input is rejected before any searching happens.
pub fn canonize(graph: &Graph, lab: &[usize], ptn: &[usize], options: &Options) -> Result<CanonicalForm> {
    let partition = if options.default_partition {
        Partition::unit(graph.vertex_count())
    } else {
        Partition::from_lab_ptn(graph.vertex_count(), lab, ptn)?
    };

    canonize_with_partition(graph, partition, options)
}

/// Canonizes `graph` starting from an already built partition.
pub fn canonize_with_partition(
    graph: &Graph,
    partition: Partition,
    options: &Options,
) -> Result<CanonicalForm> {
    let mut generators = Generators::new();
    canonize_with(graph, partition, options, &mut generators)
}

/// Canonizes `graph`, handing every automorphism found to `collector`.
///
/// The collector only receives automorphisms. The returned form lists the
/// generators found by this call, whatever the collector held before or
/// chose to keep.
pub fn canonize_with<C: AutomorphismCollector>(
    graph: &Graph,
    partition: Partition,
    options: &Options,
    collector: &mut C,
) -> Result<CanonicalForm> {
    if partition.vertex_count() != graph.vertex_count() {
        return Err(Error::PartitionLengthMismatch {
            lab: partition.vertex_count(),
            ptn: partition.vertex_count(),
            vertex_count: graph.vertex_count(),
        });
    }

    let partition = if options.default_partition {
        Partition::unit(graph.vertex_count())
    } else {
        partition
    };

    debug!(
        "canonizing {} vertices, {} edges, {} initial cells",
        graph.vertex_count(),
        graph.edge_count(),
        partition.cells().len()
    );

    let outcome = Search::new(graph, options, collector).run(partition)?;

    Ok(CanonicalForm::new(
        outcome.labeling,
        outcome.generators,
        outcome.group_order,
        outcome.stats,
    ))
}

/// Canonizes an uncolored graph with the default options.
pub fn canonize_simple(graph: &Graph) -> Result<CanonicalForm> {
    canonize_with_partition(graph, Partition::unit(graph.vertex_count()), &Options::default())
}

/// Canonizes a vertex-colored graph. Automorphisms preserve colors and
/// vertices are placed in color order.
pub fn canonize_colored<C: Ord>(graph: &Graph, colors: &[C]) -> Result<CanonicalForm> {
    if colors.len() != graph.vertex_count() {
        return Err(Error::PartitionLengthMismatch {
            lab: colors.len(),
            ptn: colors.len(),
            vertex_count: graph.vertex_count(),
        });
    }

    canonize_with_partition(graph, Partition::from_colors(colors), &Options::default())
}
