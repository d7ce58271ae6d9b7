use thiserror::Error;

/// Failures reported by a canonization call.
///
/// Everything except [`Error::OutOfMemory`] is an invalid argument and is
/// detected before the search starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("edge ({from}, {to}) references a vertex outside 0..{vertex_count}")]
    EdgeOutOfRange {
        from: usize,
        to: usize,
        vertex_count: usize,
    },

    #[error("partition arrays have lengths {lab} (lab) and {ptn} (ptn), expected {vertex_count}")]
    PartitionLengthMismatch {
        lab: usize,
        ptn: usize,
        vertex_count: usize,
    },

    #[error("label {label} is outside 0..{vertex_count}")]
    LabelOutOfRange { label: usize, vertex_count: usize },

    #[error("vertex {0} appears more than once in the partition")]
    DuplicateLabel(usize),

    #[error("vertex {0} is not in any cell of the partition")]
    MissingVertex(usize),

    #[error("the last cell of the partition is not terminated by a zero in ptn")]
    UnterminatedCell,

    #[error("permutation has length {found}, expected {expected}")]
    PermutationLength { found: usize, expected: usize },

    #[error("out of memory while storing automorphism generators")]
    OutOfMemory,
}

impl Error {
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, Error::OutOfMemory)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
