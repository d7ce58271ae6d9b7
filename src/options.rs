use serde::{Deserialize, Serialize};

/// Settings for one canonization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Compute the canonical labeling. When false only automorphisms are
    /// searched for and the returned labeling is the first leaf reached.
    pub get_canon: bool,
    /// Ignore the caller's `lab`/`ptn` and start from the unit partition.
    pub default_partition: bool,
    /// Cut branches using the cell-size invariant and the automorphisms found
    /// so far. Never changes the result, only the running time.
    pub prune: bool,
}

// false for default_partition because we care about coloring
pub const OPTIONS: Options = Options {
    get_canon: true,
    default_partition: false,
    prune: true,
};

impl Default for Options {
    fn default() -> Self {
        OPTIONS
    }
}
