/// Tunables for a `Hierarchy`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// The deepest logical tree the traversals will follow.
    ///
    /// Upward walks and hit testing give up past this depth, which also bounds the damage of a
    /// corrupted (cyclic) tree.
    pub max_depth: usize,

    /// Transform chains with a determinant smaller than this in magnitude are treated as
    /// non-invertible.
    pub epsilon: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: 64,
            epsilon: 1e-12,
        }
    }
}
