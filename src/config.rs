//! In-process configuration for a single index build and for diff
//! presentation. The log-producing tool and the rebuild schedule are owned
//! by the embedding application; this crate only configures what it
//! actually computes.

/// Tunables for building a [`crate::GitHistory`] and for rendering diffs
/// through the [`crate::diff`] module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Hex characters kept from each commit hash. The distilled spec fixes
    /// this at 16; §9 explicitly permits widening it to reduce collision
    /// risk in large repositories, which this crate takes as the default.
    pub hash_prefix_len: usize,
    /// Below this many unchanged lines between hunks, the Diff Presenter
    /// emits full context instead of collapsing it.
    pub context_collapse_threshold: u32,
    /// Lines of full context kept immediately before and after a collapsed
    /// run.
    pub context_edge_lines: u32,
}

impl Config {
    /// The hash-prefix length the distilled spec specifies literally (16).
    pub const LEGACY_HASH_PREFIX_LEN: usize = 16;
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hash_prefix_len: 20,
            context_collapse_threshold: 9,
            context_edge_lines: 3,
        }
    }
}
