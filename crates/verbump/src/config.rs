//! Tunables for one analysis run

use verbump_diff::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CHUNKS};
use verbump_wire::DEFAULT_MAX_ATTEMPTS;

/// Diffs shorter than this are not worth a remote round trip.
pub const MIN_DIFF_LEN: usize = 10;

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Maximum characters per analysis chunk.
    pub chunk_size: usize,

    /// Upper bound on chunks per run; larger splits are merged.
    pub max_chunks: usize,

    /// Attempts per exchange before the run fails.
    pub max_attempts: u32,

    /// Extra ignore patterns applied on top of the built-in set.
    pub extra_ignore: Vec<String>,

    /// Diffs shorter than this short-circuit to `unknown`.
    pub min_diff_len: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_chunks: DEFAULT_MAX_CHUNKS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            extra_ignore: Vec::new(),
            min_diff_len: MIN_DIFF_LEN,
        }
    }
}
