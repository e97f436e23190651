//! Unified diff filtering and chunking for version bump analysis
//!
//! This crate prepares a raw git diff for remote analysis: `filter` drops
//! whole file sections for paths that never affect the published API
//! (lockfiles, build output, docs, tests, vendored trees), and `chunk`
//! slices the filtered text into bounded-size pieces so each analysis
//! request fits the remote's context window.

mod chunk;
mod filter;

pub use chunk::{split_into_chunks, Chunk, ChunkOptions, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CHUNKS};
pub use filter::{filter_diff, IgnoreRules, PatternError};
