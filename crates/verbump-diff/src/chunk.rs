//! Size-bounded chunking of filtered diff text

use tracing::debug;

/// Maximum characters per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 8000;

/// Upper bound on chunks per analysis run; larger splits are merged.
pub const DEFAULT_MAX_CHUNKS: usize = 10;

/// One bounded-size piece of the filtered diff, sent as a single
/// analysis unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ChunkOptions {
    pub chunk_size: usize,
    pub max_chunks: usize,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_chunks: DEFAULT_MAX_CHUNKS,
        }
    }
}

/// Split `text` into consecutive chunks of at most `chunk_size` characters,
/// then cap the count at `max_chunks` by merging consecutive groups.
///
/// When no merge occurs, concatenating the chunk texts in order
/// reconstructs the input exactly. Merged chunks join their pieces with a
/// blank-line separator. Empty input yields no chunks.
pub fn split_into_chunks(text: &str, options: &ChunkOptions) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let size = options.chunk_size.max(1);
    let mut raw: Vec<String> = Vec::new();
    let mut current = String::with_capacity(size);
    let mut count = 0;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == size {
            raw.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        raw.push(current);
    }

    let max_chunks = options.max_chunks.max(1);
    let chunks = if raw.len() <= max_chunks {
        raw
    } else {
        let group_size = raw.len().div_ceil(max_chunks);
        debug!(
            raw = raw.len(),
            max_chunks, group_size, "merging chunks to honor the cap"
        );
        raw.chunks(group_size)
            .map(|group| group.join("\n\n"))
            .collect()
    };

    chunks
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk { index, text })
        .collect()
}
