//! Bounded cache of rendered deleted chunks.
//!
//! Rendering the original text of a chunk is the only per-chunk work the
//! unified view repeats on every update. Entries are keyed by [`ChunkId`],
//! which survives an update only when the chunk was copied through
//! untouched, so a cached view never outlives the text it shows.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tracing::debug;
use twinpane_types::{Chunk, ChunkId, Text};
use twinpane_view::{deleted_segments, DeletedSegment};

/// Rendered deleted-chunk views keyed by chunk identity, least recently
/// used first out.
#[derive(Clone, Debug)]
pub struct DeletionCache {
    entries: LruCache<ChunkId, Arc<[DeletedSegment]>>,
}

impl DeletionCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: ChunkId) -> bool {
        self.entries.contains(&id)
    }

    /// The rendered view of `chunk`, rendering it from `original` on a miss.
    pub fn get_or_render(&mut self, chunk: &Chunk, original: &Text) -> Arc<[DeletedSegment]> {
        if let Some(view) = self.entries.get(&chunk.id()) {
            return Arc::clone(view);
        }
        let view: Arc<[DeletedSegment]> = deleted_segments(original, chunk).into();
        self.entries.put(chunk.id(), Arc::clone(&view));
        view
    }

    /// Drop entries for chunks that are not in `chunks`. Returns how many
    /// were dropped.
    pub fn retain_live(&mut self, chunks: &[Chunk]) -> usize {
        let mut live: Vec<ChunkId> = chunks.iter().map(Chunk::id).collect();
        live.sort_unstable();
        let stale: Vec<ChunkId> = self
            .entries
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| live.binary_search(id).is_err())
            .collect();
        for id in &stale {
            self.entries.pop(id);
        }
        if !stale.is_empty() {
            debug!(dropped = stale.len(), remaining = self.entries.len(), "invalidated deleted-chunk views");
        }
        stale.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for DeletionCache {
    fn default() -> Self {
        Self::new(256)
    }
}
