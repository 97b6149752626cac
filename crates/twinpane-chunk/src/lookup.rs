//! Position lookups over a sorted chunk list.

use twinpane_types::{Chunk, Side};

/// Index of the chunk whose `from..=end` range on `side` covers `pos`.
pub fn chunk_index_at(chunks: &[Chunk], side: Side, pos: usize) -> Option<usize> {
    let index = chunks.partition_point(|c| c.end(side) < pos);
    (index < chunks.len() && chunks[index].from(side) <= pos).then_some(index)
}

/// The chunk whose `from..=end` range on `side` covers `pos`.
pub fn chunk_at(chunks: &[Chunk], side: Side, pos: usize) -> Option<&Chunk> {
    chunk_index_at(chunks, side, pos).map(|i| &chunks[i])
}

/// Map a position in the `side` document to the other document.
///
/// Outside chunks the two documents are identical, so a position keeps its
/// distance from the end of the nearest preceding chunk. Inside a chunk the
/// distance from the chunk start is kept, clamped to the chunk's extent on
/// the other side.
pub fn map_pos(pos: usize, chunks: &[Chunk], side: Side) -> usize {
    let other = side.other();
    let index = chunks.partition_point(|c| c.from(side) < pos);
    let Some(prev) = index.checked_sub(1).map(|i| &chunks[i]) else {
        return pos;
    };
    if pos >= prev.to(side) {
        prev.to(other) + (pos - prev.to(side))
    } else {
        (prev.from(other) + (pos - prev.from(side))).min(prev.to(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinpane_types::Change;

    fn chunk(from_a: usize, to_a: usize, from_b: usize, to_b: usize) -> Chunk {
        Chunk::new(vec![Change::new(0, to_a - from_a, 0, to_b - from_b)], from_a, to_a, from_b, to_b)
    }

    fn sample() -> Vec<Chunk> {
        // A: deletion of 4 bytes at 2; B: replacement 10..12 -> 6..10.
        vec![chunk(2, 6, 2, 2), chunk(10, 12, 6, 10)]
    }

    #[test]
    fn lookup_covers_from_through_end() {
        let chunks = sample();
        assert_eq!(chunk_index_at(&chunks, Side::A, 2), Some(0));
        assert_eq!(chunk_index_at(&chunks, Side::A, 5), Some(0));
        assert_eq!(chunk_index_at(&chunks, Side::A, 6), None);
        assert_eq!(chunk_index_at(&chunks, Side::B, 2), Some(0));
        assert_eq!(chunk_index_at(&chunks, Side::B, 3), None);
        assert_eq!(chunk_index_at(&chunks, Side::B, 9), Some(1));
        assert_eq!(chunk_index_at(&chunks, Side::B, 10), None);
        assert!(chunk_at(&[], Side::B, 0).is_none());
    }

    #[test]
    fn map_pos_outside_chunks_keeps_offset() {
        let chunks = sample();
        assert_eq!(map_pos(1, &chunks, Side::A), 1);
        assert_eq!(map_pos(8, &chunks, Side::A), 4);
        assert_eq!(map_pos(14, &chunks, Side::A), 12);
        assert_eq!(map_pos(4, &chunks, Side::B), 8);
        assert_eq!(map_pos(12, &chunks, Side::B), 14);
    }

    #[test]
    fn map_pos_inside_chunk_is_clamped() {
        let chunks = sample();
        assert_eq!(map_pos(4, &chunks, Side::A), 2);
        assert_eq!(map_pos(11, &chunks, Side::A), 7);
        assert_eq!(map_pos(9, &chunks, Side::B), 12);
    }
}
