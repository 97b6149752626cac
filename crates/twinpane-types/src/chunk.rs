//! Chunks and changes.
//!
//! A [`Chunk`] is a line-aligned region that differs between document A and
//! document B. Either side may be empty (`from == to`), which marks a pure
//! insertion or deletion. Otherwise the range starts at the start of the
//! first changed line and ends one past the end of the last changed line, so
//! a `to` position may point one past the end of the document. Use
//! [`Chunk::end_a`] / [`Chunk::end_b`] when a position that is certainly
//! inside the document is needed.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;
use crate::text::Text;

/// One of the two compared documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The other document.
    pub fn other(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    fn letter(self) -> char {
        match self {
            Side::A => 'a',
            Side::B => 'b',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A minimal character-level difference. Inside a chunk, positions are
/// relative to the chunk's `from_a` / `from_b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Change {
    pub from_a: usize,
    pub to_a: usize,
    pub from_b: usize,
    pub to_b: usize,
}

impl Change {
    pub fn new(from_a: usize, to_a: usize, from_b: usize, to_b: usize) -> Self {
        Self {
            from_a,
            to_a: to_a.max(from_a),
            from_b,
            to_b: to_b.max(from_b),
        }
    }

    /// Shift both sides forward.
    pub fn offset(self, off_a: usize, off_b: usize) -> Self {
        Self::new(
            self.from_a + off_a,
            self.to_a + off_a,
            self.from_b + off_b,
            self.to_b + off_b,
        )
    }

    /// Express an absolute change relative to `(base_a, base_b)`. Positions
    /// before the base clamp to it.
    pub fn relative_to(self, base_a: usize, base_b: usize) -> Self {
        Self::new(
            self.from_a.saturating_sub(base_a),
            self.to_a.saturating_sub(base_a),
            self.from_b.saturating_sub(base_b),
            self.to_b.saturating_sub(base_b),
        )
    }

    /// The range on one side.
    pub fn range(&self, side: Side) -> (usize, usize) {
        match side {
            Side::A => (self.from_a, self.to_a),
            Side::B => (self.from_b, self.to_b),
        }
    }

    /// Returns `true` if nothing changed on either side.
    pub fn is_empty(&self) -> bool {
        self.from_a == self.to_a && self.from_b == self.to_b
    }
}

/// Opaque chunk identity.
///
/// Every chunk produced by diffing gets a fresh id; shifting a chunk to new
/// positions keeps it. Renderers key per-chunk caches on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId(u64);

static NEXT_CHUNK_ID: AtomicU64 = AtomicU64::new(1);

impl ChunkId {
    /// Allocate a new, never before used id.
    pub fn fresh() -> Self {
        Self(NEXT_CHUNK_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A range of lines with changed content.
///
/// Equality compares extents and changes only; two chunks with the same
/// content but different identity are equal.
#[derive(Clone)]
pub struct Chunk {
    id: ChunkId,
    /// Character-level changes, relative to `from_a` / `from_b`.
    pub changes: Arc<[Change]>,
    /// Start of the chunk in document A.
    pub from_a: usize,
    /// End of the chunk in document A. Equal to `from_a` when the chunk
    /// covers no lines in A, one past the end of its last line otherwise.
    pub to_a: usize,
    /// Start of the chunk in document B.
    pub from_b: usize,
    /// End of the chunk in document B.
    pub to_b: usize,
}

impl Chunk {
    /// Create a chunk with a fresh identity. Inverted ranges are clamped so
    /// that `to >= from` on both sides.
    pub fn new(
        changes: impl Into<Arc<[Change]>>,
        from_a: usize,
        to_a: usize,
        from_b: usize,
        to_b: usize,
    ) -> Self {
        Self {
            id: ChunkId::fresh(),
            changes: changes.into(),
            from_a,
            to_a: to_a.max(from_a),
            from_b,
            to_b: to_b.max(from_b),
        }
    }

    /// This chunk's identity.
    pub fn id(&self) -> ChunkId {
        self.id
    }

    /// The same chunk moved by signed offsets. Identity and change list are
    /// shared with `self`.
    pub fn offset(&self, off_a: isize, off_b: isize) -> Self {
        if off_a == 0 && off_b == 0 {
            return self.clone();
        }
        Self {
            id: self.id,
            changes: Arc::clone(&self.changes),
            from_a: self.from_a.saturating_add_signed(off_a),
            to_a: self.to_a.saturating_add_signed(off_a),
            from_b: self.from_b.saturating_add_signed(off_b),
            to_b: self.to_b.saturating_add_signed(off_b),
        }
    }

    /// `from_a` if the chunk is empty in A, otherwise the end of its last line.
    pub fn end_a(&self) -> usize {
        self.from_a.max(self.to_a.saturating_sub(1))
    }

    /// `from_b` if the chunk is empty in B, otherwise the end of its last line.
    pub fn end_b(&self) -> usize {
        self.from_b.max(self.to_b.saturating_sub(1))
    }

    /// Start of the chunk on one side.
    pub fn from(&self, side: Side) -> usize {
        match side {
            Side::A => self.from_a,
            Side::B => self.from_b,
        }
    }

    /// End of the chunk on one side (possibly one past the document end).
    pub fn to(&self, side: Side) -> usize {
        match side {
            Side::A => self.to_a,
            Side::B => self.to_b,
        }
    }

    /// See [`Chunk::end_a`].
    pub fn end(&self, side: Side) -> usize {
        match side {
            Side::A => self.end_a(),
            Side::B => self.end_b(),
        }
    }

    /// Returns `true` if `pos` lies within `from..=end` on `side`.
    pub fn covers(&self, side: Side, pos: usize) -> bool {
        self.from(side) <= pos && pos <= self.end(side)
    }

    /// The chunk with documents A and B swapped.
    pub fn mirrored(&self) -> Self {
        let changes: Vec<Change> = self
            .changes
            .iter()
            .map(|c| Change::new(c.from_b, c.to_b, c.from_a, c.to_a))
            .collect();
        Self {
            id: self.id,
            changes: changes.into(),
            from_a: self.from_b,
            to_a: self.to_b,
            from_b: self.from_a,
            to_b: self.to_a,
        }
    }
}

impl PartialEq for Chunk {
    fn eq(&self, other: &Self) -> bool {
        self.from_a == other.from_a
            && self.to_a == other.to_a
            && self.from_b == other.from_b
            && self.to_b == other.to_b
            && self.changes == other.changes
    }
}

impl Eq for Chunk {}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("id", &self.id)
            .field("a", &(self.from_a..self.to_a))
            .field("b", &(self.from_b..self.to_b))
            .field("changes", &self.changes)
            .finish()
    }
}

/// Check the at-rest invariants of a chunk list against its documents:
/// ascending and non-overlapping, no inverted ranges, every boundary on a
/// line start (a `to` may also be one past the end), no chunk empty on both
/// sides, and every change inside its chunk's extent with the changes of a
/// chunk ascending and non-overlapping.
pub fn validate_chunks(chunks: &[Chunk], a: &Text, b: &Text) -> Result<(), InvariantViolation> {
    for (index, chunk) in chunks.iter().enumerate() {
        for (side, doc) in [(Side::A, a), (Side::B, b)] {
            let (from, to) = (chunk.from(side), chunk.to(side));
            if from > to {
                return Err(InvariantViolation::Inverted {
                    index,
                    side: side.letter(),
                });
            }
            for pos in [from, to] {
                let past_end = pos == doc.len() + 1 && pos == to;
                if !doc.is_line_start(pos) && !past_end {
                    return Err(InvariantViolation::NotLineAligned {
                        index,
                        side: side.letter(),
                        pos,
                    });
                }
            }
            let extent = to - from;
            if chunk.changes.iter().any(|c| c.range(side).1 > extent) {
                return Err(InvariantViolation::ChangeOutOfBounds { index });
            }
            let ordered = chunk
                .changes
                .windows(2)
                .all(|pair| pair[0].range(side).1 <= pair[1].range(side).0);
            if !ordered {
                return Err(InvariantViolation::ChangesUnordered {
                    index,
                    side: side.letter(),
                });
            }
        }
        if chunk.from_a == chunk.to_a && chunk.from_b == chunk.to_b {
            return Err(InvariantViolation::Empty { index });
        }
        if index > 0 {
            let prev = &chunks[index - 1];
            if chunk.from_a < prev.to_a || chunk.from_b < prev.to_b {
                return Err(InvariantViolation::Unordered {
                    index,
                    prev: index - 1,
                });
            }
        }
    }
    Ok(())
}
