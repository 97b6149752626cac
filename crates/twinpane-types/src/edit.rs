//! Edits and edit descriptions.
//!
//! An [`Edit`] is what a host asks to do to a document: an ordered list of
//! replacements expressed in the old document's coordinates. Applying it
//! yields the new document plus an [`EditDescription`], the
//! `(old_from, old_to, new_from, new_to)` ranges that the chunk store consumes
//! and that cached positions are re-mapped through.

use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};
use crate::text::Text;

/// Replace `from..to` with `insert`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

/// An ordered set of non-overlapping replacements applied as one unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    replacements: Vec<Replacement>,
}

impl Edit {
    /// An edit that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single replacement.
    pub fn replace(from: usize, to: usize, insert: impl Into<String>) -> Self {
        Self::new().and_replace(from, to, insert)
    }

    /// A single insertion at `pos`.
    pub fn insert(pos: usize, insert: impl Into<String>) -> Self {
        Self::replace(pos, pos, insert)
    }

    /// A single deletion of `from..to`.
    pub fn delete(from: usize, to: usize) -> Self {
        Self::replace(from, to, "")
    }

    /// Append another replacement. Replacements must be given in ascending
    /// order of old-document position.
    pub fn and_replace(mut self, from: usize, to: usize, insert: impl Into<String>) -> Self {
        self.replacements.push(Replacement {
            from,
            to,
            insert: insert.into(),
        });
        self
    }

    /// The replacements in order.
    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    /// Returns `true` if the edit has no replacements.
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Apply the edit to `doc`, returning the new document and a description
    /// of the ranges that changed.
    ///
    /// Replacements that neither delete nor insert anything are dropped
    /// from the description.
    pub fn apply(&self, doc: &Text) -> EditResult<(Text, EditDescription)> {
        let source = doc.as_str();
        let mut out = String::with_capacity(source.len());
        let mut ranges = Vec::with_capacity(self.replacements.len());
        let mut copied_to = 0;

        for r in &self.replacements {
            if r.from > r.to {
                return Err(EditError::Inverted {
                    from: r.from,
                    to: r.to,
                });
            }
            if r.to > source.len() {
                return Err(EditError::OutOfBounds {
                    from: r.from,
                    to: r.to,
                    len: source.len(),
                });
            }
            if r.from < copied_to {
                return Err(EditError::Overlapping {
                    from: r.from,
                    prev_to: copied_to,
                });
            }
            for pos in [r.from, r.to] {
                if !doc.is_char_boundary(pos) {
                    return Err(EditError::NotCharBoundary(pos));
                }
            }

            out.push_str(&source[copied_to..r.from]);
            let new_from = out.len();
            out.push_str(&r.insert);
            copied_to = r.to;

            if r.from != r.to || !r.insert.is_empty() {
                ranges.push(ChangedRange {
                    old_from: r.from,
                    old_to: r.to,
                    new_from,
                    new_to: out.len(),
                });
            }
        }
        out.push_str(&source[copied_to..]);

        let description = EditDescription {
            old_len: source.len(),
            new_len: out.len(),
            ranges,
        };
        Ok((Text::new(out), description))
    }
}

/// One replaced range, in old and new document coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedRange {
    pub old_from: usize,
    pub old_to: usize,
    pub new_from: usize,
    pub new_to: usize,
}

impl ChangedRange {
    /// Net length change introduced by this range.
    pub fn len_diff(&self) -> isize {
        (self.new_to - self.new_from) as isize - (self.old_to - self.old_from) as isize
    }
}

/// Which side a position sticks to when the text around it is replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Assoc {
    Before,
    After,
}

/// The ranges one transaction replaced, in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDescription {
    /// Length of the document before the edit.
    pub old_len: usize,
    /// Length of the document after the edit.
    pub new_len: usize,
    /// The replaced ranges.
    pub ranges: Vec<ChangedRange>,
}

impl EditDescription {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The replaced ranges in order.
    pub fn iter_changed_ranges(&self) -> impl Iterator<Item = &ChangedRange> {
        self.ranges.iter()
    }

    /// Map a position in the old document to the new document.
    ///
    /// Positions inside a replaced range collapse to one of its ends,
    /// chosen by `assoc`.
    pub fn map_pos(&self, pos: usize, assoc: Assoc) -> usize {
        let mut delta = 0isize;
        for r in &self.ranges {
            if pos < r.old_from {
                break;
            }
            if pos > r.old_to {
                delta = r.new_to as isize - r.old_to as isize;
                continue;
            }
            if r.old_from != r.old_to {
                if pos == r.old_from {
                    return r.new_from;
                }
                if pos == r.old_to {
                    return r.new_to;
                }
            }
            return match assoc {
                Assoc::Before => r.new_from,
                Assoc::After => r.new_to,
            };
        }
        pos.saturating_add_signed(delta)
    }
}
