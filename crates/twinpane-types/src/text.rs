//! Line-indexed immutable documents.
//!
//! A [`Text`] stores its content once together with the byte offset of every
//! line start, so line lookup by offset is a binary search. All positions are
//! byte offsets into the UTF-8 content.

use std::fmt;
use std::sync::Arc;

/// The line separator used by every document.
pub const LINE_BREAK: &str = "\n";

/// A single line of a [`Text`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number.
    pub number: usize,
    /// Offset of the first character of the line.
    pub from: usize,
    /// Offset just past the last character, excluding the separator.
    pub to: usize,
}

impl Line {
    /// Length of the line's content in bytes.
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    /// Returns `true` if the line has no content.
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// An immutable, cheaply clonable document.
#[derive(Clone, PartialEq, Eq)]
pub struct Text {
    content: Arc<str>,
    line_starts: Arc<[usize]>,
}

impl Text {
    /// Create a document from its full content.
    pub fn new(content: impl Into<String>) -> Self {
        let content: String = content.into();
        let mut line_starts = vec![0];
        line_starts.extend(
            content
                .match_indices(LINE_BREAK)
                .map(|(idx, sep)| idx + sep.len()),
        );
        Self {
            content: content.into(),
            line_starts: line_starts.into(),
        }
    }

    /// Create a document, normalizing `\r\n` separators to `\n`.
    pub fn normalized(content: &str) -> Self {
        Self::new(content.replace("\r\n", LINE_BREAK))
    }

    /// The empty document.
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    /// The full content.
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns `true` if the document has no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of lines. An empty document has one (empty) line.
    pub fn lines(&self) -> usize {
        self.line_starts.len()
    }

    /// The line containing `pos`. Positions past the end resolve to the
    /// last line; a position on a separator belongs to the line it ends.
    pub fn line_at(&self, pos: usize) -> Line {
        let pos = pos.min(self.len());
        let index = self.line_starts.partition_point(|&start| start <= pos) - 1;
        self.line_by_index(index)
    }

    /// The line with the given 1-based number, if it exists.
    pub fn line(&self, number: usize) -> Option<Line> {
        if number == 0 || number > self.lines() {
            return None;
        }
        Some(self.line_by_index(number - 1))
    }

    fn line_by_index(&self, index: usize) -> Line {
        let from = self.line_starts[index];
        let to = match self.line_starts.get(index + 1) {
            Some(next) => next - LINE_BREAK.len(),
            None => self.len(),
        };
        Line {
            number: index + 1,
            from,
            to,
        }
    }

    /// Returns `true` if `pos` is the start of a line.
    pub fn is_line_start(&self, pos: usize) -> bool {
        self.line_starts.binary_search(&pos).is_ok()
    }

    /// The text between `from` and `to`, clamped to the document and
    /// widened outward to character boundaries.
    pub fn slice(&self, from: usize, to: usize) -> &str {
        let to = self.ceil_boundary(to);
        let from = self.floor_boundary(from).min(to);
        &self.content[from..to]
    }

    /// The closest character boundary at or before `pos`.
    pub fn floor_boundary(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.len());
        while !self.content.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    /// The closest character boundary at or after `pos`, clamped to the end.
    pub fn ceil_boundary(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.len());
        while !self.content.is_char_boundary(pos) {
            pos += 1;
        }
        pos
    }

    /// Returns `true` if `pos` lies on a character boundary within the document.
    pub fn is_char_boundary(&self, pos: usize) -> bool {
        self.content.is_char_boundary(pos)
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Text")
            .field("len", &self.len())
            .field("lines", &self.lines())
            .finish()
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
