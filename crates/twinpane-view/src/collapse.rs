//! Collapsing long runs of unchanged lines.

use serde::Serialize;
use tracing::debug;
use twinpane_types::{Assoc, Chunk, CollapseConfig, EditDescription, Side, Text};

/// A span of unchanged lines hidden behind a placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CollapseRange {
    /// Start of the first hidden line.
    pub from: usize,
    /// End of the last hidden line, before its line break.
    pub to: usize,
    /// 1-based number of the first hidden line.
    pub from_line: usize,
    /// 1-based number of the last hidden line.
    pub to_line: usize,
    /// Number of hidden lines.
    pub lines: usize,
}

/// Compute the collapsible spans of `doc`, the `side` document of `chunks`.
///
/// Every unchanged span between two chunks (and before the first and after
/// the last) is shrunk by `margin` lines where it touches a chunk, and kept
/// if at least `min_size` lines remain.
pub fn collapse_unchanged(
    doc: &Text,
    chunks: &[Chunk],
    side: Side,
    margin: usize,
    min_size: usize,
) -> Vec<CollapseRange> {
    let margin = margin as isize;
    let min_size = min_size.max(1) as isize;
    let mut ranges = Vec::new();
    let mut prev_line = 1isize;

    for i in 0..=chunks.len() {
        let chunk = chunks.get(i);
        let collapse_from = if i == 0 { 1 } else { prev_line + margin };
        let collapse_to = match chunk {
            Some(c) => doc.line_at(c.from(side)).number as isize - 1 - margin,
            None => doc.lines() as isize,
        };
        let lines = collapse_to - collapse_from + 1;
        if lines >= min_size {
            let first = doc.line(collapse_from as usize);
            let last = doc.line(collapse_to as usize);
            if let (Some(first), Some(last)) = (first, last) {
                ranges.push(CollapseRange {
                    from: first.from,
                    to: last.to,
                    from_line: first.number,
                    to_line: last.number,
                    lines: lines as usize,
                });
            }
        }
        let Some(chunk) = chunk else {
            break;
        };
        prev_line = doc.line_at(chunk.to(side).min(doc.len())).number as isize;
    }
    ranges
}

/// The collapsed spans of one pane.
///
/// Spans are recomputed in full whenever the chunk list changes. A span the
/// user expanded stays expanded across recomputes as long as a span still
/// starts at its (edit-mapped) position.
#[derive(Clone, Debug)]
pub struct CollapseState {
    config: CollapseConfig,
    side: Side,
    ranges: Vec<CollapseRange>,
    dismissed: Vec<usize>,
}

impl CollapseState {
    pub fn new(config: CollapseConfig, side: Side, doc: &Text, chunks: &[Chunk]) -> Self {
        let mut state = Self {
            config,
            side,
            ranges: Vec::new(),
            dismissed: Vec::new(),
        };
        state.recompute(doc, chunks);
        state
    }

    pub fn config(&self) -> CollapseConfig {
        self.config
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// The current spans, in document order.
    pub fn ranges(&self) -> &[CollapseRange] {
        &self.ranges
    }

    /// Expand the span starting at `pos`. Other spans are untouched.
    /// Returns `false` if no span starts there.
    pub fn uncollapse(&mut self, pos: usize) -> bool {
        let Some(index) = self.ranges.iter().position(|r| r.from == pos) else {
            return false;
        };
        self.ranges.remove(index);
        self.dismissed.push(pos);
        true
    }

    /// Carry expanded-span positions through an edit to this pane's document.
    pub fn map(&mut self, description: &EditDescription) {
        for pos in &mut self.dismissed {
            *pos = description.map_pos(*pos, Assoc::After);
        }
    }

    /// Rebuild the spans for a new chunk list.
    pub fn recompute(&mut self, doc: &Text, chunks: &[Chunk]) {
        let mut ranges =
            collapse_unchanged(doc, chunks, self.side, self.config.margin, self.config.min_size);
        self.dismissed.retain(|pos| ranges.iter().any(|r| r.from == *pos));
        ranges.retain(|r| !self.dismissed.contains(&r.from));
        debug!(
            side = %self.side,
            collapsed = ranges.len(),
            dismissed = self.dismissed.len(),
            "recomputed collapsed spans"
        );
        self.ranges = ranges;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use twinpane_chunk::ChunkStore;
    use twinpane_types::Edit;

    fn setup(a: &str, b: &str) -> (Text, Text, Vec<Chunk>) {
        let (a, b) = (Text::new(a), Text::new(b));
        let chunks = ChunkStore::new(&a, &b).chunks().to_vec();
        (a, b, chunks)
    }

    fn line_spans(ranges: &[CollapseRange]) -> Vec<(usize, usize)> {
        ranges.iter().map(|r| (r.from_line, r.to_line)).collect()
    }

    #[test]
    fn single_changed_line_leaves_context() {
        let (_, b, chunks) = setup("a\nb\nc\nd\ne\nf\ng\nh", "a\nb\nc\nX\ne\nf\ng\nh");
        let ranges = collapse_unchanged(&b, &chunks, Side::B, 1, 2);
        assert_eq!(line_spans(&ranges), vec![(1, 2), (6, 8)]);
        assert_eq!(ranges[0].from, 0);
        assert_eq!(ranges[0].to, 3);
        assert_eq!(ranges[1].lines, 3);
        assert_eq!(ranges[1].to, b.len());
    }

    #[test]
    fn no_chunks_collapses_whole_document() {
        let doc = Text::new("1\n2\n3\n4\n5");
        let ranges = collapse_unchanged(&doc, &[], Side::A, 3, 4);
        assert_eq!(line_spans(&ranges), vec![(1, 5)]);
        assert!(collapse_unchanged(&doc, &[], Side::A, 3, 6).is_empty());
    }

    #[test]
    fn short_spans_are_kept_visible() {
        let (a, _, chunks) = setup("a\nb\nc\nd\ne", "a\nb\nX\nd\ne");
        assert!(collapse_unchanged(&a, &chunks, Side::A, 3, 4).is_empty());
    }

    #[test]
    fn spans_between_chunks() {
        let a: String = (1..=30).map(|i| format!("line {i}\n")).collect();
        let b = a
            .replace("line 5\n", "five\n")
            .replace("line 25\n", "twenty-five\n");
        let (a, _, chunks) = setup(&a, &b);
        assert_eq!(chunks.len(), 2);
        let ranges = collapse_unchanged(&a, &chunks, Side::A, 3, 3);
        // Line 31 is the empty line after the final break.
        assert_eq!(line_spans(&ranges), vec![(9, 21), (29, 31)]);
    }

    #[test]
    fn uncollapse_removes_exactly_one_span() {
        let a: String = (1..=30).map(|i| format!("{i}\n")).collect();
        let b = a.replace("15\n", "fifteen\n");
        let (_, b, chunks) = setup(&a, &b);
        let mut state = CollapseState::new(CollapseConfig::default(), Side::B, &b, &chunks);
        assert_eq!(state.ranges().len(), 2);
        let first = state.ranges()[0];
        let second = state.ranges()[1];
        assert!(!state.uncollapse(first.from + 1));
        assert!(state.uncollapse(first.from));
        assert_eq!(state.ranges(), &[second]);
    }

    #[test]
    fn dismissed_spans_survive_edits_and_recompute() {
        let a: String = (1..=30).map(|i| format!("{i}\n")).collect();
        let b_src = a.replace("15\n", "fifteen\n");
        let (a, b, chunks) = setup(&a, &b_src);
        let mut store = ChunkStore::new(&a, &b);
        let mut state = CollapseState::new(CollapseConfig::default(), Side::B, &b, &chunks);
        let second = state.ranges()[1];
        assert!(state.uncollapse(second.from));

        // Edit the first line; the dismissed span moves with the text.
        let (b, desc) = Edit::replace(0, 1, "one").apply(&b).unwrap();
        store.update_b(&a, &b, &desc);
        state.map(&desc);
        state.recompute(&b, store.chunks());

        assert_eq!(state.ranges().len(), 1);
        assert_eq!(state.ranges()[0].from_line, 5);
        assert_eq!(state.ranges()[0].to_line, 11);
    }

    proptest! {
        #[test]
        fn collapsed_spans_never_touch_chunks(
            a in "[ab\n]{0,80}",
            b in "[ab\n]{0,80}",
            margin in 1usize..4,
            min_size in 1usize..6,
        ) {
            let (a, b, chunks) = setup(&a, &b);
            for (side, doc) in [(Side::A, &a), (Side::B, &b)] {
                let ranges = collapse_unchanged(doc, &chunks, side, margin, min_size);
                for pair in ranges.windows(2) {
                    prop_assert!(pair[0].to < pair[1].from);
                }
                for range in &ranges {
                    prop_assert!(range.lines >= min_size);
                    prop_assert_eq!(range.lines, range.to_line - range.from_line + 1);
                    for chunk in &chunks {
                        prop_assert!(range.to < chunk.from(side) || range.from >= chunk.to(side));
                    }
                }
            }
        }
    }
}
