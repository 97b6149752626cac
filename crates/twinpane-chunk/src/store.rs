//! Building and incrementally updating chunk lists.
//!
//! [`build`] runs the diff engine over both full documents and snaps every
//! raw change outward to whole lines. [`update`] avoids the full comparison:
//! each edited range is widened by a margin, the widened bounds are snapped
//! onto existing chunk boundaries so no chunk is cut in half, and only those
//! windows are re-diffed. Chunks outside the windows are copied through,
//! shifted by the length change of the edits before them.
//!
//! The margin is a correctness/performance knob, not a proof. When every
//! textual difference an edit introduces falls inside its window, the
//! updated list equals a fresh [`build`] of the new document pair. When it
//! does not (an edit that shifts how distant, ambiguous text aligns), the
//! result still satisfies every chunk-list invariant but may carve chunks
//! differently than a rebuild would. [`ChunkStore::verify_against_rebuild`]
//! detects that case.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};
use twinpane_diff::{DiffBudget, DiffEngine, PresentableDiff};
use twinpane_types::{Change, Chunk, EditDescription, MergeConfig, Side, Text, LINE_BREAK};

/// Bytes of context re-diffed on each side of an edit by default.
pub const DEFAULT_UPDATE_MARGIN: usize = 1000;

/// A window of both documents that must be re-diffed, plus the net length
/// change of the edits inside it. Bounds are in pre-edit coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateRange {
    pub from_a: usize,
    pub to_a: usize,
    pub from_b: usize,
    pub to_b: usize,
    pub diff_a: isize,
    pub diff_b: isize,
}

/// The engine and settings a build or update runs with.
#[derive(Clone, Copy)]
pub struct DiffContext<'e> {
    pub engine: &'e dyn DiffEngine,
    pub budget: DiffBudget,
    /// Bytes of context re-diffed around each edit.
    pub margin: usize,
}

/// Build the chunk list for two documents from scratch.
pub fn build(a: &Text, b: &Text, cx: DiffContext<'_>) -> Vec<Chunk> {
    let changes = cx.engine.diff(a.as_str(), b.as_str(), cx.budget);
    to_chunks(&changes, a, b, 0, 0)
}

/// Update `chunks` after an edit to the `side` document.
///
/// `a` and `b` are the documents after the edit (only the `side` one
/// changed); `description` describes the edit in that document's
/// coordinates.
pub fn update(
    chunks: &[Chunk],
    side: Side,
    a: &Text,
    b: &Text,
    description: &EditDescription,
    cx: DiffContext<'_>,
) -> Vec<Chunk> {
    let other_len = match side {
        Side::A => b.len(),
        Side::B => a.len(),
    };
    let ranges = find_ranges_for_change(chunks, description, side, other_len, cx.margin);
    if ranges.is_empty() {
        return chunks.to_vec();
    }
    debug!(%side, ranges = ranges.len(), "re-diffing edited windows");
    update_chunks(&ranges, chunks, a, b, cx)
}

/// Snap a changed start position outward to a line start on both sides.
///
/// A change that starts exactly at the end of a line on both sides begins
/// with the line break, so the chunk starts at the next line instead.
fn from_line(from_a: usize, from_b: usize, a: &Text, b: &Text) -> (usize, usize) {
    let line_a = a.line_at(from_a);
    let line_b = b.line_at(from_b);
    if line_a.to == from_a && line_b.to == from_b && from_a < a.len() && from_b < b.len() {
        (from_a + LINE_BREAK.len(), from_b + LINE_BREAK.len())
    } else {
        (line_a.from, line_b.from)
    }
}

/// Snap a changed end position forward to one past the end of its line,
/// unless it already sits on a line start on both sides.
fn to_line(to_a: usize, to_b: usize, a: &Text, b: &Text) -> (usize, usize) {
    let line_a = a.line_at(to_a);
    let line_b = b.line_at(to_b);
    if line_a.from == to_a && line_b.from == to_b {
        (to_a, to_b)
    } else {
        (line_a.to + LINE_BREAK.len(), line_b.to + LINE_BREAK.len())
    }
}

/// Turn raw changes (relative to `off_a` / `off_b`) into line-aligned
/// chunks, grouping changes whose line windows touch.
fn to_chunks(changes: &[Change], a: &Text, b: &Text, off_a: usize, off_b: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut i = 0;
    while i < changes.len() {
        let first = changes[i].offset(off_a, off_b);
        let (mut from_a, mut from_b) = from_line(first.from_a, first.from_b, a, b);
        let (mut to_a, mut to_b) = to_line(first.to_a, first.to_b, a, b);
        let mut group = vec![first];

        while let Some(next) = changes.get(i + 1) {
            let next = next.offset(off_a, off_b);
            let (next_a, next_b) = from_line(next.from_a, next.from_b, a, b);
            // A single unchanged line break between two windows does not
            // split them; one empty line is not worth a separate chunk.
            if next_a > to_a + 1 && next_b > to_b + 1 {
                break;
            }
            group.push(next);
            let (end_a, end_b) = to_line(next.to_a, next.to_b, a, b);
            to_a = to_a.max(end_a);
            to_b = to_b.max(end_b);
            i += 1;
        }

        // Never emit a chunk that is empty on both sides.
        if from_a >= to_a && from_b >= to_b {
            let last = group[group.len() - 1];
            from_a = a.line_at(first.from_a).from;
            from_b = b.line_at(first.from_b).from;
            to_a = a.line_at(last.to_a).to + LINE_BREAK.len();
            to_b = b.line_at(last.to_b).to + LINE_BREAK.len();
        }

        let relative: Vec<Change> = group
            .into_iter()
            .map(|c| c.relative_to(from_a, from_b))
            .collect();
        chunks.push(Chunk::new(relative, from_a, to_a, from_b, to_b));
        i += 1;
    }
    chunks
}

/// Find the extent of the chunk `pos` falls into on `side`, or, when it
/// falls between chunks, the corresponding position in both documents.
fn find_pos(chunks: &[Chunk], pos: usize, side: Side, start: bool) -> (usize, usize) {
    let (mut lo, mut hi) = (0, chunks.len());
    loop {
        if lo == hi {
            let (ref_a, ref_b) = match lo.checked_sub(1) {
                Some(prev) => (chunks[prev].to_a, chunks[prev].to_b),
                None => (0, 0),
            };
            let off = match side {
                Side::A => pos.saturating_sub(ref_a),
                Side::B => pos.saturating_sub(ref_b),
            };
            return (ref_a + off, ref_b + off);
        }
        let mid = (lo + hi) / 2;
        let chunk = &chunks[mid];
        if chunk.from(side) > pos {
            hi = mid;
        } else if chunk.to(side) <= pos {
            lo = mid + 1;
        } else if start {
            return (chunk.from_a, chunk.from_b);
        } else {
            return (chunk.to_a, chunk.to_b);
        }
    }
}

fn find_ranges_for_change(
    chunks: &[Chunk],
    description: &EditDescription,
    side: Side,
    other_len: usize,
    margin: usize,
) -> Vec<UpdateRange> {
    let edited_len = description.old_len;
    let mut ranges: Vec<UpdateRange> = Vec::new();

    for changed in description.iter_changed_ranges() {
        let (mut from_a, mut from_b) = (0, 0);
        let (mut to_a, mut to_b) = match side {
            Side::A => (edited_len, other_len),
            Side::B => (other_len, edited_len),
        };
        if changed.old_from > margin {
            (from_a, from_b) = find_pos(chunks, changed.old_from - margin, side, true);
        }
        if changed.old_to + margin < edited_len {
            (to_a, to_b) = find_pos(chunks, changed.old_to + margin, side, false);
        }
        let len_diff = changed.len_diff();
        let (diff_a, diff_b) = match side {
            Side::A => (len_diff, 0),
            Side::B => (0, len_diff),
        };

        match ranges.last_mut() {
            Some(last) if last.to_a >= from_a => {
                last.to_a = to_a;
                last.to_b = to_b;
                last.diff_a += diff_a;
                last.diff_b += diff_b;
            }
            _ => ranges.push(UpdateRange {
                from_a,
                to_a,
                from_b,
                to_b,
                diff_a,
                diff_b,
            }),
        }
    }
    ranges
}

fn update_chunks(
    ranges: &[UpdateRange],
    chunks: &[Chunk],
    a: &Text,
    b: &Text,
    cx: DiffContext<'_>,
) -> Vec<Chunk> {
    let mut result = Vec::with_capacity(chunks.len() + ranges.len());
    let mut chunk_i = 0;
    let (mut off_a, mut off_b) = (0isize, 0isize);

    for range in ranges {
        let to_a = a.ceil_boundary(range.to_a.saturating_add_signed(off_a + range.diff_a));
        let to_b = b.ceil_boundary(range.to_b.saturating_add_signed(off_b + range.diff_b));
        let from_a = a.floor_boundary(range.from_a.saturating_add_signed(off_a)).min(to_a);
        let from_b = b.floor_boundary(range.from_b.saturating_add_signed(off_b)).min(to_b);

        while let Some(next) = chunks.get(chunk_i) {
            if next.to_a.saturating_add_signed(off_a) <= from_a
                && next.to_b.saturating_add_signed(off_b) <= from_b
            {
                result.push(next.offset(off_a, off_b));
            } else if next.from_a > range.to_a {
                // Both sides of the comparison are pre-edit positions.
                break;
            }
            chunk_i += 1;
        }

        let changes = cx.engine.diff(a.slice(from_a, to_a), b.slice(from_b, to_b), cx.budget);
        result.extend(to_chunks(&changes, a, b, from_a, from_b));
        off_a += range.diff_a;
        off_b += range.diff_b;
    }

    result.extend(chunks[chunk_i..].iter().map(|c| c.offset(off_a, off_b)));
    result
}

/// Owns the current chunk list of a document pair and the settings used to
/// compute it. Every update replaces the list wholesale; readers holding the
/// previous `Arc` keep a consistent snapshot.
#[derive(Clone)]
pub struct ChunkStore {
    chunks: Arc<[Chunk]>,
    engine: Arc<dyn DiffEngine>,
    budget: DiffBudget,
    margin: usize,
}

impl fmt::Debug for ChunkStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkStore")
            .field("chunks", &self.chunks.len())
            .field("budget", &self.budget)
            .field("margin", &self.margin)
            .finish()
    }
}

impl ChunkStore {
    /// Build the chunk list for `a` and `b` with the default engine and settings.
    pub fn new(a: &Text, b: &Text) -> Self {
        Self::with_engine(
            Arc::new(PresentableDiff::new()),
            DiffBudget::default(),
            DEFAULT_UPDATE_MARGIN,
            a,
            b,
        )
    }

    /// Build the chunk list for `a` and `b` with the settings of `config`.
    pub fn from_config(config: &MergeConfig, a: &Text, b: &Text) -> Self {
        Self::with_engine(
            Arc::new(PresentableDiff::new()),
            DiffBudget::new(config.effort_limit),
            config.update_margin,
            a,
            b,
        )
    }

    /// Build the chunk list for `a` and `b` with a custom engine.
    pub fn with_engine(
        engine: Arc<dyn DiffEngine>,
        budget: DiffBudget,
        margin: usize,
        a: &Text,
        b: &Text,
    ) -> Self {
        let mut store = Self {
            chunks: Arc::from(Vec::<Chunk>::new()),
            engine,
            budget,
            margin,
        };
        store.rebuild(a, b);
        debug!(chunks = store.chunks.len(), "built chunk list");
        store
    }

    fn context(&self) -> DiffContext<'_> {
        DiffContext {
            engine: self.engine.as_ref(),
            budget: self.budget,
            margin: self.margin,
        }
    }

    /// The current chunk list.
    pub fn chunks(&self) -> &Arc<[Chunk]> {
        &self.chunks
    }

    /// The diff budget in use.
    pub fn budget(&self) -> DiffBudget {
        self.budget
    }

    /// The update margin in use.
    pub fn margin(&self) -> usize {
        self.margin
    }

    /// Build a chunk list for `a` and `b` with this store's settings,
    /// without touching the current list.
    pub fn build(&self, a: &Text, b: &Text) -> Vec<Chunk> {
        build(a, b, self.context())
    }

    /// Replace the current list with a full rebuild.
    pub fn rebuild(&mut self, a: &Text, b: &Text) {
        self.chunks = self.build(a, b).into();
    }

    /// Change the diff settings and rebuild.
    pub fn reconfigure(&mut self, budget: DiffBudget, margin: usize, a: &Text, b: &Text) {
        self.budget = budget;
        self.margin = margin;
        self.rebuild(a, b);
    }

    /// Update the list after an edit to the `side` document. `a` and `b`
    /// are the documents after the edit. Returns `true` if the list was
    /// replaced.
    pub fn update(&mut self, side: Side, a: &Text, b: &Text, description: &EditDescription) -> bool {
        if description.is_empty() {
            return false;
        }
        let updated = update(&self.chunks, side, a, b, description, self.context());
        debug!(%side, before = self.chunks.len(), after = updated.len(), "chunk list updated");
        self.chunks = updated.into();
        true
    }

    /// Update after an edit to document A.
    pub fn update_a(&mut self, a: &Text, b: &Text, description: &EditDescription) -> bool {
        self.update(Side::A, a, b, description)
    }

    /// Update after an edit to document B.
    pub fn update_b(&mut self, a: &Text, b: &Text, description: &EditDescription) -> bool {
        self.update(Side::B, a, b, description)
    }

    /// Compare the current list against a full rebuild. A mismatch means
    /// the update margin did not contain everything an edit changed.
    pub fn verify_against_rebuild(&self, a: &Text, b: &Text) -> bool {
        let rebuilt = self.build(a, b);
        let matches = rebuilt[..] == self.chunks[..];
        if !matches {
            warn!(
                incremental = self.chunks.len(),
                rebuilt = rebuilt.len(),
                margin = self.margin,
                "incremental chunk update diverged from full rebuild"
            );
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use twinpane_types::{validate_chunks, Edit};

    fn chunks_of(a: &str, b: &str) -> Vec<Chunk> {
        let store = ChunkStore::new(&Text::new(a), &Text::new(b));
        store.chunks().to_vec()
    }

    fn numbered(n: usize) -> String {
        (0..n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    // ----------------------------------------------------------
    // Building
    // ----------------------------------------------------------

    #[test]
    fn identical_documents_have_no_chunks() {
        assert!(chunks_of("a\nb\nc", "a\nb\nc").is_empty());
        assert!(chunks_of("", "").is_empty());
    }

    #[test]
    fn single_replaced_line() {
        let chunks = chunks_of("a\nb\nc\nd\ne", "a\nb\nX\nd\ne");
        assert_eq!(chunks.len(), 1);
        let c = &chunks[0];
        assert_eq!((c.from_a, c.to_a, c.from_b, c.to_b), (4, 6, 4, 6));
        assert_eq!(&c.changes[..], &[Change::new(0, 1, 0, 1)]);
    }

    #[test]
    fn inserted_line_is_empty_in_a() {
        let chunks = chunks_of("a\nc\n", "a\nb\nc\n");
        assert_eq!(chunks.len(), 1);
        let c = &chunks[0];
        assert_eq!((c.from_a, c.to_a, c.from_b, c.to_b), (2, 2, 2, 4));
    }

    #[test]
    fn deleted_line_is_empty_in_b() {
        let chunks = chunks_of("a\nb\nc\n", "a\nc\n");
        assert_eq!(chunks.len(), 1);
        let c = &chunks[0];
        assert_eq!((c.from_a, c.to_a, c.from_b, c.to_b), (2, 4, 2, 2));
    }

    #[test]
    fn changed_last_line_points_past_the_end() {
        let chunks = chunks_of("a\nb", "a\nc");
        assert_eq!(chunks.len(), 1);
        assert_eq!((chunks[0].from_a, chunks[0].to_a), (2, 4));
        validate_chunks(&chunks, &Text::new("a\nb"), &Text::new("a\nc")).unwrap();
    }

    #[test]
    fn adjacent_changed_lines_form_one_chunk() {
        let chunks = chunks_of("a\nb\nc\nd\n", "a\nB\nC\nd\n");
        assert_eq!(chunks.len(), 1);
        assert_eq!((chunks[0].from_a, chunks[0].to_a), (2, 6));
    }

    #[test]
    fn separated_changes_form_separate_chunks() {
        let chunks = chunks_of("a\nb\nc\nd\ne\n", "X\nb\nc\nd\nY\n");
        assert_eq!(chunks.len(), 2);
        assert_eq!((chunks[0].from_a, chunks[0].to_a), (0, 2));
        assert_eq!((chunks[1].from_a, chunks[1].to_a), (8, 10));
        // Changes are relative to their chunk.
        assert_eq!(chunks[1].changes[0], Change::new(0, 1, 0, 1));
    }

    #[test]
    fn coarse_diff_still_yields_valid_chunks() {
        let a = Text::new("one two\nthree four\nfive");
        let b = Text::new("one too\nthree for\nfive");
        let store = ChunkStore::with_engine(
            Arc::new(PresentableDiff::new()),
            DiffBudget::new(1),
            DEFAULT_UPDATE_MARGIN,
            &a,
            &b,
        );
        assert_eq!(store.chunks().len(), 1);
        validate_chunks(store.chunks(), &a, &b).unwrap();
    }

    // ----------------------------------------------------------
    // Incremental updates
    // ----------------------------------------------------------

    fn edit_b(store: &mut ChunkStore, a: &Text, b: &Text, edit: Edit) -> Text {
        let (new_b, desc) = edit.apply(b).unwrap();
        store.update_b(a, &new_b, &desc);
        new_b
    }

    fn edit_a(store: &mut ChunkStore, a: &Text, b: &Text, edit: Edit) -> Text {
        let (new_a, desc) = edit.apply(a).unwrap();
        store.update_a(&new_a, b, &desc);
        new_a
    }

    fn small_margin_store(a: &Text, b: &Text, margin: usize) -> ChunkStore {
        ChunkStore::with_engine(Arc::new(PresentableDiff::new()), DiffBudget::default(), margin, a, b)
    }

    #[test]
    fn empty_edit_keeps_the_list() {
        let a = Text::new("a\nb\n");
        let b = Text::new("a\nc\n");
        let mut store = ChunkStore::new(&a, &b);
        let before = Arc::clone(store.chunks());
        assert!(!store.update_b(&a, &b, &EditDescription::default()));
        assert!(Arc::ptr_eq(&before, store.chunks()));
    }

    #[test]
    fn editing_b_to_match_a_removes_the_chunk() {
        let a = Text::new("a\nb\nc\nd\ne");
        let b = Text::new("a\nb\nX\nd\ne");
        let mut store = ChunkStore::new(&a, &b);
        assert_eq!(store.chunks().len(), 1);
        let b = edit_b(&mut store, &a, &b, Edit::replace(4, 5, "c"));
        assert!(store.chunks().is_empty());
        assert!(store.verify_against_rebuild(&a, &b));
    }

    #[test]
    fn untouched_chunks_are_shifted_and_keep_identity() {
        let a = Text::new(numbered(400));
        let b_src = numbered(400).replace("line 10\n", "line ten\n").replace("line 390\n", "line 3 9 0\n");
        let b = Text::new(b_src);
        let mut store = small_margin_store(&a, &b, 40);
        assert_eq!(store.chunks().len(), 2);
        let far_id = store.chunks()[1].id();
        let far_from_b = store.chunks()[1].from_b;

        // Insert a new line near the first chunk.
        let pos = b.line(20).unwrap().from;
        let b = edit_b(&mut store, &a, &b, Edit::insert(pos, "inserted\n"));
        assert_eq!(store.chunks().len(), 3);
        let far = &store.chunks()[2];
        assert_eq!(far.id(), far_id);
        assert_eq!(far.from_b, far_from_b + "inserted\n".len());
        validate_chunks(store.chunks(), &a, &b).unwrap();
        assert!(store.verify_against_rebuild(&a, &b));
    }

    #[test]
    fn edits_to_a_update_the_a_side() {
        let a = Text::new(numbered(300));
        let b = Text::new(numbered(300));
        let mut store = small_margin_store(&a, &b, 30);
        assert!(store.chunks().is_empty());

        let line = a.line(150).unwrap();
        let a = edit_a(&mut store, &a, &b, Edit::replace(line.from, line.to, "changed"));
        assert_eq!(store.chunks().len(), 1);
        let c = &store.chunks()[0];
        assert_eq!((c.from_a, c.from_b), (line.from, line.from));
        assert!(store.verify_against_rebuild(&a, &b));
    }

    #[test]
    fn multiple_ranges_in_one_edit() {
        let a = Text::new(numbered(500));
        let b = a.clone();
        let mut store = small_margin_store(&a, &b, 20);
        let first = b.line(50).unwrap();
        let second = b.line(450).unwrap();
        let edit = Edit::replace(first.from, first.to, "first")
            .and_replace(second.from, second.to, "second");
        let b = edit_b(&mut store, &a, &b, edit);
        assert_eq!(store.chunks().len(), 2);
        validate_chunks(store.chunks(), &a, &b).unwrap();
        assert!(store.verify_against_rebuild(&a, &b));
    }

    #[test]
    fn edit_inside_existing_chunk_rediffs_whole_chunk() {
        let a = Text::new(numbered(200));
        let b_src = numbered(200).replace("line 100\nline 101\nline 102\n", "x\ny\nz\n");
        let b = Text::new(b_src);
        let mut store = small_margin_store(&a, &b, 0);
        assert_eq!(store.chunks().len(), 1);
        // With no margin the window is still widened to the chunk's bounds.
        let pos = b.as_str().find("y\n").unwrap();
        let b = edit_b(&mut store, &a, &b, Edit::replace(pos, pos + 1, "line 101"));
        assert!(store.verify_against_rebuild(&a, &b));
        validate_chunks(store.chunks(), &a, &b).unwrap();
    }

    #[test]
    fn zero_margin_keeps_invariants() {
        let a = Text::new("αβγ\nδεζ\nηθι\n");
        let b = Text::new("αβγ\nδXζ\nηθι\n");
        let mut store = small_margin_store(&a, &b, 0);
        let pos = b.as_str().find('η').unwrap();
        let b = edit_b(&mut store, &a, &b, Edit::replace(pos, pos + 'η'.len_utf8(), "h"));
        validate_chunks(store.chunks(), &a, &b).unwrap();
    }

    #[test]
    fn shrinking_edit_to_a_discards_rediffed_chunks() {
        let a = Text::new("aa\n\n\n\na\n\na\n\n\n\n\na\n\nb\n");
        let b = Text::new("b\na");
        let mut store = ChunkStore::new(&a, &b);
        let a = edit_a(&mut store, &a, &b, Edit::delete(0, 1));
        assert_eq!(validate_chunks(store.chunks(), &a, &b), Ok(()));
        assert!(store.verify_against_rebuild(&a, &b));
    }

    #[test]
    fn shrinking_edit_to_b_discards_rediffed_chunks() {
        let a = Text::new("x\ny\nz\n");
        let b = Text::new("x\nY\nz\nextra\n");
        let mut store = ChunkStore::new(&a, &b);
        assert_eq!(store.chunks().len(), 2);
        let b = edit_b(&mut store, &a, &b, Edit::delete(0, 2));
        assert_eq!(validate_chunks(store.chunks(), &a, &b), Ok(()));
        assert!(store.verify_against_rebuild(&a, &b));
    }

    #[test]
    fn interleaved_line_changes_build_ordered_chunks() {
        let a = Text::new("\n\n\n\n\nb\nb\n\n\n\n\n\nb\nb\nb\n\n");
        let b = Text::new("bba\nba\naaa\n\n\n\na\na\n\n\na");
        let store = ChunkStore::new(&a, &b);
        assert_eq!(validate_chunks(store.chunks(), &a, &b), Ok(()));
    }

    // ----------------------------------------------------------
    // Properties
    // ----------------------------------------------------------

    fn lines_doc(lines: &[String]) -> String {
        lines.join("\n")
    }

    proptest! {
        #[test]
        fn built_chunks_satisfy_invariants(
            a in "[ab\n]{0,60}",
            b in "[ab\n]{0,60}",
        ) {
            let (a, b) = (Text::new(a), Text::new(b));
            let store = ChunkStore::new(&a, &b);
            prop_assert_eq!(validate_chunks(store.chunks(), &a, &b), Ok(()));
            prop_assert_eq!(store.chunks().is_empty(), a == b);
        }

        #[test]
        fn line_structured_documents_build_ordered_changes(
            a in proptest::collection::vec("[ab]{0,3}", 0..16),
            b in proptest::collection::vec("[ab]{0,3}", 0..16),
        ) {
            let (a, b) = (Text::new(a.join("\n")), Text::new(b.join("\n")));
            let store = ChunkStore::new(&a, &b);
            prop_assert_eq!(validate_chunks(store.chunks(), &a, &b), Ok(()));
        }

        #[test]
        fn identical_documents_never_have_chunks(a in "[abc \n]{0,80}") {
            let a = Text::new(a);
            prop_assert!(ChunkStore::new(&a, &a).chunks().is_empty());
        }

        #[test]
        fn incremental_update_matches_rebuild(
            n in 20usize..80,
            mutated in proptest::collection::btree_set(0usize..80, 0..8),
            target in 0usize..80,
            insert in any::<bool>(),
        ) {
            let a_lines: Vec<String> = (0..n).map(|i| format!("line{i}")).collect();
            let b_lines: Vec<String> = a_lines
                .iter()
                .enumerate()
                .map(|(i, l)| if mutated.contains(&i) { format!("changed{i}") } else { l.clone() })
                .collect();
            let a = Text::new(lines_doc(&a_lines));
            let b = Text::new(lines_doc(&b_lines));
            let mut store = small_margin_store(&a, &b, 40);

            let line = b.line(target % n + 1).unwrap();
            let edit = if insert {
                Edit::insert(line.from, format!("fresh{target}\n"))
            } else {
                Edit::replace(line.from, line.to, format!("edited{target}"))
            };
            let (new_b, desc) = edit.apply(&b).unwrap();
            store.update_b(&a, &new_b, &desc);

            prop_assert_eq!(validate_chunks(store.chunks(), &a, &new_b), Ok(()));
            let rebuilt = store.build(&a, &new_b);
            prop_assert_eq!(&store.chunks()[..], &rebuilt[..]);
        }

        #[test]
        fn arbitrary_edits_on_either_side_match_rebuild(
            a in "[ab\n]{0,40}",
            b in "[ab\n]{0,40}",
            on_a in any::<bool>(),
            from in 0usize..48,
            len in 0usize..8,
            insert in "[ab\n]{0,6}",
            tail in proptest::option::of((0usize..8, "[ab\n]{0,3}")),
        ) {
            let (a, b) = (Text::new(a), Text::new(b));
            let mut store = ChunkStore::new(&a, &b);
            let side = if on_a { Side::A } else { Side::B };
            let target = if on_a { &a } else { &b };

            let from = from.min(target.len());
            let to = (from + len).min(target.len());
            let mut edit = Edit::replace(from, to, insert);
            if let Some((gap, text)) = tail {
                let pos = (to + gap).min(target.len());
                edit = edit.and_replace(pos, (pos + 1).min(target.len()), text);
            }
            let (edited, desc) = edit.apply(target).unwrap();
            let (new_a, new_b) = if on_a { (edited, b.clone()) } else { (a.clone(), edited) };
            store.update(side, &new_a, &new_b, &desc);

            prop_assert_eq!(validate_chunks(store.chunks(), &new_a, &new_b), Ok(()));
            let rebuilt = store.build(&new_a, &new_b);
            prop_assert_eq!(&store.chunks()[..], &rebuilt[..]);
        }
    }
}
