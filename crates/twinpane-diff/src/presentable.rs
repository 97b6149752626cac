//! Line-first Myers diff refined to characters.
//!
//! Common leading and trailing lines are stripped and the remaining lines
//! compared first, which keeps the common case (a few edited lines in a
//! large file) cheap. Each group of replaced lines is then refined with a
//! character-level diff. Either pass falls back to one change covering its
//! whole region when it is too large for the effort budget. Small unchanged
//! gaps inside a line are absorbed into the surrounding changes so that
//! highlights don't fragment into single characters.

use std::ops::Range;

use similar::{capture_diff_slices, Algorithm, DiffOp, DiffTag};
use tracing::debug;
use twinpane_types::Change;

use crate::engine::{DiffBudget, DiffEngine};

/// The default [`DiffEngine`].
#[derive(Clone, Copy, Debug)]
pub struct PresentableDiff {
    /// Unchanged runs of at most this many bytes between two changes on the
    /// same line are merged into one change.
    pub max_gap: usize,
}

impl Default for PresentableDiff {
    fn default() -> Self {
        Self { max_gap: 2 }
    }
}

impl PresentableDiff {
    pub fn new() -> Self {
        Self::default()
    }

    fn refine(&self, a: &str, b: &str, base: (usize, usize), budget: DiffBudget, out: &mut Vec<Change>) {
        let chars_a: Vec<char> = a.chars().collect();
        let chars_b: Vec<char> = b.chars().collect();

        if budget.is_exceeded_by(chars_a.len(), chars_b.len()) {
            debug!(
                len_a = chars_a.len(),
                len_b = chars_b.len(),
                effort_limit = budget.effort_limit,
                "diff budget exceeded; reporting replaced lines as one change"
            );
            out.push(Change::new(base.0, base.0 + a.len(), base.1, base.1 + b.len()));
            return;
        }

        let starts_a = char_start_indices(a);
        let starts_b = char_start_indices(b);
        let ops = capture_diff_slices(Algorithm::Myers, &chars_a, &chars_b);
        for (old, new) in changed_groups(&ops) {
            out.push(Change::new(
                base.0 + starts_a[old.start],
                base.0 + starts_a[old.end],
                base.1 + starts_b[new.start],
                base.1 + starts_b[new.end],
            ));
        }
    }

    fn merge_small_gaps(&self, a: &str, changes: Vec<Change>) -> Vec<Change> {
        let mut merged: Vec<Change> = Vec::with_capacity(changes.len());
        for change in changes {
            if let Some(last) = merged.last_mut() {
                let gap = change.from_a - last.to_a;
                if gap <= self.max_gap && !a[last.to_a..change.from_a].contains('\n') {
                    *last = Change::new(last.from_a, change.to_a, last.from_b, change.to_b);
                    continue;
                }
            }
            merged.push(change);
        }
        merged
    }
}

impl DiffEngine for PresentableDiff {
    fn diff(&self, a: &str, b: &str, budget: DiffBudget) -> Vec<Change> {
        if a == b {
            return Vec::new();
        }

        let lines_a: Vec<&str> = a.split_inclusive('\n').collect();
        let lines_b: Vec<&str> = b.split_inclusive('\n').collect();
        let prefix = lines_a.iter().zip(&lines_b).take_while(|(x, y)| x == y).count();
        let suffix = lines_a[prefix..]
            .iter()
            .rev()
            .zip(lines_b[prefix..].iter().rev())
            .take_while(|(x, y)| x == y)
            .count();
        let mid_a = &lines_a[prefix..lines_a.len() - suffix];
        let mid_b = &lines_b[prefix..lines_b.len() - suffix];
        let base: usize = lines_a[..prefix].iter().map(|line| line.len()).sum();
        let starts_a = line_start_indices(mid_a, base);
        let starts_b = line_start_indices(mid_b, base);

        if budget.is_exceeded_by(mid_a.len(), mid_b.len()) {
            debug!(
                lines_a = mid_a.len(),
                lines_b = mid_b.len(),
                effort_limit = budget.effort_limit,
                "diff budget exceeded; reporting changed region as one change"
            );
            return vec![Change::new(base, starts_a[mid_a.len()], base, starts_b[mid_b.len()])];
        }

        let ops = capture_diff_slices(Algorithm::Myers, mid_a, mid_b);
        let mut changes = Vec::new();
        for (old, new) in changed_groups(&ops) {
            let (from_a, to_a) = (starts_a[old.start], starts_a[old.end]);
            let (from_b, to_b) = (starts_b[new.start], starts_b[new.end]);
            if old.is_empty() || new.is_empty() {
                changes.push(Change::new(from_a, to_a, from_b, to_b));
            } else {
                self.refine(&a[from_a..to_a], &b[from_b..to_b], (from_a, from_b), budget, &mut changes);
            }
        }
        self.merge_small_gaps(a, changes)
    }
}

/// Coalesce runs of consecutive non-equal ops into `(old, new)` index ranges.
///
/// Positions are accumulated from op lengths; the index an insert or delete
/// reports for its empty side is not relied on.
fn changed_groups(ops: &[DiffOp]) -> Vec<(Range<usize>, Range<usize>)> {
    let mut groups: Vec<(Range<usize>, Range<usize>)> = Vec::new();
    let mut open = false;
    let (mut old_pos, mut new_pos) = (0, 0);
    for op in ops {
        let old = old_pos..old_pos + op.old_range().len();
        let new = new_pos..new_pos + op.new_range().len();
        old_pos = old.end;
        new_pos = new.end;
        if op.tag() == DiffTag::Equal {
            open = false;
            continue;
        }
        match groups.last_mut() {
            Some((g_old, g_new)) if open => {
                g_old.end = old.end;
                g_new.end = new.end;
            }
            _ => groups.push((old, new)),
        }
        open = true;
    }
    groups
}

fn line_start_indices(lines: &[&str], base: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(lines.len() + 1);
    let mut pos = base;
    out.push(pos);
    for line in lines {
        pos += line.len();
        out.push(pos);
    }
    out
}

fn char_start_indices(s: &str) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::with_capacity(s.len() + 1);
    for (idx, _) in s.char_indices() {
        out.push(idx);
    }
    out.push(s.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn diff(a: &str, b: &str) -> Vec<Change> {
        PresentableDiff::new().diff(a, b, DiffBudget::default())
    }

    #[test]
    fn identical_inputs_have_no_changes() {
        assert!(diff("a\nb\nc", "a\nb\nc").is_empty());
        assert!(diff("", "").is_empty());
    }

    #[test]
    fn replaced_line() {
        let changes = diff("a\nb\nc\nd\ne", "a\nb\nX\nd\ne");
        assert_eq!(changes, vec![Change::new(4, 5, 4, 5)]);
    }

    #[test]
    fn inserted_line_is_reported_whole() {
        let changes = diff("a\nc\n", "a\nb\nc\n");
        assert_eq!(changes, vec![Change::new(2, 2, 2, 4)]);
    }

    #[test]
    fn deleted_line_is_reported_whole() {
        let changes = diff("a\nb\nc\n", "a\nc\n");
        assert_eq!(changes, vec![Change::new(2, 4, 2, 2)]);
    }

    #[test]
    fn empty_side() {
        assert_eq!(diff("", "abc"), vec![Change::new(0, 0, 0, 3)]);
        assert_eq!(diff("abc\n", ""), vec![Change::new(0, 4, 0, 0)]);
    }

    #[test]
    fn changes_inside_a_line_are_character_level() {
        let changes = diff("let value = 1;\n", "let count = 1;\n");
        assert!(!changes.is_empty());
        for c in &changes {
            assert!(c.from_a >= 4 && c.to_a <= 9, "{c:?}");
        }
    }

    #[test]
    fn small_gaps_are_merged() {
        // "abcd" -> "xbyd": the single unchanged 'b' is absorbed.
        let changes = diff("abcd\n", "xbyd\n");
        assert_eq!(changes, vec![Change::new(0, 3, 0, 3)]);
    }

    #[test]
    fn multibyte_offsets_are_bytes() {
        let changes = diff("héllo\n", "hällo\n");
        assert_eq!(changes, vec![Change::new(1, 3, 1, 3)]);
    }

    #[test]
    fn exhausted_budget_degrades_to_one_change() {
        let a = "alpha beta gamma\n";
        let b = "alpha bxta gamma\n";
        let coarse = PresentableDiff::new().diff(a, b, DiffBudget::new(2));
        assert_eq!(coarse, vec![Change::new(0, a.len(), 0, b.len())]);
        let fine = PresentableDiff::new().diff(a, b, DiffBudget::default());
        assert_eq!(fine, vec![Change::new(7, 8, 7, 8)]);
    }

    #[test]
    fn exhausted_budget_on_lines_degrades_to_one_change() {
        let a = "keep\n1\n2\n3\n4\nkeep\n";
        let b = "keep\nw\nx\ny\nz\nkeep\n";
        let coarse = PresentableDiff::new().diff(a, b, DiffBudget::new(3));
        assert_eq!(coarse, vec![Change::new(5, 13, 5, 13)]);
    }

    #[test]
    fn common_lines_are_stripped_from_both_ends() {
        let changes = diff("a\nb\nc\nb\na\n", "a\nb\nX\nb\na\n");
        assert_eq!(changes, vec![Change::new(4, 5, 4, 5)]);
    }

    #[test]
    fn interleaved_inserts_and_deletes_stay_ordered() {
        let a = "\n\n\n\n\nb\nb\n\n\n\n\n\nb\nb\nb\n\n";
        let b = "bba\nba\naaa\n\n\n\na\na\n\n\na";
        let changes = diff(a, b);
        for pair in changes.windows(2) {
            assert!(pair[0].to_a <= pair[1].from_a, "{changes:?}");
            assert!(pair[0].to_b <= pair[1].from_b, "{changes:?}");
        }
        for c in &changes {
            assert!(c.from_a <= c.to_a && c.from_b <= c.to_b, "{c:?}");
        }
        assert_eq!(unchanged_segments(a, &changes, true), unchanged_segments(b, &changes, false));
    }

    fn unchanged_segments<'a>(text: &'a str, changes: &[Change], side_a: bool) -> Vec<&'a str> {
        let mut out = Vec::new();
        let mut pos = 0;
        for c in changes {
            let (from, to) = if side_a { (c.from_a, c.to_a) } else { (c.from_b, c.to_b) };
            out.push(&text[pos..from]);
            pos = to;
        }
        out.push(&text[pos..]);
        out
    }

    proptest! {
        #[test]
        fn changes_are_sorted_and_cover_all_differences(
            a in "[abc\n]{0,40}",
            b in "[abc\n]{0,40}",
        ) {
            let changes = diff(&a, &b);
            for pair in changes.windows(2) {
                prop_assert!(pair[0].to_a <= pair[1].from_a);
                prop_assert!(pair[0].to_b <= pair[1].from_b);
            }
            prop_assert_eq!(
                unchanged_segments(&a, &changes, true),
                unchanged_segments(&b, &changes, false)
            );
            prop_assert_eq!(changes.is_empty(), a == b);
        }
    }
}
