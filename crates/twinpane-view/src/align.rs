//! Vertical alignment of two panes.
//!
//! Two panes showing different documents drift apart vertically wherever a
//! chunk has more lines on one side than the other. The aligner walks the
//! unchanged spans between chunks, pairs lines that sit at the same offset
//! from the span start in both panes, and inserts a spacer above the higher
//! of each pair so that the two render at the same height. A trailing spacer
//! evens out the total content height.

use serde::Serialize;
use tracing::debug;
use twinpane_types::{Assoc, Chunk, EditDescription, MergeConfig, Side, Text};

/// The rendered position of one line.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LineBlock {
    /// Document offset of the line start.
    pub from: usize,
    /// Vertical offset of the line's text. Spacers placed before the line
    /// are above this point.
    pub top: f64,
    pub height: f64,
}

/// Measured layout of one pane: the visible lines, in document order, and
/// the height of the whole document including every spacer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PaneLayout {
    pub doc_len: usize,
    pub lines: Vec<LineBlock>,
    pub content_height: f64,
}

impl PaneLayout {
    /// Lay out `doc` with a fixed line height, inserting `spacers` the way
    /// a renderer would.
    pub fn measure(doc: &Text, line_height: f64, spacers: &[Spacer]) -> Self {
        let mut spacers = spacers.iter().peekable();
        let mut lines = Vec::with_capacity(doc.lines());
        let mut y = 0.0;
        for number in 1..=doc.lines() {
            let Some(line) = doc.line(number) else {
                break;
            };
            while let Some(spacer) = spacers.next_if(|s| s.precedes(line.from)) {
                y += spacer.height;
            }
            lines.push(LineBlock {
                from: line.from,
                top: y,
                height: line_height,
            });
            y += line_height;
        }
        y += spacers.map(|s| s.height).sum::<f64>();
        Self {
            doc_len: doc.len(),
            lines,
            content_height: y,
        }
    }

    /// Keep only the lines starting inside `from..=to`.
    pub fn visible(mut self, from: usize, to: usize) -> Self {
        self.lines.retain(|l| l.from >= from && l.from <= to);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacerPlacement {
    /// Above the line starting at the spacer's position.
    BeforeLine,
    /// Below the last line of the document.
    AfterDocument,
}

/// A synthetic vertical gap in one pane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Spacer {
    pub pos: usize,
    pub height: f64,
    pub placement: SpacerPlacement,
}

impl Spacer {
    pub fn before_line(pos: usize, height: f64) -> Self {
        Self {
            pos,
            height,
            placement: SpacerPlacement::BeforeLine,
        }
    }

    pub fn after_document(pos: usize, height: f64) -> Self {
        Self {
            pos,
            height,
            placement: SpacerPlacement::AfterDocument,
        }
    }

    /// Returns `true` if this spacer renders above the line starting at `line_from`.
    fn precedes(&self, line_from: usize) -> bool {
        self.placement == SpacerPlacement::BeforeLine && self.pos <= line_from
    }
}

/// The spacers of both panes, each list in document order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SpacerSet {
    pub a: Vec<Spacer>,
    pub b: Vec<Spacer>,
}

impl SpacerSet {
    pub fn side(&self, side: Side) -> &[Spacer] {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    /// Combined height of the spacers on `side`.
    pub fn total(&self, side: Side) -> f64 {
        self.side(side).iter().map(|s| s.height).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty() && self.b.is_empty()
    }

    /// The same set with the panes swapped.
    pub fn mirrored(&self) -> Self {
        Self {
            a: self.b.clone(),
            b: self.a.clone(),
        }
    }
}

/// Compute the spacers that align `a` and `b` around `chunks`.
///
/// `committed` are the spacers already rendered into the measured layouts;
/// their heights are taken back out before lines are compared.
pub fn compute_spacers(
    a: &PaneLayout,
    b: &PaneLayout,
    chunks: &[Chunk],
    committed: &SpacerSet,
    tolerance: f64,
) -> SpacerSet {
    let mut out = SpacerSet::default();
    let mut committed_a = committed.a.iter().peekable();
    let mut committed_b = committed.b.iter().peekable();
    let (mut i_a, mut i_b) = (0, 0);
    let (mut pos_a, mut pos_b) = (0usize, 0usize);
    let (mut off_a, mut off_b) = (0.0f64, 0.0f64);

    'chunks: for chunk_i in 0..=chunks.len() {
        let chunk = chunks.get(chunk_i);
        let (end_a, end_b) = chunk.map_or((a.doc_len, b.doc_len), |c| (c.from_a, c.from_b));

        if pos_a < end_a && pos_b < end_b {
            loop {
                let (Some(line_a), Some(line_b)) = (a.lines.get(i_a), b.lines.get(i_b)) else {
                    break 'chunks;
                };
                while let Some(s) = committed_a.next_if(|s| s.precedes(line_a.from)) {
                    off_a -= s.height;
                }
                while let Some(s) = committed_b.next_if(|s| s.precedes(line_b.from)) {
                    off_b -= s.height;
                }
                if line_a.from >= end_a || line_b.from >= end_b {
                    break;
                }

                let rel_a = line_a.from as isize - pos_a as isize;
                let rel_b = line_b.from as isize - pos_b as isize;
                if rel_a < 0 || rel_a < rel_b {
                    i_a += 1;
                } else if rel_b < 0 || rel_b < rel_a {
                    i_b += 1;
                } else {
                    let diff = line_a.top + off_a - (line_b.top + off_b);
                    if diff < -tolerance {
                        off_a -= diff;
                        out.a.push(Spacer::before_line(line_a.from, -diff));
                    } else if diff > tolerance {
                        off_b += diff;
                        out.b.push(Spacer::before_line(line_b.from, diff));
                    }
                    i_a += 1;
                    i_b += 1;
                }
            }
        }

        let Some(chunk) = chunk else {
            break;
        };
        pos_a = chunk.to_a;
        pos_b = chunk.to_b;
    }

    off_a -= committed_a.map(|s| s.height).sum::<f64>();
    off_b -= committed_b.map(|s| s.height).sum::<f64>();

    let doc_diff = a.content_height + off_a - (b.content_height + off_b);
    if doc_diff < -tolerance {
        out.a.push(Spacer::after_document(a.doc_len, -doc_diff));
    } else if doc_diff > tolerance {
        out.b.push(Spacer::after_document(b.doc_len, doc_diff));
    }
    out
}

/// Holds the committed spacer set for a pair of panes.
#[derive(Clone, Debug)]
pub struct Aligner {
    committed: SpacerSet,
    tolerance: f64,
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new(1e-4)
    }
}

impl Aligner {
    pub fn new(tolerance: f64) -> Self {
        Self {
            committed: SpacerSet::default(),
            tolerance,
        }
    }

    pub fn from_config(config: &MergeConfig) -> Self {
        Self::new(config.tolerance)
    }

    pub fn committed(&self) -> &SpacerSet {
        &self.committed
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Recompute the spacers for the current layouts. The new set is only
    /// committed when it differs from the current one; returns whether it was.
    pub fn update(&mut self, a: &PaneLayout, b: &PaneLayout, chunks: &[Chunk]) -> bool {
        let next = compute_spacers(a, b, chunks, &self.committed, self.tolerance);
        if next == self.committed {
            return false;
        }
        debug!(
            spacers_a = next.a.len(),
            spacers_b = next.b.len(),
            "committing new spacer set"
        );
        self.committed = next;
        true
    }

    /// Move committed spacers on `side` through an edit to that document.
    pub fn map(&mut self, side: Side, description: &EditDescription) {
        let spacers = match side {
            Side::A => &mut self.committed.a,
            Side::B => &mut self.committed.b,
        };
        for spacer in spacers.iter_mut() {
            spacer.pos = match spacer.placement {
                SpacerPlacement::BeforeLine => description.map_pos(spacer.pos, Assoc::Before),
                SpacerPlacement::AfterDocument => description.new_len,
            };
        }
    }

    /// Drop every committed spacer.
    pub fn clear(&mut self) {
        self.committed = SpacerSet::default();
    }
}
