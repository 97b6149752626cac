//! Render objects for changed chunks.
//!
//! A renderer receives a flat list of [`Decoration`]s per pane and
//! dispatches on the variant. Line markers and text marks come from
//! [`decorate_pane`]; the unified view additionally shows the original text
//! of every chunk above its replacement, described by [`deleted_chunks`]
//! and [`deleted_segments`].

use serde::Serialize;
use twinpane_types::{Chunk, ChunkId, MergeConfig, Side, Text};

use crate::align::Spacer;
use crate::collapse::CollapseRange;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Inserted,
    Deleted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GutterKind {
    ChangedLine,
    EmptyLine,
    DeletedChunk,
}

/// The visible document range of a pane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub from: usize,
    pub to: usize,
}

impl Viewport {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// The whole of `doc`.
    pub fn all(doc: &Text) -> Self {
        Self::new(0, doc.len())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decoration {
    /// Line-level marker on a changed line.
    ChangedLine { pos: usize, empty: bool },
    /// Fine-grained mark on changed characters.
    ChangedText { from: usize, to: usize },
    /// The whole changed range of a chunk on this pane.
    ChunkSpan { from: usize, to: usize, kind: SpanKind },
    Gutter { pos: usize, kind: GutterKind },
    /// Placeholder for a chunk's original text, shown above `pos`.
    DeletedChunk { pos: usize, chunk: ChunkId, highlight: bool },
    /// Accept/reject controls for a chunk.
    MergeControls { pos: usize, chunk: ChunkId },
    Collapsed { range: CollapseRange },
    Spacer { spacer: Spacer },
}

impl From<CollapseRange> for Decoration {
    fn from(range: CollapseRange) -> Self {
        Decoration::Collapsed { range }
    }
}

impl From<Spacer> for Decoration {
    fn from(spacer: Spacer) -> Self {
        Decoration::Spacer { spacer }
    }
}

/// Build line, text, and gutter decorations for the chunks of `doc` that
/// intersect `viewport`.
///
/// `doc` is the `config.side` document. The unified view always shows
/// document B and marks empty changed lines separately.
pub fn decorate_pane(
    doc: &Text,
    chunks: &[Chunk],
    config: &MergeConfig,
    viewport: Viewport,
    unified: bool,
) -> Vec<Decoration> {
    let side = if unified { Side::B } else { config.side };
    let mut out = Vec::new();
    for chunk in chunks {
        if chunk.from(side) >= viewport.to {
            break;
        }
        if chunk.to(side) > viewport.from {
            decorate_chunk(doc, chunk, side, config, unified, &mut out);
        }
    }
    out
}

fn decorate_chunk(
    doc: &Text,
    chunk: &Chunk,
    side: Side,
    config: &MergeConfig,
    unified: bool,
    out: &mut Vec<Decoration>,
) {
    let (from, to) = (chunk.from(side), chunk.to(side));
    if from == to {
        return;
    }
    let kind = match side {
        Side::A => SpanKind::Deleted,
        Side::B => SpanKind::Inserted,
    };
    let end = (to - 1).min(doc.len());

    mark_line(doc, from, config, unified, out);
    out.push(Decoration::ChunkSpan { from, to, kind });

    let mut pos = from;
    let mut change_i = 0;
    loop {
        let line = doc.line_at(pos);
        let line_end = line.to.min(end);
        if config.highlight_changes {
            while let Some(change) = chunk.changes.get(change_i) {
                let (change_from, change_to) = change.range(side);
                let (next_from, next_to) = (from + change_from, from + change_to);
                let (mark_from, mark_to) = (pos.max(next_from), line_end.min(next_to));
                if mark_from < mark_to {
                    out.push(Decoration::ChangedText {
                        from: mark_from,
                        to: mark_to,
                    });
                }
                if next_to < line_end {
                    change_i += 1;
                } else {
                    break;
                }
            }
        }
        if line_end >= end {
            break;
        }
        pos = line.to + 1;
        mark_line(doc, pos, config, unified, out);
    }
}

fn mark_line(doc: &Text, pos: usize, config: &MergeConfig, unified: bool, out: &mut Vec<Decoration>) {
    let empty = unified && doc.line_at(pos).is_empty();
    out.push(Decoration::ChangedLine { pos, empty });
    if config.mark_gutter {
        let kind = if empty {
            GutterKind::EmptyLine
        } else {
            GutterKind::ChangedLine
        };
        out.push(Decoration::Gutter { pos, kind });
    }
}

/// Placeholders for the original text of each chunk in the unified view,
/// plus merge controls when enabled. Chunks that only insert text have
/// nothing to show and get controls only.
pub fn deleted_chunks(chunks: &[Chunk], config: &MergeConfig) -> Vec<Decoration> {
    let mut out = Vec::new();
    for chunk in chunks {
        if chunk.from_a != chunk.to_a {
            out.push(Decoration::DeletedChunk {
                pos: chunk.from_b,
                chunk: chunk.id(),
                highlight: config.syntax_highlight_deletions,
            });
            if config.mark_gutter {
                out.push(Decoration::Gutter {
                    pos: chunk.from_b,
                    kind: GutterKind::DeletedChunk,
                });
            }
        }
        if config.merge_controls {
            out.push(Decoration::MergeControls {
                pos: chunk.from_b,
                chunk: chunk.id(),
            });
        }
    }
    out
}

/// A run of a deleted chunk's original text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeletedSegment {
    pub text: String,
    /// Whether this run was removed or replaced, as opposed to kept.
    pub changed: bool,
}

/// Split the original text of `chunk` into kept and changed runs.
pub fn deleted_segments(original: &Text, chunk: &Chunk) -> Vec<DeletedSegment> {
    let text = original.slice(chunk.from_a, chunk.end_a());
    let mut segments = Vec::new();
    let mut push = |from: usize, to: usize, changed: bool| {
        let to = to.min(text.len());
        if from < to {
            if let Some(piece) = text.get(from..to) {
                segments.push(DeletedSegment {
                    text: piece.to_string(),
                    changed,
                });
            }
        }
    };

    let mut at = 0;
    for change in chunk.changes.iter() {
        if change.from_a == change.to_a {
            continue;
        }
        push(at, change.from_a, false);
        push(change.from_a, change.to_a, true);
        at = change.to_a;
    }
    push(at, text.len(), false);
    segments
}
