//! Presentation layer for twinpane.
//!
//! Everything a renderer needs besides the chunk list itself: spacers that
//! keep matching lines of two panes at the same height, collapsed runs of
//! unchanged lines, and the decorations marking changed lines and text.
//! Nothing here touches a screen; the output is plain data.
//!
//! # Key Types
//!
//! - [`Aligner`]: Computes and commits spacer sets for a pair of panes
//! - [`CollapseState`]: Collapsed unchanged spans, with per-span dismissal
//! - [`Decoration`]: Closed set of render objects, dispatched on by kind

pub mod align;
pub mod collapse;
pub mod decoration;

pub use align::{compute_spacers, Aligner, LineBlock, PaneLayout, Spacer, SpacerPlacement, SpacerSet};
pub use collapse::{collapse_unchanged, CollapseRange, CollapseState};
pub use decoration::{
    decorate_pane, deleted_chunks, deleted_segments, DeletedSegment, Decoration, GutterKind,
    SpanKind, Viewport,
};
