//! The merge state and its reducer.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use twinpane_chunk::{chunk_at, map_pos, ChunkStore};
use twinpane_types::{Chunk, Edit, EditDescription, MergeConfig, Side, Text, LINE_BREAK};
use twinpane_view::CollapseState;

use crate::error::{MergeError, MergeResult};

/// A side effect carried by a [`Transaction`].
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Edit the original document (A).
    UpdateOriginal(Edit),
    /// Expand the collapsed span starting at this position.
    Uncollapse(usize),
    /// Replace the configuration. Rebuilds the chunk list.
    Reconfigure(MergeConfig),
}

/// One atomic update: an optional edit to document B plus effects.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transaction {
    pub changes: Option<Edit>,
    pub effects: Vec<Effect>,
}

impl Transaction {
    /// A transaction that only edits document B.
    pub fn edit(edit: Edit) -> Self {
        Self {
            changes: Some(edit),
            effects: Vec::new(),
        }
    }

    /// A transaction that only carries `effect`.
    pub fn effect(effect: Effect) -> Self {
        Self {
            changes: None,
            effects: vec![effect],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.as_ref().map_or(true, Edit::is_empty) && self.effects.is_empty()
    }
}

/// What a transaction changed, for callers that keep derived state.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Applied {
    /// Edits applied to document A, in order.
    pub original: Vec<EditDescription>,
    /// The edit applied to document B.
    pub doc: Option<EditDescription>,
    /// Whether the chunk list was replaced.
    pub chunks_changed: bool,
    pub reconfigured: bool,
}

/// Both documents, their chunk list, and the view state derived from them.
///
/// A `MergeState` is never mutated in place; [`MergeState::reduce`] returns
/// the successor state.
#[derive(Clone, Debug)]
pub struct MergeState {
    original: Text,
    doc: Text,
    store: ChunkStore,
    config: MergeConfig,
    /// One entry per pane when collapsing is enabled.
    collapse: Vec<CollapseState>,
}

impl MergeState {
    /// Validate `config` and build the chunk list for `original` (A) and `doc` (B).
    pub fn new(original: Text, doc: Text, config: MergeConfig) -> MergeResult<Self> {
        config.validate()?;
        let store = ChunkStore::from_config(&config, &original, &doc);
        let collapse = collapse_for(&config, &original, &doc, store.chunks());
        Ok(Self {
            original,
            doc,
            store,
            config,
            collapse,
        })
    }

    /// Document A.
    pub fn original(&self) -> &Text {
        &self.original
    }

    /// Document B.
    pub fn doc(&self) -> &Text {
        &self.doc
    }

    /// The document with the given label.
    pub fn text(&self, side: Side) -> &Text {
        match side {
            Side::A => &self.original,
            Side::B => &self.doc,
        }
    }

    pub fn chunks(&self) -> &Arc<[Chunk]> {
        self.store.chunks()
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Collapsed spans of the pane this view shows.
    pub fn collapse(&self) -> Option<&CollapseState> {
        self.collapse_of(self.config.side)
    }

    /// Collapsed spans of the `side` pane.
    pub fn collapse_of(&self, side: Side) -> Option<&CollapseState> {
        self.collapse.iter().find(|c| c.side() == side)
    }

    /// The chunk whose B range covers `pos`.
    pub fn chunk_at_b(&self, pos: usize) -> Option<&Chunk> {
        chunk_at(self.chunks(), Side::B, pos)
    }

    /// Apply `tr` and return the successor state.
    pub fn reduce(&self, tr: Transaction) -> MergeResult<Self> {
        self.apply(tr).map(|(state, _)| state)
    }

    /// Apply `tr`, returning the successor state and a summary of what changed.
    ///
    /// A reconfigure is applied first, then edits to A, then the edit to B,
    /// then uncollapse requests. An uncollapse position is in the document
    /// of `config.side`; the sibling pane expands the span at the mapped
    /// position. Nothing is applied if any edit is invalid.
    pub fn apply(&self, tr: Transaction) -> MergeResult<(Self, Applied)> {
        let mut next = self.clone();
        let mut applied = Applied::default();
        let mut uncollapse = Vec::new();
        let mut original_edits = Vec::new();

        for effect in tr.effects {
            match effect {
                Effect::Reconfigure(config) => {
                    config.validate()?;
                    next.config = config;
                    applied.reconfigured = true;
                }
                Effect::UpdateOriginal(edit) => original_edits.push(edit),
                Effect::Uncollapse(pos) => uncollapse.push(pos),
            }
        }

        if applied.reconfigured {
            next.store = ChunkStore::from_config(&next.config, &next.original, &next.doc);
            next.collapse.clear();
            applied.chunks_changed = true;
        }

        for edit in original_edits {
            let (original, description) = edit
                .apply(&next.original)
                .map_err(|source| MergeError::Edit { side: Side::A, source })?;
            next.original = original;
            applied.chunks_changed |= next.store.update_a(&next.original, &next.doc, &description);
            applied.original.push(description);
        }

        if let Some(edit) = tr.changes {
            let (doc, description) = edit
                .apply(&next.doc)
                .map_err(|source| MergeError::Edit { side: Side::B, source })?;
            next.doc = doc;
            applied.chunks_changed |= next.store.update_b(&next.original, &next.doc, &description);
            applied.doc = Some(description);
        }

        if applied.reconfigured {
            next.collapse = collapse_for(&next.config, &next.original, &next.doc, next.chunks());
        } else {
            for collapse in &mut next.collapse {
                let (doc, edits) = match collapse.side() {
                    Side::A => (&next.original, &applied.original[..]),
                    Side::B => (&next.doc, applied.doc.as_slice()),
                };
                edits.iter().for_each(|d| collapse.map(d));
                if applied.chunks_changed {
                    collapse.recompute(doc, next.store.chunks());
                }
            }
        }

        let side = next.config.side;
        for pos in uncollapse {
            let sibling_pos = map_pos(pos, next.store.chunks(), side);
            for collapse in &mut next.collapse {
                let at = if collapse.side() == side { pos } else { sibling_pos };
                collapse.uncollapse(at);
            }
        }

        debug!(
            chunks = next.chunks().len(),
            original_edits = applied.original.len(),
            doc_edited = applied.doc.is_some(),
            reconfigured = applied.reconfigured,
            "applied transaction"
        );
        Ok((next, applied))
    }
}

fn collapse_for(config: &MergeConfig, a: &Text, b: &Text, chunks: &[Chunk]) -> Vec<CollapseState> {
    let Some(collapse) = config.collapse else {
        return Vec::new();
    };
    vec![
        CollapseState::new(collapse, Side::A, a, chunks),
        CollapseState::new(collapse, Side::B, b, chunks),
    ]
}

/// Replacement text for copying `chunk`'s `from` side over its other side.
///
/// A chunk's range includes the line break after its last line; that break
/// is only carried over when the target range does not run to the end of
/// its document.
fn chunk_text(chunk: &Chunk, from: Side, source: &Text, target: &Text) -> String {
    let (start, end) = (chunk.from(from), chunk.to(from));
    let mut text = source.slice(start, end.saturating_sub(1).max(start)).to_string();
    if start != end && chunk.to(from.other()) <= target.len() {
        text.push_str(LINE_BREAK);
    }
    text
}

/// Build the transaction that makes A match B for the chunk covering `pos`
/// in B. Returns `None` if no chunk covers `pos`.
pub fn accept_chunk(state: &MergeState, pos: usize) -> Option<Transaction> {
    let chunk = state.chunk_at_b(pos)?;
    let insert = chunk_text(chunk, Side::B, state.doc(), state.original());
    let to = chunk.to_a.min(state.original().len());
    Some(Transaction::effect(Effect::UpdateOriginal(Edit::replace(
        chunk.from_a,
        to,
        insert,
    ))))
}

/// Build the transaction that reverts B to A for the chunk covering `pos`
/// in B. Returns `None` if no chunk covers `pos`.
pub fn reject_chunk(state: &MergeState, pos: usize) -> Option<Transaction> {
    let chunk = state.chunk_at_b(pos)?;
    let insert = chunk_text(chunk, Side::A, state.original(), state.doc());
    let to = chunk.to_b.min(state.doc().len());
    Some(Transaction::edit(Edit::replace(chunk.from_b, to, insert)))
}
